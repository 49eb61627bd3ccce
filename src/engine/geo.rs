// ==========================================
// 城市垃圾收运调度 - 地理距离计算
// ==========================================
// 算法: Haversine 大圆距离, 球半径 6371 km
// 精度: f64, 不做取整(取整由展示层负责)
// ==========================================
// 职责: 坐标校验 + 距离计算 + 地理中心
// 无副作用
// ==========================================

use crate::domain::location::GeoPoint;
use crate::engine::error::{EngineError, EngineResult};

/// 地球平均半径 (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// ==========================================
// 坐标校验
// ==========================================

/// 校验并构造坐标点
///
/// # 错误
/// - 纬度 ∉ [-90, 90] 或经度 ∉ [-180, 180] → InvalidCoordinate
/// - NaN / Infinity → InvalidCoordinate
pub fn validate_point(lat: f64, lon: f64) -> EngineResult<GeoPoint> {
    if !lat.is_finite() || !lon.is_finite() {
        return Err(EngineError::coordinate(Some(lat), Some(lon), "非有限数值"));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(EngineError::coordinate(Some(lat), Some(lon), "纬度超出 [-90, 90]"));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(EngineError::coordinate(Some(lat), Some(lon), "经度超出 [-180, 180]"));
    }
    Ok(GeoPoint { lat, lon })
}

/// 从可选经纬度构造坐标
///
/// - 两者都缺失 → Ok(None)（坐标未知,不是错误）
/// - 只有其中一个 → InvalidCoordinate
pub fn point_from_pair(lat: Option<f64>, lon: Option<f64>) -> EngineResult<Option<GeoPoint>> {
    match (lat, lon) {
        (None, None) => Ok(None),
        (Some(lat), Some(lon)) => validate_point(lat, lon).map(Some),
        (lat, lon) => Err(EngineError::coordinate(lat, lon, "经纬度不成对")),
    }
}

/// 解析 "lat, lon" 组合字符串（传感器导出格式）
pub fn parse_latlong(raw: &str) -> EngineResult<GeoPoint> {
    let mut parts = raw.split(',').map(str::trim);
    let lat = parts.next().and_then(|s| s.parse::<f64>().ok());
    let lon = parts.next().and_then(|s| s.parse::<f64>().ok());

    if parts.next().is_some() {
        return Err(EngineError::coordinate(lat, lon, "latlong 字段多于两段"));
    }

    match (lat, lon) {
        (Some(lat), Some(lon)) => validate_point(lat, lon),
        (lat, lon) => Err(EngineError::coordinate(lat, lon, "latlong 字段无法解析")),
    }
}

// ==========================================
// 距离计算
// ==========================================

/// 两点间大圆距离 (km)
///
/// 对称: distance_km(A, B) == distance_km(B, A)
/// 同点距离为 0
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> EngineResult<f64> {
    let a = validate_point(lat1, lon1)?;
    let b = validate_point(lat2, lon2)?;
    Ok(haversine(a, b))
}

/// 两个已校验坐标点的距离
pub fn distance_between(a: &GeoPoint, b: &GeoPoint) -> EngineResult<f64> {
    distance_km(a.lat, a.lon, b.lat, b.lon)
}

fn haversine(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    // 浮点误差可能使 h 略大于 1
    let h = h.clamp(0.0, 1.0);
    EARTH_RADIUS_KM * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

// ==========================================
// 地理中心
// ==========================================

/// 坐标集合的算术平均中心（用于建议车场位置）
///
/// 空输入返回 None
pub fn geographic_center(points: &[GeoPoint]) -> Option<GeoPoint> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (lat_sum, lon_sum) = points
        .iter()
        .fold((0.0, 0.0), |(la, lo), p| (la + p.lat, lo + p.lon));
    Some(GeoPoint {
        lat: lat_sum / n,
        lon: lon_sum / n,
    })
}
