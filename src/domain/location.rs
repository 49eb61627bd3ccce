// ==========================================
// 城市垃圾收运调度 - 地理位置模型
// ==========================================
// 坐标系: WGS84, 单位为度
// 校验逻辑见 engine::geo
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// GeoPoint - 经纬度坐标
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64, // 纬度 [-90, 90]
    pub lon: f64, // 经度 [-180, 180]
}

// ==========================================
// DepotPoint - 车场坐标
// ==========================================
// 距离计算的原点,属于配置值,不做派生
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepotPoint {
    pub location: GeoPoint,
}

impl DepotPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            location: GeoPoint { lat, lon },
        }
    }
}
