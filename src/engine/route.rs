// ==========================================
// 城市垃圾收运调度 - 收运路线构建
// ==========================================
// 算法: 贪心最近邻 (从起点出发,每步选最近的未访问桶)
// 不做全局最优,仅生成可解释的访问顺序
// ==========================================

use crate::domain::bin::Bin;
use crate::domain::location::GeoPoint;
use crate::engine::error::EngineResult;
use crate::engine::geo;
use serde::{Deserialize, Serialize};
use tracing::instrument;

// ==========================================
// RouteStop / RoutePlan
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    pub sequence: usize,          // 1-based
    pub bin_id: String,
    pub leg_distance_km: Option<f64>, // 上一站到本站; 坐标缺失为 None
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub start: GeoPoint,
    pub stops: Vec<RouteStop>,
    pub total_distance_km: f64, // 仅累计已知航段
    pub unlocated_stops: usize,
}

impl RoutePlan {
    pub fn bin_sequence(&self) -> Vec<String> {
        self.stops.iter().map(|s| s.bin_id.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

// ==========================================
// RoutePlanner
// ==========================================
pub struct RoutePlanner;

impl RoutePlanner {
    /// 最近邻路线
    ///
    /// - 距离相同时按 bin_id 升序选择
    /// - 无坐标的桶按 bin_id 追加在末尾
    #[instrument(skip(bins), fields(count = bins.len()))]
    pub fn nearest_neighbor(start: GeoPoint, bins: &[Bin]) -> EngineResult<RoutePlan> {
        let start = geo::validate_point(start.lat, start.lon)?;

        let mut located: Vec<(&Bin, GeoPoint)> = Vec::new();
        let mut unlocated: Vec<&Bin> = Vec::new();
        for bin in bins {
            match bin.location {
                Some(p) => located.push((bin, geo::validate_point(p.lat, p.lon)?)),
                None => unlocated.push(bin),
            }
        }

        let mut stops = Vec::with_capacity(bins.len());
        let mut total_distance_km = 0.0;
        let mut current = start;

        while !located.is_empty() {
            let mut best_idx = 0;
            let mut best_dist = f64::INFINITY;
            for (idx, (bin, point)) in located.iter().enumerate() {
                let d = geo::distance_between(&current, point)?;
                let closer = d < best_dist
                    || (d == best_dist && bin.bin_id < located[best_idx].0.bin_id);
                if closer {
                    best_idx = idx;
                    best_dist = d;
                }
            }

            let (bin, point) = located.swap_remove(best_idx);
            total_distance_km += best_dist;
            current = point;
            stops.push(RouteStop {
                sequence: stops.len() + 1,
                bin_id: bin.bin_id.clone(),
                leg_distance_km: Some(best_dist),
            });
        }

        unlocated.sort_by(|a, b| a.bin_id.cmp(&b.bin_id));
        let unlocated_stops = unlocated.len();
        for bin in unlocated {
            stops.push(RouteStop {
                sequence: stops.len() + 1,
                bin_id: bin.bin_id.clone(),
                leg_distance_km: None,
            });
        }

        tracing::debug!(stops = stops.len(), total_distance_km, "路线构建完成");

        Ok(RoutePlan {
            start,
            stops,
            total_distance_km,
            unlocated_stops,
        })
    }
}
