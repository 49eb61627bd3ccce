// ==========================================
// 城市垃圾收运调度 - 填埋场领域模型
// ==========================================

use crate::domain::location::GeoPoint;
use serde::{Deserialize, Serialize};

// ==========================================
// Landfill - 填埋场
// ==========================================
// 使用率不存储,由 engine::summary 按需计算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landfill {
    pub landfill_id: i64,
    pub name: String,
    pub capacity_tons: f64, // 总容量 (吨), 可能为 0
    pub used_tons: f64,     // 已使用 (吨)
    pub closed: bool,
    pub location: Option<GeoPoint>,
}
