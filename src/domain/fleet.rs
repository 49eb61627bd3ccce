// ==========================================
// 城市垃圾收运调度 - 车队与路线领域模型
// ==========================================

use crate::domain::location::GeoPoint;
use crate::domain::types::{RouteStatus, TruckStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Truck - 收运车辆
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Truck {
    pub truck_id: i64,
    pub name: String,
    pub status: TruckStatus,
    pub capacity: Option<f64>,
    pub current_load: Option<f64>,
    pub location: Option<GeoPoint>,
}

// ==========================================
// CollectionRoute - 收运路线(历史记录)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionRoute {
    pub route_id: String,
    pub truck_id: Option<i64>,
    pub status: RouteStatus,
    pub bin_sequence: Vec<String>,  // 按访问顺序的桶编号
    pub distance_km: Option<f64>,
    pub assigned_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

// ==========================================
// CollectionTransaction - 收运流水
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionTransaction {
    pub truck_id: i64,
    pub route_id: String,
    pub bins_collected: usize,
    pub waste_weight: f64,
    pub created_at: DateTime<Utc>,
}
