// ==========================================
// 城市垃圾收运调度 - 垃圾桶领域模型
// ==========================================
// Bin: 外部快照,引擎只读
// BinReading: 传感器读数(导入层产出)
// PrioritizedBin: 单次排序的计算结果,不落库
// ==========================================

use crate::domain::location::GeoPoint;
use crate::domain::types::{BinServiceStatus, UrgencyTier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Bin - 垃圾桶快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    // ===== 主键 =====
    pub bin_id: String,

    // ===== 位置 =====
    pub address: Option<String>,
    pub location: Option<GeoPoint>, // 缺失时仍可参与紧急度视图

    // ===== 状态 =====
    pub fill_level: i32,                    // 满溢率 0-100 (%)
    pub capacity: f64,                      // 容量 (单位由部署配置决定)
    pub status_label: Option<String>,       // 源系统状态标签,如 "Full"
    pub service_status: BinServiceStatus,   // 收运分配状态
    pub last_serviced: Option<DateTime<Utc>>,
}

impl Bin {
    /// 以最少字段构造(测试与适配层常用)
    pub fn new(bin_id: impl Into<String>, fill_level: i32, location: Option<GeoPoint>) -> Self {
        Self {
            bin_id: bin_id.into(),
            address: None,
            location,
            fill_level,
            capacity: 100.0,
            status_label: None,
            service_status: BinServiceStatus::Active,
            last_serviced: None,
        }
    }
}

// ==========================================
// BinReading - 传感器读数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinReading {
    pub bin_id: String,
    pub fill_level: i32,
    pub status_label: Option<String>,
    pub read_at: DateTime<Utc>,
}

// ==========================================
// PrioritizedBin - 排序结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrioritizedBin {
    pub bin: Bin,
    pub tier: UrgencyTier,
    pub distance_km: Option<f64>, // None = 坐标缺失,距离不可用
    pub rank: usize,              // 1-based
}
