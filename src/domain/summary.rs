// ==========================================
// 城市垃圾收运调度 - 看板统计模型
// ==========================================
// 统计结果只是快照投影,从不作为数据源
// 比率: 分母为 0 时显式 Undefined,不向外传播 NaN/Infinity
// ==========================================

use crate::domain::types::{LandfillStatus, RouteStatus, TruckStatus, UrgencyTier};
use serde::{Deserialize, Serialize};

// ==========================================
// Ratio - 可能未定义的比率
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ratio {
    Defined(f64),
    Undefined,
}

impl Ratio {
    pub fn value(self) -> Option<f64> {
        match self {
            Ratio::Defined(v) => Some(v),
            Ratio::Undefined => None,
        }
    }

    /// 展示口径: 未定义按 0 显示
    pub fn or_zero(self) -> f64 {
        self.value().unwrap_or(0.0)
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Ratio::Defined(_))
    }
}

// ==========================================
// CategoryCount - 单类别计数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount<K> {
    pub category: K,
    pub count: usize,
    pub percentage: u32, // 四舍五入(half-up)到整数百分比
}

// ==========================================
// SummaryStatistics - 分类统计
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics<K> {
    pub total: usize,
    pub categories: Vec<CategoryCount<K>>, // 按类别升序,仅含出现过的类别
}

impl<K: PartialEq + Copy> SummaryStatistics<K> {
    pub fn empty() -> Self {
        Self {
            total: 0,
            categories: Vec::new(),
        }
    }

    /// 指定类别的数量(未出现为 0)
    pub fn count(&self, category: K) -> usize {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.count)
            .unwrap_or(0)
    }

    /// 指定类别的百分比; total 为 0 时返回 None
    pub fn percentage(&self, category: K) -> Option<u32> {
        if self.total == 0 {
            return None;
        }
        Some(
            self.categories
                .iter()
                .find(|c| c.category == category)
                .map(|c| c.percentage)
                .unwrap_or(0),
        )
    }
}

// ==========================================
// 分实体报表
// ==========================================

/// 垃圾桶报表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinReport {
    pub statistics: SummaryStatistics<UrgencyTier>,
    pub average_fill_level: Ratio,
    pub missing_location: usize,
}

/// 车队报表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckReport {
    pub statistics: SummaryStatistics<TruckStatus>,
    pub load_usage: Ratio, // sum(current_load) / sum(capacity) * 100
}

/// 路线报表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteReport {
    pub statistics: SummaryStatistics<RouteStatus>,
    pub total_distance_km: f64,
    pub average_distance_km: Ratio,
}

/// 填埋场报表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandfillReport {
    pub statistics: SummaryStatistics<LandfillStatus>,
    pub total_capacity_tons: f64,
    pub total_used_tons: f64,
    pub usage: Ratio,
    pub near_full_sites: usize,
}

// ==========================================
// DashboardSummary - 驾驶舱汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_bins: usize,
    pub active_bins: usize,    // 已分配到路线 (IN_SERVICE)
    pub available_bins: usize, // 可用 (ACTIVE)
    pub full_bins: usize,      // 需要收运
    pub active_trucks: usize,  // ON_ROUTE
    pub idle_trucks: usize,
}
