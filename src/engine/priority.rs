// ==========================================
// 城市垃圾收运调度 - 收运优先级排序引擎
// ==========================================
// 职责: 筛选待收运桶 + 按紧急度/距离排序
// 输入: 垃圾桶快照 + 车场坐标 + 满溢率阈值
// 输出: 排序结果(含名次) + 平均距离 + 等级分布
// ==========================================
// 纯函数: 不修改输入, 同输入同输出
// ==========================================

use crate::domain::bin::{Bin, PrioritizedBin};
use crate::domain::location::DepotPoint;
use crate::domain::summary::SummaryStatistics;
use crate::domain::types::UrgencyTier;
use crate::engine::error::EngineResult;
use crate::engine::geo;
use crate::engine::summary::summarize;
use crate::engine::urgency::{validate_fill_level, UrgencyClassifier};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::instrument;


// ==========================================
// PrioritizationResult - 排序结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrioritizationResult {
    pub capacity_threshold: i32,
    pub bins: Vec<PrioritizedBin>,
    /// 仅统计有坐标的桶; 全部缺失时为 None（不可用,不是 0）
    pub average_distance_km: Option<f64>,
    pub tier_counts: SummaryStatistics<UrgencyTier>,
}

impl PrioritizationResult {
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// 距离不可用的桶数量
    pub fn missing_distance_count(&self) -> usize {
        self.bins.iter().filter(|b| b.distance_km.is_none()).count()
    }
}

// ==========================================
// BinPrioritizer - 收运优先级排序
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct BinPrioritizer {
    classifier: UrgencyClassifier,
}

impl BinPrioritizer {
    pub fn new(classifier: UrgencyClassifier) -> Self {
        Self { classifier }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 排序待收运垃圾桶
    ///
    /// 排序键:
    /// 1) 满溢等级降序 (Overflow 优先)
    /// 2) 距车场距离升序 (距离未知排在已知之后)
    /// 3) bin_id 升序 (保证确定性)
    ///
    /// # 错误
    /// - 任一输入桶 fill_level ∉ [0, 100] → InvalidFillLevel
    /// - capacity_threshold ∉ [0, 100] → InvalidFillLevel
    /// - 车场或桶坐标越界 → InvalidCoordinate
    ///
    /// 坐标缺失(location=None)不是错误: distance_km=None
    #[instrument(skip(self, bins, depot), fields(count = bins.len()))]
    pub fn prioritize(
        &self,
        bins: &[Bin],
        depot: &DepotPoint,
        capacity_threshold: i32,
    ) -> EngineResult<PrioritizationResult> {
        let threshold = validate_fill_level(capacity_threshold)?;
        let origin = geo::validate_point(depot.location.lat, depot.location.lon)?;

        let mut urgent = Vec::new();
        for bin in bins {
            let fill = validate_fill_level(bin.fill_level)?;
            if fill < threshold {
                continue;
            }

            let tier = self.classifier.classify(fill)?;
            let distance_km = match &bin.location {
                Some(point) => Some(geo::distance_between(&origin, point)?),
                None => None,
            };

            urgent.push(PrioritizedBin {
                bin: bin.clone(),
                tier,
                distance_km,
                rank: 0,
            });
        }

        urgent.sort_by(compare);
        for (idx, item) in urgent.iter_mut().enumerate() {
            item.rank = idx + 1;
        }

        let known: Vec<f64> = urgent.iter().filter_map(|b| b.distance_km).collect();
        let average_distance_km = if known.is_empty() {
            None
        } else {
            Some(known.iter().sum::<f64>() / known.len() as f64)
        };

        let tier_counts = summarize(&urgent, |b| b.tier);

        tracing::debug!(
            urgent = urgent.len(),
            missing_distance = urgent.len() - known.len(),
            "收运优先级排序完成"
        );

        Ok(PrioritizationResult {
            capacity_threshold: threshold,
            bins: urgent,
            average_distance_km,
            tier_counts,
        })
    }
}

/// 便捷入口: 使用默认阈值 (20/60/90)
pub fn prioritize(
    bins: &[Bin],
    depot: &DepotPoint,
    capacity_threshold: i32,
) -> EngineResult<PrioritizationResult> {
    BinPrioritizer::default().prioritize(bins, depot, capacity_threshold)
}

// ==========================================
// 比较方法
// ==========================================

/// Ordering::Less 表示 a 优先于 b
fn compare(a: &PrioritizedBin, b: &PrioritizedBin) -> Ordering {
    // 1. 等级降序
    match b.tier.cmp(&a.tier) {
        Ordering::Equal => {}
        other => return other,
    }

    // 2. 距离升序, None 在后
    let by_distance = match (a.distance_km, b.distance_km) {
        (Some(da), Some(db)) => da.total_cmp(&db),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    if by_distance != Ordering::Equal {
        return by_distance;
    }

    // 3. bin_id 升序
    a.bin.bin_id.cmp(&b.bin.bin_id)
}
