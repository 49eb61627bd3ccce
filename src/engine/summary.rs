// ==========================================
// 城市垃圾收运调度 - 看板聚合统计引擎
// ==========================================
// 职责: 实体快照 → 分类计数/百分比/比率
// 口径: 百分比 round-half-up 到整数
// 红线: 分母为 0 时返回 Ratio::Undefined,不输出 NaN/Infinity
// ==========================================
// 纯函数,无 I/O
// ==========================================

use crate::domain::bin::Bin;
use crate::domain::fleet::{CollectionRoute, Truck};
use crate::domain::landfill::Landfill;
use crate::domain::summary::{
    BinReport, CategoryCount, DashboardSummary, LandfillReport, Ratio, RouteReport,
    SummaryStatistics, TruckReport,
};
use crate::domain::types::{BinServiceStatus, LandfillStatus, TruckStatus};
use crate::engine::collection::needs_collection;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::urgency::UrgencyClassifier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// 基础算子
// ==========================================

/// 整数百分比, round-half-up
///
/// total 为 0 时返回 0（调用方应先判断 total）
pub fn percent_half_up(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count * 200 + total) / (total * 2)) as u32
}

/// 比率 numerator / denominator; 分母为 0 或结果非有限 → Undefined
pub fn ratio(numerator: f64, denominator: f64) -> Ratio {
    if denominator == 0.0 {
        return Ratio::Undefined;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        Ratio::Defined(value)
    } else {
        Ratio::Undefined
    }
}

/// 严格版本: 分母为 0 直接报错
pub fn checked_ratio(numerator: f64, denominator: f64, context: &str) -> EngineResult<f64> {
    ratio(numerator, denominator)
        .value()
        .ok_or_else(|| EngineError::DivisionByZero {
            context: context.to_string(),
        })
}

/// 使用率百分比 used / total × 100
pub fn usage_percentage(used: f64, total: f64) -> Ratio {
    match ratio(used, total) {
        Ratio::Defined(v) => Ratio::Defined(v * 100.0),
        Ratio::Undefined => Ratio::Undefined,
    }
}

/// 通用分类统计
///
/// classifier 为每个实体给出类别; 类别按 Ord 升序输出
pub fn summarize<T, K, F>(entities: &[T], classifier: F) -> SummaryStatistics<K>
where
    K: Ord + Copy,
    F: Fn(&T) -> K,
{
    let mut counts: BTreeMap<K, usize> = BTreeMap::new();
    for entity in entities {
        *counts.entry(classifier(entity)).or_insert(0) += 1;
    }

    let total = entities.len();
    let categories = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category,
            count,
            percentage: percent_half_up(count, total),
        })
        .collect();

    SummaryStatistics { total, categories }
}

/// 可失败分类器的版本（例如满溢率校验）
pub fn try_summarize<T, K, F>(entities: &[T], classifier: F) -> EngineResult<SummaryStatistics<K>>
where
    K: Ord + Copy,
    F: Fn(&T) -> EngineResult<K>,
{
    let keys = entities
        .iter()
        .map(&classifier)
        .collect::<EngineResult<Vec<K>>>()?;
    Ok(summarize(&keys, |k| *k))
}

// ==========================================
// 填埋场阈值
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandfillThresholds {
    pub near_full_pct: f64,
    pub full_pct: f64,
}

impl Default for LandfillThresholds {
    fn default() -> Self {
        Self {
            near_full_pct: 70.0,
            full_pct: 90.0,
        }
    }
}

impl LandfillThresholds {
    /// 校验: 均为有限值且 0 < near_full <= full <= 100
    pub fn validate(&self) -> EngineResult<()> {
        let ordered = self.near_full_pct.is_finite()
            && self.full_pct.is_finite()
            && 0.0 < self.near_full_pct
            && self.near_full_pct <= self.full_pct
            && self.full_pct <= 100.0;
        if !ordered {
            return Err(EngineError::InvalidThresholds(format!(
                "需满足 0 < near_full({}) <= full({}) <= 100",
                self.near_full_pct, self.full_pct
            )));
        }
        Ok(())
    }

    /// 按使用率判定状态; 已关闭的场地固定为 Closed
    pub fn status_of(&self, landfill: &Landfill) -> LandfillStatus {
        if landfill.closed {
            return LandfillStatus::Closed;
        }
        let usage = usage_percentage(landfill.used_tons, landfill.capacity_tons).or_zero();
        if usage >= self.full_pct {
            LandfillStatus::Full
        } else if usage >= self.near_full_pct {
            LandfillStatus::NearFull
        } else {
            LandfillStatus::Active
        }
    }
}

// ==========================================
// SummaryEngine - 分实体报表
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryEngine {
    classifier: UrgencyClassifier,
    landfill_thresholds: LandfillThresholds,
}

impl SummaryEngine {
    pub fn new(classifier: UrgencyClassifier, landfill_thresholds: LandfillThresholds) -> Self {
        Self {
            classifier,
            landfill_thresholds,
        }
    }

    /// 垃圾桶: 按满溢等级统计 + 平均满溢率
    pub fn summarize_bins(&self, bins: &[Bin]) -> EngineResult<BinReport> {
        let statistics = try_summarize(bins, |b| self.classifier.classify(b.fill_level))?;
        let fill_sum: f64 = bins.iter().map(|b| b.fill_level as f64).sum();
        Ok(BinReport {
            statistics,
            average_fill_level: ratio(fill_sum, bins.len() as f64),
            missing_location: bins.iter().filter(|b| b.location.is_none()).count(),
        })
    }

    /// 车队: 按状态统计 + 载重使用率
    pub fn summarize_trucks(&self, trucks: &[Truck]) -> TruckReport {
        let statistics = summarize(trucks, |t| t.status);
        let load: f64 = trucks.iter().filter_map(|t| t.current_load).sum();
        let capacity: f64 = trucks.iter().filter_map(|t| t.capacity).sum();
        TruckReport {
            statistics,
            load_usage: usage_percentage(load, capacity),
        }
    }

    /// 路线: 按状态统计 + 里程
    pub fn summarize_routes(&self, routes: &[CollectionRoute]) -> RouteReport {
        let statistics = summarize(routes, |r| r.status);
        let distances: Vec<f64> = routes.iter().filter_map(|r| r.distance_km).collect();
        let total_distance_km: f64 = distances.iter().sum();
        RouteReport {
            statistics,
            total_distance_km,
            average_distance_km: ratio(total_distance_km, distances.len() as f64),
        }
    }

    /// 填埋场: 按状态统计 + 总使用率 + 临满场地数
    pub fn summarize_landfills(&self, landfills: &[Landfill]) -> LandfillReport {
        let thresholds = self.landfill_thresholds;
        let statistics = summarize(landfills, |l| thresholds.status_of(l));
        let total_capacity_tons: f64 = landfills.iter().map(|l| l.capacity_tons).sum();
        let total_used_tons: f64 = landfills.iter().map(|l| l.used_tons).sum();
        let near_full_sites = landfills
            .iter()
            .filter(|l| usage_percentage(l.used_tons, l.capacity_tons).or_zero() >= thresholds.near_full_pct)
            .count();

        LandfillReport {
            statistics,
            total_capacity_tons,
            total_used_tons,
            usage: usage_percentage(total_used_tons, total_capacity_tons),
            near_full_sites,
        }
    }

    /// 驾驶舱汇总计数
    ///
    /// full_bins 与收运候选口径一致（状态标签 Full 或满溢率 >= collection_threshold）
    pub fn dashboard_summary(
        &self,
        bins: &[Bin],
        trucks: &[Truck],
        collection_threshold: i32,
    ) -> EngineResult<DashboardSummary> {
        let mut full_bins = 0;
        for bin in bins {
            if needs_collection(bin, collection_threshold)? {
                full_bins += 1;
            }
        }
        let service = summarize(bins, |b| b.service_status);
        let fleet = summarize(trucks, |t| t.status);

        Ok(DashboardSummary {
            total_bins: bins.len(),
            active_bins: service.count(BinServiceStatus::InService),
            available_bins: service.count(BinServiceStatus::Active),
            full_bins,
            active_trucks: fleet.count(TruckStatus::OnRoute),
            idle_trucks: fleet.count(TruckStatus::Idle),
        })
    }
}
