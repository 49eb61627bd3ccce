// ==========================================
// 城市垃圾收运调度 - 满溢等级判定引擎
// ==========================================
// 红线: 等级制,不是评分制
// 红线: 等级读时计算,不作为派生状态存储
// ==========================================
// 职责: 满溢率 → UrgencyTier / AlertSeverity
// 输入: fill_level (0-100)
// 输出: 等级 (全函数,区间外报错)
// ==========================================

use crate::domain::types::{AlertSeverity, UrgencyTier};
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

// ==========================================
// UrgencyThresholds - 等级阈值
// ==========================================
// 约定: 每档下界包含
//   fill <  half             → Empty
//   half <= fill < full      → Half
//   full <= fill < overflow  → Full
//   fill >= overflow         → Overflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencyThresholds {
    pub half: i32,
    pub full: i32,
    pub overflow: i32,
}

impl Default for UrgencyThresholds {
    fn default() -> Self {
        Self {
            half: 20,
            full: 60,
            overflow: 90,
        }
    }
}

impl UrgencyThresholds {
    /// 构造并校验阈值: 0 < half < full < overflow <= 100
    pub fn new(half: i32, full: i32, overflow: i32) -> EngineResult<Self> {
        let thresholds = Self { half, full, overflow };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !(0 < self.half && self.half < self.full && self.full < self.overflow && self.overflow <= 100)
        {
            return Err(EngineError::InvalidThresholds(format!(
                "需满足 0 < half({}) < full({}) < overflow({}) <= 100",
                self.half, self.full, self.overflow
            )));
        }
        Ok(())
    }
}

/// 校验满溢率在 [0, 100]
pub fn validate_fill_level(fill_level: i32) -> EngineResult<i32> {
    if !(0..=100).contains(&fill_level) {
        return Err(EngineError::InvalidFillLevel { value: fill_level });
    }
    Ok(fill_level)
}

// ==========================================
// UrgencyClassifier - 满溢等级判定
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct UrgencyClassifier {
    thresholds: UrgencyThresholds,
}

impl UrgencyClassifier {
    /// 使用已校验的阈值创建判定器
    pub fn new(thresholds: UrgencyThresholds) -> EngineResult<Self> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> UrgencyThresholds {
        self.thresholds
    }

    /// 判定满溢等级
    ///
    /// # 错误
    /// - fill_level ∉ [0, 100] → InvalidFillLevel
    pub fn classify(&self, fill_level: i32) -> EngineResult<UrgencyTier> {
        let fill = validate_fill_level(fill_level)?;
        let t = &self.thresholds;

        let tier = if fill >= t.overflow {
            UrgencyTier::Overflow
        } else if fill >= t.full {
            UrgencyTier::Full
        } else if fill >= t.half {
            UrgencyTier::Half
        } else {
            UrgencyTier::Empty
        };
        Ok(tier)
    }

    /// 告警视角: Low / Medium / High / Critical
    pub fn severity(&self, fill_level: i32) -> EngineResult<AlertSeverity> {
        self.classify(fill_level).map(UrgencyTier::severity)
    }
}
