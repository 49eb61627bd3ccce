// ==========================================
// 城市垃圾收运调度 - 引擎参数
// ==========================================
// 来源: config_kv (见 ConfigManager), 缺失项取默认值
// ==========================================

use crate::domain::location::DepotPoint;
use crate::engine::error::EngineResult;
use crate::engine::geo;
use crate::engine::summary::LandfillThresholds;
use crate::engine::urgency::{validate_fill_level, UrgencyClassifier, UrgencyThresholds};
use serde::{Deserialize, Serialize};

/// 引擎运行参数（按城市/部署区分）
///
/// 所有阈值均为显式参数,默认值取自墨尔本 Argyle Square 试点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 车场坐标（距离原点）
    pub depot: DepotPoint,

    /// 满溢等级阈值
    #[serde(default)]
    pub urgency: UrgencyThresholds,

    /// 收运筛选阈值（%）
    pub collection_threshold_pct: i32,

    /// 填埋场状态阈值
    #[serde(default)]
    pub landfill: LandfillThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            depot: DepotPoint::new(-37.80, 144.96),
            urgency: UrgencyThresholds::default(),
            collection_threshold_pct: 80,
            landfill: LandfillThresholds::default(),
        }
    }
}

impl EngineConfig {
    /// 校验全部参数
    pub fn validate(&self) -> EngineResult<()> {
        geo::validate_point(self.depot.location.lat, self.depot.location.lon)?;
        self.urgency.validate()?;
        self.landfill.validate()?;
        validate_fill_level(self.collection_threshold_pct)?;
        Ok(())
    }

    pub fn classifier(&self) -> EngineResult<UrgencyClassifier> {
        UrgencyClassifier::new(self.urgency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_collection_threshold() {
        let cfg = EngineConfig {
            collection_threshold_pct: 150,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_invalid_landfill_thresholds() {
        let reversed = EngineConfig {
            landfill: LandfillThresholds {
                near_full_pct: 95.0,
                full_pct: 90.0,
            },
            ..EngineConfig::default()
        };
        assert!(reversed.validate().is_err());

        let nan = EngineConfig {
            landfill: LandfillThresholds {
                near_full_pct: f64::NAN,
                full_pct: 90.0,
            },
            ..EngineConfig::default()
        };
        assert!(nan.validate().is_err());

        let equal = EngineConfig {
            landfill: LandfillThresholds {
                near_full_pct: 90.0,
                full_pct: 90.0,
            },
            ..EngineConfig::default()
        };
        assert!(equal.validate().is_ok());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let raw = r#"{"depot":{"location":{"lat":-33.86,"lon":151.2}},"collection_threshold_pct":75}"#;
        let cfg: EngineConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.collection_threshold_pct, 75);
        assert_eq!(cfg.urgency, UrgencyThresholds::default());
        assert_eq!(cfg.depot.location.lat, -33.86);
    }
}
