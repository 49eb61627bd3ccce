// ==========================================
// 城市垃圾收运调度 - 监控告警模型
// ==========================================

use crate::domain::types::AlertSeverity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 告警类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    OverfilledBin,
    SensorError,
    TruckDelay,
}

impl AlertType {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertType::OverfilledBin => "OVERFILLED_BIN",
            AlertType::SensorError => "SENSOR_ERROR",
            AlertType::TruckDelay => "TRUCK_DELAY",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "OVERFILLED_BIN" => Some(AlertType::OverfilledBin),
            "SENSOR_ERROR" => Some(AlertType::SensorError),
            "TRUCK_DELAY" => Some(AlertType::TruckDelay),
            _ => None,
        }
    }
}

// ==========================================
// MonitoringAlert - 监控告警
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringAlert {
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub bin_id: Option<String>,
    pub truck_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
