// ==========================================
// 城市垃圾收运调度 - 收运候选与告警派生
// ==========================================
// 职责:
// - 每个桶取最新读数
// - 选择需要收运的桶 (状态标签为 Full 或满溢率 >= 阈值)
// - 为 High/Critical 桶派生满溢告警
// ==========================================

use crate::domain::alert::{AlertType, MonitoringAlert};
use crate::domain::bin::{Bin, BinReading};
use crate::domain::types::AlertSeverity;
use crate::engine::error::EngineResult;
use crate::engine::urgency::{validate_fill_level, UrgencyClassifier};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// 源系统表示"已满"的状态标签
const FULL_STATUS_LABEL: &str = "FULL";

/// 每个桶只保留时间最新的一条读数, 按 bin_id 升序返回
///
/// 同一时间戳出现多条时保留先出现的一条
pub fn latest_per_bin(readings: &[BinReading]) -> Vec<BinReading> {
    let mut latest: BTreeMap<&str, &BinReading> = BTreeMap::new();
    for reading in readings {
        latest
            .entry(reading.bin_id.as_str())
            .and_modify(|cur| {
                if reading.read_at > cur.read_at {
                    *cur = reading;
                }
            })
            .or_insert(reading);
    }
    latest.into_values().cloned().collect()
}

/// 用最新读数刷新桶快照 (满溢率 + 状态标签)
pub fn apply_latest_readings(bins: &[Bin], readings: &[BinReading]) -> Vec<Bin> {
    let latest: BTreeMap<String, BinReading> = latest_per_bin(readings)
        .into_iter()
        .map(|r| (r.bin_id.clone(), r))
        .collect();

    bins.iter()
        .map(|bin| {
            let mut bin = bin.clone();
            if let Some(reading) = latest.get(&bin.bin_id) {
                bin.fill_level = reading.fill_level;
                bin.status_label = reading.status_label.clone();
            }
            bin
        })
        .collect()
}

/// 是否需要收运
pub fn needs_collection(bin: &Bin, threshold: i32) -> EngineResult<bool> {
    let fill = validate_fill_level(bin.fill_level)?;
    let labelled_full = bin
        .status_label
        .as_deref()
        .map(|s| s.trim().eq_ignore_ascii_case(FULL_STATUS_LABEL))
        .unwrap_or(false);
    Ok(labelled_full || fill >= threshold)
}

/// 选出需要收运的桶（保持输入顺序）
pub fn select_for_collection(bins: &[Bin], threshold: i32) -> EngineResult<Vec<Bin>> {
    validate_fill_level(threshold)?;
    let mut selected = Vec::new();
    for bin in bins {
        if needs_collection(bin, threshold)? {
            selected.push(bin.clone());
        }
    }
    tracing::info!(selected = selected.len(), threshold, "收运候选筛选完成");
    Ok(selected)
}

/// 由桶快照与原始读数得出收运候选
///
/// 先按最新读数刷新每个桶, 再按阈值筛选
pub fn find_bins_for_collection(
    bins: &[Bin],
    readings: &[BinReading],
    threshold: i32,
) -> EngineResult<Vec<Bin>> {
    select_for_collection(&apply_latest_readings(bins, readings), threshold)
}

/// 为 High / Critical 桶派生满溢告警
pub fn derive_fill_alerts(
    bins: &[Bin],
    classifier: &UrgencyClassifier,
    now: DateTime<Utc>,
) -> EngineResult<Vec<MonitoringAlert>> {
    let mut alerts = Vec::new();
    for bin in bins {
        let severity = classifier.severity(bin.fill_level)?;
        if severity < AlertSeverity::High {
            continue;
        }
        alerts.push(MonitoringAlert {
            alert_type: AlertType::OverfilledBin,
            severity,
            message: crate::i18n::fill_alert(&bin.bin_id, bin.fill_level),
            bin_id: Some(bin.bin_id.clone()),
            truck_id: None,
            created_at: now,
        });
    }
    Ok(alerts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reading(id: &str, fill: i32, minute: u32) -> BinReading {
        BinReading {
            bin_id: id.to_string(),
            fill_level: fill,
            status_label: None,
            read_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, minute, 0).unwrap(),
        }
    }

    #[test]
    fn test_latest_per_bin() {
        let readings = vec![
            reading("B2", 40, 0),
            reading("B1", 10, 5),
            reading("B1", 85, 30),
            reading("B1", 50, 10),
        ];
        let latest = latest_per_bin(&readings);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].bin_id, "B1");
        assert_eq!(latest[0].fill_level, 85);
        assert_eq!(latest[1].fill_level, 40);
    }

    #[test]
    fn test_apply_latest_readings() {
        let bins = vec![Bin::new("B1", 0, None), Bin::new("B9", 12, None)];
        let refreshed = apply_latest_readings(&bins, &[reading("B1", 77, 1)]);
        assert_eq!(refreshed[0].fill_level, 77);
        assert_eq!(refreshed[1].fill_level, 12);
    }

    #[test]
    fn test_select_by_label_or_threshold() {
        let mut labelled = Bin::new("LABEL", 40, None);
        labelled.status_label = Some("Full".to_string());
        let bins = vec![labelled, Bin::new("HIGH", 80, None), Bin::new("LOW", 79, None)];

        let selected = select_for_collection(&bins, 80).unwrap();
        let ids: Vec<_> = selected.iter().map(|b| b.bin_id.as_str()).collect();
        assert_eq!(ids, vec!["LABEL", "HIGH"]);
    }

    #[test]
    fn test_find_bins_for_collection_uses_latest_reading() {
        let bins = vec![Bin::new("B1", 0, None), Bin::new("B2", 0, None)];
        let readings = vec![
            reading("B1", 95, 0),
            reading("B1", 30, 10),
            reading("B2", 85, 5),
        ];
        let selected = find_bins_for_collection(&bins, &readings, 80).unwrap();
        let ids: Vec<&str> = selected.iter().map(|b| b.bin_id.as_str()).collect();
        assert_eq!(ids, vec!["B2"]);
        assert_eq!(selected[0].fill_level, 85);
    }

    #[test]
    fn test_select_rejects_invalid_fill() {
        let bins = vec![Bin::new("BAD", 101, None)];
        assert!(select_for_collection(&bins, 80).is_err());
    }

    #[test]
    fn test_derive_fill_alerts() {
        let bins = vec![
            Bin::new("LOW", 10, None),
            Bin::new("HIGH", 70, None),
            Bin::new("CRIT", 95, None),
        ];
        let now = Utc::now();
        let alerts = derive_fill_alerts(&bins, &UrgencyClassifier::default(), now).unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].severity, AlertSeverity::High);
        assert_eq!(alerts[1].severity, AlertSeverity::Critical);
        assert_eq!(alerts[1].bin_id.as_deref(), Some("CRIT"));
        assert!(alerts[1].message.contains("CRIT"));
    }
}
