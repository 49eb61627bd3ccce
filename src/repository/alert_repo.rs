// ==========================================
// 城市垃圾收运调度 - 监控告警仓储
// ==========================================
// 只追加, 查询按 created_at 倒序
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::alert::{AlertType, MonitoringAlert};
use crate::domain::types::AlertSeverity;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::instrument;

pub struct AlertRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AlertRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 批量写入告警
    #[instrument(skip(self, alerts), fields(count = alerts.len()))]
    pub fn insert_batch(&self, alerts: &[MonitoringAlert]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO monitoring_alerts
                    (alert_type, severity, message, bin_id, truck_id, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )?;
            for a in alerts {
                count += stmt.execute(params![
                    a.alert_type.as_str(),
                    a.severity.to_string(),
                    a.message,
                    a.bin_id,
                    a.truck_id,
                    a.created_at,
                ])?;
            }
        }
        tx.commit()?;
        Ok(count)
    }

    /// 最近的告警
    pub fn recent(&self, limit: usize) -> RepositoryResult<Vec<MonitoringAlert>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT alert_type, severity, message, bin_id, truck_id, created_at
            FROM monitoring_alerts
            ORDER BY created_at DESC, alert_id DESC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<i64>>(4)?,
                row.get::<_, DateTime<Utc>>(5)?,
            ))
        })?;

        let mut alerts = Vec::new();
        for row in rows {
            let (alert_type, severity, message, bin_id, truck_id, created_at) = row?;
            let alert_type = AlertType::parse(&alert_type).ok_or_else(|| {
                RepositoryError::FieldValueError {
                    field: "alert_type".to_string(),
                    message: alert_type.clone(),
                }
            })?;
            let severity = AlertSeverity::parse(&severity).ok_or_else(|| {
                RepositoryError::FieldValueError {
                    field: "severity".to_string(),
                    message: severity.clone(),
                }
            })?;
            alerts.push(MonitoringAlert {
                alert_type,
                severity,
                message,
                bin_id,
                truck_id,
                created_at,
            });
        }
        Ok(alerts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn alert(minute: u32, severity: AlertSeverity) -> MonitoringAlert {
        MonitoringAlert {
            alert_type: AlertType::OverfilledBin,
            severity,
            message: format!("m{}", minute),
            bin_id: Some("B1".to_string()),
            truck_id: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, minute, 0).unwrap(),
        }
    }

    #[test]
    fn test_recent_newest_first_with_limit() {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        let repo = AlertRepository::from_connection(Arc::new(Mutex::new(conn)));

        repo.insert_batch(&[
            alert(1, AlertSeverity::High),
            alert(5, AlertSeverity::Critical),
            alert(3, AlertSeverity::Medium),
        ])
        .unwrap();

        let recent = repo.recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].message, "m5");
        assert_eq!(recent[0].severity, AlertSeverity::Critical);
        assert_eq!(recent[1].message, "m3");
    }
}
