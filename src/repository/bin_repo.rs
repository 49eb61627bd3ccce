// ==========================================
// 城市垃圾收运调度 - 垃圾桶数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 表: bins (主数据) + bin_readings (传感器读数)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::bin::{Bin, BinReading};
use crate::domain::location::GeoPoint;
use crate::domain::types::BinServiceStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// BinRepository - 垃圾桶仓储
// ==========================================
pub struct BinRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BinRepository {
    /// 创建新的仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入
    // ==========================================

    /// 批量 UPSERT 主数据（不覆盖 service_status / last_serviced; 空的地址/坐标保留原值）
    pub fn upsert_bins(&self, bins: &[Bin]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO bins (bin_id, address, lat, lon, capacity)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(bin_id) DO UPDATE SET
                    address = COALESCE(excluded.address, bins.address),
                    lat = COALESCE(excluded.lat, bins.lat),
                    lon = COALESCE(excluded.lon, bins.lon),
                    capacity = excluded.capacity
                "#,
            )?;
            for bin in bins {
                count += stmt.execute(params![
                    bin.bin_id,
                    bin.address,
                    bin.location.map(|p| p.lat),
                    bin.location.map(|p| p.lon),
                    bin.capacity,
                ])?;
            }
        }

        tx.commit()?;
        Ok(count)
    }

    /// 批量写入读数
    pub fn insert_readings(&self, readings: &[BinReading], batch_id: &str) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO bin_readings (bin_id, fill_level, status_label, read_at, batch_id)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;
            for r in readings {
                count += stmt.execute(params![
                    r.bin_id,
                    r.fill_level,
                    r.status_label,
                    r.read_at,
                    batch_id
                ])?;
            }
        }

        tx.commit()?;
        Ok(count)
    }

    /// 更新服务状态
    pub fn set_service_status(
        &self,
        bin_ids: &[String],
        status: BinServiceStatus,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let mut count = 0;
        for id in bin_ids {
            count += conn.execute(
                "UPDATE bins SET service_status = ?1 WHERE bin_id = ?2",
                params![status.as_str(), id],
            )?;
        }
        Ok(count)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 全部垃圾桶快照（满溢率取最新读数; 无读数按 0）
    pub fn list_bins(&self) -> RepositoryResult<Vec<Bin>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                b.bin_id, b.address, b.lat, b.lon, b.capacity,
                b.service_status, b.last_serviced,
                (SELECT r.fill_level FROM bin_readings r
                  WHERE r.bin_id = b.bin_id
                  ORDER BY r.read_at DESC, r.reading_id DESC LIMIT 1) AS fill_level,
                (SELECT r.status_label FROM bin_readings r
                  WHERE r.bin_id = b.bin_id
                  ORDER BY r.read_at DESC, r.reading_id DESC LIMIT 1) AS status_label
            FROM bins b
            ORDER BY b.bin_id
            "#,
        )?;

        let rows = stmt.query_map([], map_bin_row)?;
        let mut bins = Vec::new();
        for row in rows {
            bins.push(row??);
        }
        Ok(bins)
    }

    /// 按 ID 查询
    pub fn find_by_id(&self, bin_id: &str) -> RepositoryResult<Option<Bin>> {
        Ok(self.list_bins()?.into_iter().find(|b| b.bin_id == bin_id))
    }

    /// 每个桶的最新读数
    pub fn latest_readings(&self) -> RepositoryResult<Vec<BinReading>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT r.bin_id, r.fill_level, r.status_label, r.read_at
            FROM bin_readings r
            WHERE r.reading_id = (
                SELECT r2.reading_id FROM bin_readings r2
                WHERE r2.bin_id = r.bin_id
                ORDER BY r2.read_at DESC, r2.reading_id DESC LIMIT 1
            )
            ORDER BY r.bin_id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(BinReading {
                bin_id: row.get(0)?,
                fill_level: row.get(1)?,
                status_label: row.get(2)?,
                read_at: row.get::<_, DateTime<Utc>>(3)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// 读数总条数
    pub fn count_readings(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM bin_readings", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

/// 行映射: 外层 rusqlite 错误, 内层字段校验错误
fn map_bin_row(row: &Row<'_>) -> rusqlite::Result<RepositoryResult<Bin>> {
    let bin_id: String = row.get(0)?;
    let lat: Option<f64> = row.get(2)?;
    let lon: Option<f64> = row.get(3)?;
    let service_status: String = row.get(5)?;

    let location = match (lat, lon) {
        (Some(lat), Some(lon)) => Some(GeoPoint { lat, lon }),
        (None, None) => None,
        _ => {
            return Ok(Err(RepositoryError::FieldValueError {
                field: "lat/lon".to_string(),
                message: format!("bin_id={} 经纬度不成对", bin_id),
            }))
        }
    };

    let service_status = match BinServiceStatus::parse(&service_status) {
        Some(s) => s,
        None => {
            return Ok(Err(RepositoryError::FieldValueError {
                field: "service_status".to_string(),
                message: format!("未知状态: {}", service_status),
            }))
        }
    };

    Ok(Ok(Bin {
        bin_id,
        address: row.get(1)?,
        location,
        fill_level: row.get::<_, Option<i32>>(7)?.unwrap_or(0),
        capacity: row.get(4)?,
        status_label: row.get(8)?,
        service_status,
        last_serviced: row.get::<_, Option<DateTime<Utc>>>(6)?,
    }))
}
