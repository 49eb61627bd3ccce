// ==========================================
// 城市垃圾收运调度 - 填埋场仓储
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::landfill::Landfill;
use crate::domain::location::GeoPoint;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct LandfillRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LandfillRepository {
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

    /// 登记缺失的填埋场 (name, capacity_tons, used_tons), 已存在的不改动
    ///
    /// # 返回
    /// 新增数量
    pub fn ensure_landfills(&self, sites: &[(&str, f64, f64)]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let mut added = 0;
        for (name, capacity_tons, used_tons) in sites {
            added += tx.execute(
                "INSERT INTO landfills (name, capacity_tons, used_tons) VALUES (?1, ?2, ?3)
                 ON CONFLICT(name) DO NOTHING",
                params![name, capacity_tons, used_tons],
            )?;
        }
        tx.commit()?;
        Ok(added)
    }

    /// 按名称 UPSERT（landfill_id 由数据库分配, 入参中的值被忽略）
    pub fn upsert(&self, landfill: &Landfill) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO landfills (name, capacity_tons, used_tons, closed, lat, lon)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(name) DO UPDATE SET
                capacity_tons = excluded.capacity_tons,
                used_tons = excluded.used_tons,
                closed = excluded.closed,
                lat = excluded.lat,
                lon = excluded.lon
            "#,
            params![
                landfill.name,
                landfill.capacity_tons,
                landfill.used_tons,
                landfill.closed,
                landfill.location.map(|p| p.lat),
                landfill.location.map(|p| p.lon),
            ],
        )?;

        let id = conn.query_row(
            "SELECT landfill_id FROM landfills WHERE name = ?1",
            params![landfill.name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn list(&self) -> RepositoryResult<Vec<Landfill>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT landfill_id, name, capacity_tons, used_tons, closed, lat, lon
            FROM landfills
            ORDER BY landfill_id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            let lat: Option<f64> = row.get(5)?;
            let lon: Option<f64> = row.get(6)?;
            Ok(Landfill {
                landfill_id: row.get(0)?,
                name: row.get(1)?,
                capacity_tons: row.get(2)?,
                used_tons: row.get(3)?,
                closed: row.get(4)?,
                location: lat.zip(lon).map(|(lat, lon)| GeoPoint { lat, lon }),
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_by_name() {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        let repo = LandfillRepository::from_connection(Arc::new(Mutex::new(conn)));

        let mut site = Landfill {
            landfill_id: 0,
            name: "Northern Landfill".to_string(),
            capacity_tons: 10_000.0,
            used_tons: 2_500.0,
            closed: false,
            location: None,
        };
        let id = repo.upsert(&site).unwrap();
        site.used_tons = 9_100.0;
        assert_eq!(repo.upsert(&site).unwrap(), id);

        let all = repo.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].used_tons, 9_100.0);
    }

    #[test]
    fn test_ensure_landfills_keeps_existing_usage() {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        let repo = LandfillRepository::from_connection(Arc::new(Mutex::new(conn)));

        let sites = [("Central Landfill", 10_000.0, 4_000.0), ("East Waste Facility", 8_000.0, 2_500.0)];
        assert_eq!(repo.ensure_landfills(&sites).unwrap(), 2);

        let mut central = repo.list().unwrap().remove(0);
        central.used_tons = 7_000.0;
        repo.upsert(&central).unwrap();

        assert_eq!(repo.ensure_landfills(&sites).unwrap(), 0);
        let all = repo.list().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Central Landfill");
        assert_eq!(all[0].used_tons, 7_000.0);
    }
}
