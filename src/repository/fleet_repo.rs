// ==========================================
// 城市垃圾收运调度 - 车队与路线仓储
// ==========================================
// 表: trucks / truck_routes / collection_transactions
// 派车与完成路线各自在单个事务内完成, 失败整体回滚
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::fleet::{CollectionRoute, CollectionTransaction, Truck};
use crate::domain::location::GeoPoint;
use crate::domain::types::{BinServiceStatus, RouteStatus, TruckStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::instrument;

// ==========================================
// FleetRepository - 车队仓储
// ==========================================
pub struct FleetRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FleetRepository {
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
    // 车辆
    // ==========================================

    /// 按名称登记车辆（已存在则忽略）, 返回新增数量
    pub fn ensure_trucks(&self, names: &[&str]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let mut count = 0;
        for name in names {
            count += conn.execute(
                "INSERT INTO trucks (name, status) VALUES (?1, ?2) ON CONFLICT(name) DO NOTHING",
                params![name, TruckStatus::Idle.as_str()],
            )?;
        }
        Ok(count)
    }

    /// 全部车辆
    pub fn list_trucks(&self) -> RepositoryResult<Vec<Truck>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT truck_id, name, status, capacity, current_load, lat, lon
            FROM trucks
            ORDER BY truck_id
            "#,
        )?;
        let rows = stmt.query_map([], map_truck_row)?;
        let mut trucks = Vec::new();
        for row in rows {
            trucks.push(row??);
        }
        Ok(trucks)
    }

    /// 第一辆空闲车辆（按 truck_id 升序）
    pub fn find_idle_truck(&self) -> RepositoryResult<Option<Truck>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                r#"
                SELECT truck_id, name, status, capacity, current_load, lat, lon
                FROM trucks
                WHERE status = ?1
                ORDER BY truck_id
                LIMIT 1
                "#,
                params![TruckStatus::Idle.as_str()],
                map_truck_row,
            )
            .optional()?;
        row.transpose()
    }

    /// 更新车辆状态
    pub fn update_truck_status(&self, truck_id: i64, status: TruckStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE trucks SET status = ?1 WHERE truck_id = ?2",
            params![status.as_str(), truck_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Truck".to_string(),
                id: truck_id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // 派车 / 完成
    // ==========================================

    /// 记录一次派车（单事务）
    ///
    /// - 车辆 -> ON_ROUTE
    /// - 路线内垃圾桶 -> IN_SERVICE
    /// - 写入路线与收运流水
    #[instrument(skip(self, route), fields(route_id = %route.route_id, bins = route.bin_sequence.len()))]
    pub fn record_assignment(
        &self,
        truck_id: i64,
        route: &CollectionRoute,
        waste_weight: f64,
    ) -> RepositoryResult<CollectionTransaction> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let affected = tx.execute(
            "UPDATE trucks SET status = ?1 WHERE truck_id = ?2 AND status = ?3",
            params![
                TruckStatus::OnRoute.as_str(),
                truck_id,
                TruckStatus::Idle.as_str()
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::FieldValueError {
                field: "truck_id".to_string(),
                message: format!("车辆 {} 不存在或非空闲", truck_id),
            });
        }

        for bin_id in &route.bin_sequence {
            tx.execute(
                "UPDATE bins SET service_status = ?1 WHERE bin_id = ?2",
                params![BinServiceStatus::InService.as_str(), bin_id],
            )?;
        }

        let sequence_json = serde_json::to_string(&route.bin_sequence)?;
        tx.execute(
            r#"
            INSERT INTO truck_routes
                (route_id, truck_id, status, bin_sequence, distance_km, assigned_at, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                route.route_id,
                truck_id,
                route.status.as_str(),
                sequence_json,
                route.distance_km,
                route.assigned_at,
                route.completed_at,
            ],
        )?;

        let transaction = CollectionTransaction {
            truck_id,
            route_id: route.route_id.clone(),
            bins_collected: route.bin_sequence.len(),
            waste_weight,
            created_at: route.assigned_at,
        };
        tx.execute(
            r#"
            INSERT INTO collection_transactions
                (truck_id, route_id, bins_collected, waste_weight, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                transaction.truck_id,
                transaction.route_id,
                transaction.bins_collected as i64,
                transaction.waste_weight,
                transaction.created_at,
            ],
        )?;

        tx.commit()?;
        Ok(transaction)
    }

    /// 完成车辆当前未完成的路线（单事务）
    ///
    /// 车辆回到 IDLE, 路线内垃圾桶回到 ACTIVE 并记录 last_serviced
    ///
    /// # 返回
    /// 完成的路线数量
    #[instrument(skip(self))]
    pub fn complete_routes(&self, truck_id: i64, completed_at: DateTime<Utc>) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let open_routes: Vec<(String, String)> = {
            let mut stmt = tx.prepare(
                "SELECT route_id, bin_sequence FROM truck_routes WHERE truck_id = ?1 AND completed_at IS NULL",
            )?;
            let rows = stmt.query_map(params![truck_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        for (route_id, sequence_json) in &open_routes {
            let bin_ids: Vec<String> = serde_json::from_str(sequence_json)?;
            for bin_id in &bin_ids {
                tx.execute(
                    "UPDATE bins SET service_status = ?1, last_serviced = ?2 WHERE bin_id = ?3",
                    params![BinServiceStatus::Active.as_str(), completed_at, bin_id],
                )?;
            }
            tx.execute(
                "UPDATE truck_routes SET status = ?1, completed_at = ?2 WHERE route_id = ?3",
                params![RouteStatus::Completed.as_str(), completed_at, route_id],
            )?;
        }

        let affected = tx.execute(
            "UPDATE trucks SET status = ?1 WHERE truck_id = ?2",
            params![TruckStatus::Idle.as_str(), truck_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Truck".to_string(),
                id: truck_id.to_string(),
            });
        }

        tx.commit()?;
        Ok(open_routes.len())
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 最近的路线（按派车时间倒序）
    pub fn list_routes(&self, limit: usize) -> RepositoryResult<Vec<CollectionRoute>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT route_id, truck_id, status, bin_sequence, distance_km, assigned_at, completed_at
            FROM truck_routes
            ORDER BY assigned_at DESC, route_id
            LIMIT ?1
            "#,
        )?;
        let rows = stmt.query_map(params![limit as i64], map_route_row)?;
        let mut routes = Vec::new();
        for row in rows {
            routes.push(row??);
        }
        Ok(routes)
    }

    /// 车辆的收运流水
    pub fn list_transactions(&self, truck_id: i64) -> RepositoryResult<Vec<CollectionTransaction>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT truck_id, route_id, bins_collected, waste_weight, created_at
            FROM collection_transactions
            WHERE truck_id = ?1
            ORDER BY transaction_id
            "#,
        )?;
        let rows = stmt.query_map(params![truck_id], |row| {
            Ok(CollectionTransaction {
                truck_id: row.get(0)?,
                route_id: row.get(1)?,
                bins_collected: row.get::<_, i64>(2)? as usize,
                waste_weight: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

fn field_error(field: &str, message: String) -> RepositoryError {
    RepositoryError::FieldValueError {
        field: field.to_string(),
        message,
    }
}

fn map_truck_row(row: &Row<'_>) -> rusqlite::Result<RepositoryResult<Truck>> {
    let status: String = row.get(2)?;
    let lat: Option<f64> = row.get(5)?;
    let lon: Option<f64> = row.get(6)?;

    let Some(status) = TruckStatus::parse(&status) else {
        return Ok(Err(field_error("status", format!("未知车辆状态: {}", status))));
    };

    Ok(Ok(Truck {
        truck_id: row.get(0)?,
        name: row.get(1)?,
        status,
        capacity: row.get(3)?,
        current_load: row.get(4)?,
        location: lat.zip(lon).map(|(lat, lon)| GeoPoint { lat, lon }),
    }))
}

fn map_route_row(row: &Row<'_>) -> rusqlite::Result<RepositoryResult<CollectionRoute>> {
    let status: String = row.get(2)?;
    let sequence_json: String = row.get(3)?;

    let Some(status) = RouteStatus::parse(&status) else {
        return Ok(Err(field_error("status", format!("未知路线状态: {}", status))));
    };
    let bin_sequence: Vec<String> = match serde_json::from_str(&sequence_json) {
        Ok(v) => v,
        Err(e) => return Ok(Err(e.into())),
    };

    Ok(Ok(CollectionRoute {
        route_id: row.get(0)?,
        truck_id: row.get(1)?,
        status,
        bin_sequence,
        distance_km: row.get(4)?,
        assigned_at: row.get(5)?,
        completed_at: row.get(6)?,
    }))
}
