// ==========================================
// 城市垃圾收运调度 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 缺失键回落默认值; 格式错误直接报错
// ==========================================

use crate::config::engine_config::EngineConfig;
use crate::db::open_sqlite_connection;
use crate::domain::location::DepotPoint;
use crate::engine::summary::LandfillThresholds;
use crate::engine::urgency::UrgencyThresholds;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        tracing::info!(key, value, "配置已更新");
        Ok(())
    }

    /// 读取并解析配置值, 缺失时使用默认值
    fn get_parsed_or<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<T>().map_err(|e| {
                format!("配置值格式错误 (key: {}, value: {}): {}", key, raw, e).into()
            }),
        }
    }

    // ===== 引擎参数 =====

    /// 组装引擎参数并校验
    pub fn get_engine_config(&self) -> Result<EngineConfig, Box<dyn Error>> {
        let defaults = EngineConfig::default();

        let depot = DepotPoint::new(
            self.get_parsed_or(config_keys::DEPOT_LAT, defaults.depot.location.lat)?,
            self.get_parsed_or(config_keys::DEPOT_LON, defaults.depot.location.lon)?,
        );

        let urgency = UrgencyThresholds {
            half: self.get_parsed_or(config_keys::URGENCY_HALF_PCT, defaults.urgency.half)?,
            full: self.get_parsed_or(config_keys::URGENCY_FULL_PCT, defaults.urgency.full)?,
            overflow: self
                .get_parsed_or(config_keys::URGENCY_OVERFLOW_PCT, defaults.urgency.overflow)?,
        };

        let landfill = LandfillThresholds {
            near_full_pct: self
                .get_parsed_or(config_keys::LANDFILL_NEAR_FULL_PCT, defaults.landfill.near_full_pct)?,
            full_pct: self.get_parsed_or(config_keys::LANDFILL_FULL_PCT, defaults.landfill.full_pct)?,
        };

        let config = EngineConfig {
            depot,
            urgency,
            collection_threshold_pct: self.get_parsed_or(
                config_keys::COLLECTION_THRESHOLD_PCT,
                defaults.collection_threshold_pct,
            )?,
            landfill,
        };

        config.validate()?;
        Ok(config)
    }

    // ===== 快照 =====

    /// 获取所有 global 配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> Result<usize, Box<dyn Error>> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
        }

        tx.commit()?;
        tracing::info!(count, "配置快照已恢复");
        Ok(count)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const DEPOT_LAT: &str = "depot_lat";
    pub const DEPOT_LON: &str = "depot_lon";
    pub const URGENCY_HALF_PCT: &str = "urgency_half_pct";
    pub const URGENCY_FULL_PCT: &str = "urgency_full_pct";
    pub const URGENCY_OVERFLOW_PCT: &str = "urgency_overflow_pct";
    pub const COLLECTION_THRESHOLD_PCT: &str = "collection_threshold_pct";
    pub const LANDFILL_NEAR_FULL_PCT: &str = "landfill_near_full_pct";
    pub const LANDFILL_FULL_PCT: &str = "landfill_full_pct";
}
