// ==========================================
// 城市垃圾收运调度 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 建表幂等 (CREATE TABLE IF NOT EXISTS)
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化 schema（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS bins (
            bin_id TEXT PRIMARY KEY,
            address TEXT,
            lat REAL,
            lon REAL,
            capacity REAL NOT NULL DEFAULT 100.0,
            service_status TEXT NOT NULL DEFAULT 'ACTIVE',
            last_serviced TEXT
        );

        CREATE TABLE IF NOT EXISTS bin_readings (
            reading_id INTEGER PRIMARY KEY AUTOINCREMENT,
            bin_id TEXT NOT NULL REFERENCES bins(bin_id) ON DELETE CASCADE,
            fill_level INTEGER NOT NULL,
            status_label TEXT,
            read_at TEXT NOT NULL,
            batch_id TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_bin_readings_bin_time
            ON bin_readings(bin_id, read_at DESC);

        CREATE TABLE IF NOT EXISTS trucks (
            truck_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            status TEXT NOT NULL DEFAULT 'IDLE',
            capacity REAL,
            current_load REAL,
            lat REAL,
            lon REAL
        );
        CREATE INDEX IF NOT EXISTS idx_trucks_status ON trucks(status);

        CREATE TABLE IF NOT EXISTS truck_routes (
            route_id TEXT PRIMARY KEY,
            truck_id INTEGER REFERENCES trucks(truck_id) ON DELETE SET NULL,
            status TEXT NOT NULL,
            bin_sequence TEXT NOT NULL,
            distance_km REAL,
            assigned_at TEXT NOT NULL,
            completed_at TEXT
        );

        CREATE TABLE IF NOT EXISTS collection_transactions (
            transaction_id INTEGER PRIMARY KEY AUTOINCREMENT,
            truck_id INTEGER NOT NULL REFERENCES trucks(truck_id) ON DELETE CASCADE,
            route_id TEXT NOT NULL REFERENCES truck_routes(route_id) ON DELETE CASCADE,
            bins_collected INTEGER NOT NULL,
            waste_weight REAL NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS landfills (
            landfill_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            capacity_tons REAL NOT NULL DEFAULT 0,
            used_tons REAL NOT NULL DEFAULT 0,
            closed INTEGER NOT NULL DEFAULT 0,
            lat REAL,
            lon REAL
        );

        CREATE TABLE IF NOT EXISTS monitoring_alerts (
            alert_id INTEGER PRIMARY KEY AUTOINCREMENT,
            alert_type TEXT NOT NULL,
            severity TEXT NOT NULL,
            message TEXT NOT NULL,
            bin_id TEXT,
            truck_id INTEGER,
            created_at TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
