// ==========================================
// 城市垃圾收运调度 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享连接、仓储和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{CollectionApi, DashboardApi, RepositoryDataSource};
use crate::config::{ConfigManager, EngineConfig};
use crate::db::{init_schema, open_sqlite_connection};
use crate::importer::BinImporter;
use crate::repository::{AlertRepository, BinRepository, FleetRepository, LandfillRepository};

/// 初始化数据库时登记的车辆
pub const DEFAULT_TRUCKS: [&str; 3] = ["Truck-01", "Truck-02", "Truck-03"];

/// 初始化数据库时登记的填埋场 (名称, 容量吨, 已用吨)
pub const DEFAULT_LANDFILLS: [(&str, f64, f64); 2] = [
    ("Central Landfill", 10_000.0, 4_000.0),
    ("East Waste Facility", 8_000.0, 2_500.0),
];

/// 应用状态
///
/// 所有仓储共享同一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 生效的引擎参数（启动时从 config_kv 读取并校验）
    pub engine_config: EngineConfig,

    pub config_manager: Arc<ConfigManager>,
    pub bin_repo: Arc<BinRepository>,
    pub fleet_repo: Arc<FleetRepository>,
    pub landfill_repo: Arc<LandfillRepository>,
    pub alert_repo: Arc<AlertRepository>,

    /// 看板API
    pub dashboard_api: Arc<DashboardApi>,

    /// 收运派车API
    pub collection_api: Arc<CollectionApi>,

    /// 读数导入器
    pub importer: Arc<BinImporter>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表（幂等）
    /// 2. 登记默认车辆与填埋场
    /// 3. 读取引擎参数
    /// 4. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let bin_repo = Arc::new(BinRepository::from_connection(conn.clone()));
        let fleet_repo = Arc::new(FleetRepository::from_connection(conn.clone()));
        let landfill_repo = Arc::new(LandfillRepository::from_connection(conn.clone()));
        let alert_repo = Arc::new(AlertRepository::from_connection(conn.clone()));

        let added = fleet_repo
            .ensure_trucks(&DEFAULT_TRUCKS)
            .map_err(|e| format!("默认车辆登记失败: {}", e))?;
        if added > 0 {
            tracing::info!(added, "已登记默认车辆");
        }

        let added = landfill_repo
            .ensure_landfills(&DEFAULT_LANDFILLS)
            .map_err(|e| format!("默认填埋场登记失败: {}", e))?;
        if added > 0 {
            tracing::info!(added, "已登记默认填埋场");
        }

        // ==========================================
        // 配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let engine_config = config_manager
            .get_engine_config()
            .map_err(|e| format!("引擎参数无效: {}", e))?;

        // ==========================================
        // 初始化API层
        // ==========================================
        let source = Arc::new(RepositoryDataSource::new(
            bin_repo.clone(),
            fleet_repo.clone(),
            landfill_repo.clone(),
        ));
        let dashboard_api =
            Arc::new(DashboardApi::new(source, engine_config).with_alerts(alert_repo.clone()));
        let collection_api = Arc::new(CollectionApi::new(
            bin_repo.clone(),
            fleet_repo.clone(),
            engine_config,
        ));
        let importer = Arc::new(BinImporter::new(bin_repo.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            engine_config,
            config_manager,
            bin_repo,
            fleet_repo,
            landfill_repo,
            alert_repo,
            dashboard_api,
            collection_api,
            importer,
        })
    }

    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

/// 默认数据库路径
///
/// 优先级: SMART_WASTE_DB_PATH 环境变量 > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("SMART_WASTE_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./smart_waste.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("smart-waste");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("smart_waste.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_app_state_seeds_trucks_and_landfills() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("state.db").to_string_lossy().to_string();

        let state = AppState::new(db_path.clone()).unwrap();
        assert_eq!(state.fleet_repo.list_trucks().unwrap().len(), DEFAULT_TRUCKS.len());
        assert_eq!(state.landfill_repo.list().unwrap().len(), DEFAULT_LANDFILLS.len());
        assert_eq!(state.engine_config, EngineConfig::default());

        // 再次打开不重复登记
        drop(state);
        let state = AppState::new(db_path).unwrap();
        assert_eq!(state.fleet_repo.list_trucks().unwrap().len(), DEFAULT_TRUCKS.len());
        assert_eq!(state.landfill_repo.list().unwrap().len(), DEFAULT_LANDFILLS.len());
    }
}
