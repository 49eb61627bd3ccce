// ==========================================
// 城市垃圾收运调度 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 收运决策支持 (紧急度排序 / 看板统计 / 派车)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 引擎参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 共享状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AlertSeverity, BinServiceStatus, LandfillStatus, RouteStatus, TruckStatus, UrgencyTier,
};

// 领域实体
pub use domain::{
    Bin, BinReading, CollectionRoute, DashboardSummary, DepotPoint, GeoPoint, Landfill,
    MonitoringAlert, PrioritizedBin, Ratio, SummaryStatistics, Truck,
};

// 引擎
pub use engine::{
    distance_km, geographic_center, prioritize, BinPrioritizer, EngineError, EngineResult,
    PrioritizationResult, RoutePlanner, SummaryEngine, UrgencyClassifier, UrgencyThresholds,
};

// API
pub use api::{CollectionApi, DashboardApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "城市垃圾收运调度";
