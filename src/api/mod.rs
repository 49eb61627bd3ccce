// ==========================================
// 城市垃圾收运调度 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行调用
// ==========================================

pub mod collection_api;
pub mod dashboard_api;
pub mod data_source;
pub mod error;

// 重导出核心类型
pub use collection_api::{CollectionApi, DispatchOutcome};
pub use dashboard_api::{DashboardApi, DashboardOverview, DEFAULT_ALERT_LIMIT};
pub use data_source::{
    DashboardLoader, DashboardSnapshot, DataSource, RepositoryDataSource, SnapshotDataSource,
};
pub use error::{ApiError, ApiResult};
