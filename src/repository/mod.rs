// ==========================================
// 城市垃圾收运调度 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化
// ==========================================

pub mod alert_repo;
pub mod bin_repo;
pub mod error;
pub mod fleet_repo;
pub mod landfill_repo;

// 重导出核心仓储
pub use alert_repo::AlertRepository;
pub use bin_repo::BinRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use fleet_repo::FleetRepository;
pub use landfill_repo::LandfillRepository;
