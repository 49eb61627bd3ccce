// ==========================================
// 城市垃圾收运调度 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 约束: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod alert;
pub mod bin;
pub mod fleet;
pub mod landfill;
pub mod location;
pub mod summary;
pub mod types;

// 重导出核心类型
pub use alert::{AlertType, MonitoringAlert};
pub use bin::{Bin, BinReading, PrioritizedBin};
pub use fleet::{CollectionRoute, CollectionTransaction, Truck};
pub use landfill::Landfill;
pub use location::{DepotPoint, GeoPoint};
pub use summary::{
    BinReport, CategoryCount, DashboardSummary, LandfillReport, Ratio, RouteReport,
    SummaryStatistics, TruckReport,
};
pub use types::{
    AlertSeverity, BinServiceStatus, LandfillStatus, RouteStatus, TruckStatus, UrgencyTier,
};
