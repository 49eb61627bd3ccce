// ==========================================
// 城市垃圾收运调度 - 引擎层
// ==========================================
// 职责: 纯计算规则引擎 (距离/等级/排序/统计/路线)
// 红线: Engine 不拼 SQL, 不做 I/O, 不修改输入
// ==========================================

pub mod collection;
pub mod error;
pub mod geo;
pub mod priority;
pub mod route;
pub mod summary;
pub mod urgency;

// 重导出核心引擎
pub use error::{EngineError, EngineResult};
pub use geo::{distance_km, geographic_center};
pub use priority::{prioritize, BinPrioritizer, PrioritizationResult};
pub use route::{RoutePlan, RoutePlanner, RouteStop};
pub use summary::{summarize, LandfillThresholds, SummaryEngine};
pub use urgency::{UrgencyClassifier, UrgencyThresholds};
