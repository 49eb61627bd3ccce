// ==========================================
// 城市垃圾收运调度 - 配置层
// ==========================================
// 职责: 引擎参数管理 (车场/阈值)
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod engine_config;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use engine_config::EngineConfig;
