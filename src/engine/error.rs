// ==========================================
// 城市垃圾收运调度 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约束: 引擎不捕获自身错误,直接返回调用方
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    // ===== 坐标错误 =====
    #[error("坐标无效: lat={lat:?}, lon={lon:?} ({reason})")]
    InvalidCoordinate {
        lat: Option<f64>,
        lon: Option<f64>,
        reason: String,
    },

    // ===== 满溢率错误 =====
    #[error("满溢率无效: {value} 超出范围 [0, 100]")]
    InvalidFillLevel { value: i32 },

    // ===== 数据完整性错误 =====
    #[error("字段缺失 (record={record}): {field}")]
    MissingField { record: String, field: String },

    // ===== 除零保护 =====
    #[error("除零: {context}")]
    DivisionByZero { context: String },

    // ===== 配置错误 =====
    #[error("阈值配置无效: {0}")]
    InvalidThresholds(String),
}

impl EngineError {
    pub(crate) fn coordinate(lat: Option<f64>, lon: Option<f64>, reason: &str) -> Self {
        EngineError::InvalidCoordinate {
            lat,
            lon,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn missing(record: &str, field: &str) -> Self {
        EngineError::MissingField {
            record: record.to_string(),
            field: field.to_string(),
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
