// ==========================================
// 城市垃圾收运调度 - 导入记录校验
// ==========================================
// 规则:
// - bin_id / fill_level 缺失 → MissingField, 整行拒绝
// - 坐标缺失 → 保留 (location = None)
// - 坐标存在但非法 → InvalidCoordinate, 整行拒绝
// - 满溢率超出 [0, 100] → InvalidFillLevel, 整行拒绝
// latlong 组合列优先于独立的 lat/lon 列
// ==========================================

use crate::domain::bin::{Bin, BinReading};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::geo::{parse_latlong, point_from_pair};
use crate::engine::urgency::validate_fill_level;
use crate::importer::field_mapper::RawBinRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 默认容量（源数据未提供时）
pub const DEFAULT_BIN_CAPACITY: f64 = 100.0;

/// 被拒绝的行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowViolation {
    pub row_number: usize,
    pub bin_id: Option<String>,
    pub message: String,
}

impl RowViolation {
    pub fn new(row_number: usize, bin_id: Option<String>, message: impl Into<String>) -> Self {
        Self {
            row_number,
            bin_id,
            message: message.into(),
        }
    }
}

/// 校验通过的记录
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    pub bin: Bin,
    pub reading: BinReading,
    /// 源数据中的容量; None 时 bin.capacity 为默认值
    pub source_capacity: Option<f64>,
}

/// 校验单条记录
///
/// # 参数
/// - fallback_time: 源数据无时间列时使用的读数时间
pub fn validate_record(
    record: &RawBinRecord,
    fallback_time: DateTime<Utc>,
) -> EngineResult<ValidatedRecord> {
    let label = format!("row {}", record.row_number);

    let bin_id = record
        .bin_id
        .clone()
        .ok_or_else(|| EngineError::missing(&label, "bin_id"))?;
    let fill_level = record
        .fill_level
        .ok_or_else(|| EngineError::missing(&bin_id, "fill_level"))?;
    let fill_level = validate_fill_level(fill_level)?;

    let location = match record.latlong.as_deref() {
        Some(raw) => Some(parse_latlong(raw)?),
        None => point_from_pair(record.lat, record.lon)?,
    };

    let mut bin = Bin::new(bin_id.clone(), fill_level, location);
    bin.address = record.address.clone();
    bin.capacity = record.capacity.unwrap_or(DEFAULT_BIN_CAPACITY);
    bin.status_label = record.status_label.clone();

    Ok(ValidatedRecord {
        bin,
        source_capacity: record.capacity,
        reading: BinReading {
            bin_id,
            fill_level,
            status_label: record.status_label.clone(),
            read_at: record.read_at.unwrap_or(fallback_time),
        },
    })
}
