// ==========================================
// 城市垃圾收运调度 - 字段映射器实现
// ==========================================
// 职责: 源字段 → 标准字段映射 + 类型转换
// 兼容三种上游导出格式 (传感器 CSV / 业务库 / REST 载荷)
// 只做类型转换, 业务校验交给 validator
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// 标准字段别名表
// ==========================================
const BIN_ID: &[&str] = &["serial", "bin_id", "id", "bin_number"];
const LATLONG: &[&str] = &["latlong"];
const LAT: &[&str] = &["lat", "latitude"];
const LON: &[&str] = &["lon", "lng", "longitude"];
const FILL_LEVEL: &[&str] = &["status_current_fill_level", "fill_level", "fillLevel"];
const STATUS: &[&str] = &["bin_status", "status"];
const ADDRESS: &[&str] = &["address", "location_name"];
const TIME: &[&str] = &["time", "timestamp", "last_collection"];
const CAPACITY: &[&str] = &["capacity"];

/// 映射后的原始记录（尚未校验）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawBinRecord {
    pub row_number: usize, // 1-based 数据行号
    pub bin_id: Option<String>,
    pub address: Option<String>,
    pub latlong: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub fill_level: Option<i32>,
    pub status_label: Option<String>,
    pub read_at: Option<DateTime<Utc>>,
    pub capacity: Option<f64>,
}

pub struct FieldMapper;

impl FieldMapper {
    /// 原始行 → RawBinRecord
    pub fn map_row(&self, row: &RawRow, row_number: usize) -> ImportResult<RawBinRecord> {
        Ok(RawBinRecord {
            row_number,
            bin_id: self.get_string(row, BIN_ID),
            address: self.get_string(row, ADDRESS),
            latlong: self.get_string(row, LATLONG),
            lat: self.parse_f64(row, LAT, row_number)?,
            lon: self.parse_f64(row, LON, row_number)?,
            fill_level: self.parse_fill_level(row, row_number)?,
            status_label: self.get_string(row, STATUS),
            read_at: self.parse_datetime(row, TIME, row_number)?,
            capacity: self.parse_f64(row, CAPACITY, row_number)?,
        })
    }

    /// 按别名顺序取第一个非空值
    fn get_string(&self, row: &RawRow, aliases: &[&str]) -> Option<String> {
        aliases
            .iter()
            .filter_map(|alias| row.get(*alias))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn parse_f64(&self, row: &RawRow, aliases: &[&str], row_number: usize) -> ImportResult<Option<f64>> {
        match self.get_string(row, aliases) {
            None => Ok(None),
            Some(value) => value
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ImportError::TypeConversionError {
                    row: row_number,
                    field: aliases[0].to_string(),
                    message: format!("无法解析为浮点数: {}", value),
                }),
        }
    }

    /// 满溢率: 接受 "85" / "85.0" / "85%", 小数四舍五入
    fn parse_fill_level(&self, row: &RawRow, row_number: usize) -> ImportResult<Option<i32>> {
        let Some(value) = self.get_string(row, FILL_LEVEL) else {
            return Ok(None);
        };
        let numeric = value.trim_end_matches('%').trim();

        if let Ok(v) = numeric.parse::<i32>() {
            return Ok(Some(v));
        }
        match numeric.parse::<f64>() {
            Ok(v) if v.is_finite() && v.abs() < i32::MAX as f64 => Ok(Some(v.round() as i32)),
            _ => Err(ImportError::TypeConversionError {
                row: row_number,
                field: FILL_LEVEL[0].to_string(),
                message: format!("无法解析为满溢率: {}", value),
            }),
        }
    }

    /// 时间: RFC3339 / "YYYY-MM-DD HH:MM:SS" / "YYYY-MM-DDTHH:MM:SS" / "YYYY-MM-DD"
    /// 无时区信息的按 UTC 处理
    fn parse_datetime(
        &self,
        row: &RawRow,
        aliases: &[&str],
        row_number: usize,
    ) -> ImportResult<Option<DateTime<Utc>>> {
        let Some(value) = self.get_string(row, aliases) else {
            return Ok(None);
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&value) {
            return Ok(Some(dt.with_timezone(&Utc)));
        }
        for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(&value, fmt) {
                return Ok(Some(naive.and_utc()));
            }
        }
        if let Some(naive) = NaiveDate::parse_from_str(&value, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Ok(Some(naive.and_utc()));
        }

        Err(ImportError::DateFormatError {
            row: row_number,
            field: aliases[0].to_string(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_sensor_export_shape() {
        let r = row(&[
            ("serial", "S-001"),
            ("latlong", "-37.81, 144.96"),
            ("status_current_fill_level", "85"),
            ("bin_status", "Full"),
            ("time", "2024-03-01T08:30:00+00:00"),
        ]);
        let rec = FieldMapper.map_row(&r, 1).unwrap();
        assert_eq!(rec.bin_id.as_deref(), Some("S-001"));
        assert_eq!(rec.latlong.as_deref(), Some("-37.81, 144.96"));
        assert_eq!(rec.fill_level, Some(85));
        assert_eq!(rec.status_label.as_deref(), Some("Full"));
        assert_eq!(
            rec.read_at,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_business_db_shape() {
        let r = row(&[
            ("bin_number", "BIN-7"),
            ("latitude", "-37.8"),
            ("longitude", "144.9"),
            ("fill_level", "72.6%"),
            ("location_name", "Flinders St"),
            ("last_collection", "2024-03-01 06:00:00"),
        ]);
        let rec = FieldMapper.map_row(&r, 2).unwrap();
        assert_eq!(rec.bin_id.as_deref(), Some("BIN-7"));
        assert_eq!(rec.lat, Some(-37.8));
        assert_eq!(rec.lon, Some(144.9));
        assert_eq!(rec.fill_level, Some(73));
        assert_eq!(rec.address.as_deref(), Some("Flinders St"));
        assert!(rec.read_at.is_some());
    }

    #[test]
    fn test_blank_values_are_missing() {
        let r = row(&[("id", "  "), ("fill_level", "")]);
        let rec = FieldMapper.map_row(&r, 3).unwrap();
        assert_eq!(rec.bin_id, None);
        assert_eq!(rec.fill_level, None);
    }

    #[test]
    fn test_type_errors() {
        let r = row(&[("id", "B1"), ("fill_level", "lots")]);
        assert!(matches!(
            FieldMapper.map_row(&r, 4),
            Err(ImportError::TypeConversionError { row: 4, .. })
        ));

        let r = row(&[("id", "B1"), ("time", "yesterday")]);
        assert!(matches!(
            FieldMapper.map_row(&r, 5),
            Err(ImportError::DateFormatError { row: 5, .. })
        ));
    }
}
