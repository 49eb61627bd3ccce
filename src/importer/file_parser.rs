// ==========================================
// 城市垃圾收运调度 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv) / JSON (.json)
// 输出: 原始行 (列名 -> 去空白后的字符串)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::json_adapter;
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 原始行
pub type RawRow = HashMap<String, String>;

// ==========================================
// FileParser Trait
// ==========================================
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行（跳过完全空白的行）
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRow>>;
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        ensure_exists(file_path)?;

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row_map = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), value.trim().to_string());
                }
            }

            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }
            records.push(row_map);
        }

        Ok(records)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        ensure_exists(file_path)?;

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut records = Vec::new();
        for data_row in rows {
            let mut row_map = HashMap::new();
            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), cell.to_string().trim().to_string());
                }
            }

            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }
            records.push(row_map);
        }

        Ok(records)
    }
}

// ==========================================
// JSON Parser 实现（接口导出的 JSON 文件）
// ==========================================
pub struct JsonParser;

impl FileParser for JsonParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        ensure_exists(file_path)?;
        let file = File::open(file_path)?;
        let value: serde_json::Value = serde_json::from_reader(file)?;
        json_adapter::rows_from_json(&value)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        match extension_of(file_path).as_str() {
            "csv" => CsvParser.parse_to_raw_records(file_path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_records(file_path),
            "json" => JsonParser.parse_to_raw_records(file_path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn temp_with(suffix: &str, lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let file = temp_with(
            ".csv",
            &[
                "serial,latlong,status_current_fill_level",
                "S-001,\"-37.81, 144.96\",85",
                "S-002,\"-37.82, 144.97\",20",
            ],
        );

        let records = CsvParser.parse_to_raw_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("serial"), Some(&"S-001".to_string()));
        assert_eq!(records[0].get("latlong"), Some(&"-37.81, 144.96".to_string()));
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_to_raw_records(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let file = temp_with(".csv", &["serial,fill_level", "S-001,50", ",", "S-002,60"]);
        let records = CsvParser.parse_to_raw_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_universal_parser_dispatches_json() {
        let file = temp_with(".json", &[r#"[{"bin_id": "B1", "fill_level": 40}]"#]);
        let records = UniversalFileParser.parse_to_raw_records(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("fill_level"), Some(&"40".to_string()));
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let file = temp_with(".txt", &["hello"]);
        let result = UniversalFileParser.parse_to_raw_records(file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
