// ==========================================
// 城市垃圾收运调度 - 导入层
// ==========================================
// 职责: 外部传感器/业务数据导入,生成内部数据
// 支持: CSV, Excel, JSON
// ==========================================

pub mod bin_importer;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod json_adapter;
pub mod validator;

// 重导出核心类型
pub use bin_importer::{prepare_rows, BinImporter, ImportReport, PreparedBatch};
pub use error::{ImportError, ImportResult};
pub use field_mapper::{FieldMapper, RawBinRecord};
pub use file_parser::{CsvParser, ExcelParser, FileParser, JsonParser, RawRow, UniversalFileParser};
pub use validator::{validate_record, RowViolation, ValidatedRecord};
