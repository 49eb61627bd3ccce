// ==========================================
// 城市垃圾收运调度 - 垃圾桶读数导入器
// ==========================================
// 流程: 解析 → 映射 → 校验 → 去重 → 落库
// 行级问题只记录不中断; 文件级 / 数据库错误直接返回
// ==========================================

use crate::domain::bin::{Bin, BinReading};
use crate::engine::collection::apply_latest_readings;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{FileParser, RawRow, UniversalFileParser};
use crate::importer::json_adapter;
use crate::importer::validator::{validate_record, RowViolation};
use crate::repository::BinRepository;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// PreparedBatch - 校验去重后的批次（未落库）
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedBatch {
    pub total_rows: usize,
    pub bins: Vec<Bin>,             // 按 bin_id 去重, 满溢率取最新读数
    pub readings: Vec<BinReading>,  // 全部合法读数
    pub rejected: Vec<RowViolation>,
}

/// 原始行 → 校验去重后的批次（纯函数, 不访问数据库）
pub fn prepare_rows(rows: &[RawRow], fallback_time: DateTime<Utc>) -> PreparedBatch {
    let mapper = FieldMapper;
    let mut bins: BTreeMap<String, Bin> = BTreeMap::new();
    let mut readings = Vec::new();
    let mut rejected = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let row_number = idx + 1;

        let record = match mapper.map_row(row, row_number) {
            Ok(r) => r,
            Err(e) => {
                warn!(row_number, error = %e, "字段映射失败");
                rejected.push(RowViolation::new(row_number, None, e.to_string()));
                continue;
            }
        };

        let validated = match validate_record(&record, fallback_time) {
            Ok(v) => v,
            Err(e) => {
                warn!(row_number, error = %e, "记录校验失败");
                rejected.push(RowViolation::new(row_number, record.bin_id.clone(), e.to_string()));
                continue;
            }
        };

        // 主数据: 后出现的非空值覆盖
        let incoming = validated.bin;
        let source_capacity = validated.source_capacity;
        bins.entry(incoming.bin_id.clone())
            .and_modify(|b| {
                if incoming.location.is_some() {
                    b.location = incoming.location;
                }
                if incoming.address.is_some() {
                    b.address = incoming.address.clone();
                }
                // 缺容量的行不覆盖已有值
                if let Some(capacity) = source_capacity {
                    b.capacity = capacity;
                }
            })
            .or_insert_with(|| incoming.clone());
        readings.push(validated.reading);
    }

    let bins: Vec<Bin> = bins.into_values().collect();
    PreparedBatch {
        total_rows: rows.len(),
        bins: apply_latest_readings(&bins, &readings),
        readings,
        rejected,
    }
}

// ==========================================
// ImportReport - 导入结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch_id: String,
    pub source: String,
    pub total_rows: usize,
    pub imported_readings: usize,
    pub distinct_bins: usize,
    pub rejected: Vec<RowViolation>,
    pub imported_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl ImportReport {
    /// 面向用户的摘要
    pub fn message(&self) -> String {
        crate::i18n::import_completed(&self.batch_id, self.imported_readings, self.rejected.len())
    }
}

// ==========================================
// BinImporter - 导入器
// ==========================================
pub struct BinImporter {
    bin_repo: Arc<BinRepository>,
    file_parser: Box<dyn FileParser>,
}

impl BinImporter {
    pub fn new(bin_repo: Arc<BinRepository>) -> Self {
        Self::with_parser(bin_repo, Box::new(UniversalFileParser))
    }

    pub fn with_parser(bin_repo: Arc<BinRepository>, file_parser: Box<dyn FileParser>) -> Self {
        Self {
            bin_repo,
            file_parser,
        }
    }

    /// 从文件导入（按扩展名选择解析器）
    #[instrument(skip(self, file_path), fields(path = %file_path.as_ref().display()))]
    pub fn import_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ImportReport> {
        let path = file_path.as_ref();
        debug!("步骤 1: 解析文件");
        let rows = self.file_parser.parse_to_raw_records(path)?;
        info!(total_rows = rows.len(), "文件解析完成");
        self.import_rows(&rows, &path.display().to_string())
    }

    /// 从 JSON 载荷导入
    pub fn import_json(&self, payload: &serde_json::Value, source: &str) -> ImportResult<ImportReport> {
        let rows = json_adapter::rows_from_json(payload)?;
        self.import_rows(&rows, source)
    }

    /// 导入已解析的原始行
    #[instrument(skip(self, rows), fields(count = rows.len()))]
    pub fn import_rows(&self, rows: &[RawRow], source: &str) -> ImportResult<ImportReport> {
        let start_time = Instant::now();
        let imported_at = Utc::now();
        let batch_id = Uuid::new_v4().to_string();

        debug!("步骤 2: 映射与校验");
        let batch = prepare_rows(rows, imported_at);
        info!(
            valid = batch.readings.len(),
            rejected = batch.rejected.len(),
            "映射与校验完成"
        );

        debug!("步骤 3: 落库");
        self.bin_repo.upsert_bins(&batch.bins)?;
        let imported_readings = self.bin_repo.insert_readings(&batch.readings, &batch_id)?;

        let report = ImportReport {
            batch_id,
            source: source.to_string(),
            total_rows: batch.total_rows,
            imported_readings,
            distinct_bins: batch.bins.len(),
            rejected: batch.rejected,
            imported_at,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            batch_id = %report.batch_id,
            total = report.total_rows,
            readings = report.imported_readings,
            bins = report.distinct_bins,
            elapsed_ms = report.elapsed_ms,
            "垃圾桶读数导入完成"
        );
        Ok(report)
    }
}
