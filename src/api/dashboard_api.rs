// ==========================================
// 城市垃圾收运调度 - 看板 API
// ==========================================
// 职责: 加载实体快照 → 调用引擎 → 返回看板视图
// 架构: API 层 → DashboardLoader (DataSource) → Engine
// 告警查询需要 AlertRepository, 离线快照模式下不可用
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::data_source::{run_blocking, DashboardLoader, DataSource};
use crate::api::error::{ApiError, ApiResult};
use crate::config::EngineConfig;
use crate::domain::alert::MonitoringAlert;
use crate::domain::bin::Bin;
use crate::domain::fleet::Truck;
use crate::domain::landfill::Landfill;
use crate::domain::location::GeoPoint;
use crate::domain::summary::{BinReport, DashboardSummary, LandfillReport, RouteReport, TruckReport};
use crate::engine::collection::derive_fill_alerts;
use crate::engine::{geographic_center, BinPrioritizer, PrioritizationResult, SummaryEngine};
use crate::repository::AlertRepository;

/// 最近告警默认条数
pub const DEFAULT_ALERT_LIMIT: usize = 10;

// ==========================================
// DashboardOverview - 看板总览
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub summary: DashboardSummary,
    pub bins: BinReport,
    pub trucks: TruckReport,
    pub routes: RouteReport,
    pub landfills: LandfillReport,
}

// ==========================================
// DashboardApi - 看板 API
// ==========================================
pub struct DashboardApi {
    loader: DashboardLoader,
    config: EngineConfig,
    alert_repo: Option<Arc<AlertRepository>>,
}

impl DashboardApi {
    /// 创建新的 DashboardApi 实例
    ///
    /// # 参数
    /// - source: 实体数据源
    /// - config: 已校验的引擎参数
    pub fn new(source: Arc<dyn DataSource>, config: EngineConfig) -> Self {
        Self {
            loader: DashboardLoader::new(source),
            config,
            alert_repo: None,
        }
    }

    /// 启用告警查询
    pub fn with_alerts(mut self, alert_repo: Arc<AlertRepository>) -> Self {
        self.alert_repo = Some(alert_repo);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn summary_engine(&self) -> ApiResult<SummaryEngine> {
        Ok(SummaryEngine::new(self.config.classifier()?, self.config.landfill))
    }

    fn alert_repo(&self) -> ApiResult<&Arc<AlertRepository>> {
        self.alert_repo
            .as_ref()
            .ok_or_else(|| ApiError::BusinessRuleViolation("当前数据源不支持告警".to_string()))
    }

    // ==========================================
    // 汇总
    // ==========================================

    /// 驾驶舱汇总计数
    pub async fn get_dashboard_summary(&self) -> ApiResult<DashboardSummary> {
        let snapshot = self.loader.load().await?;
        let summary = self.summary_engine()?.dashboard_summary(
            &snapshot.bins,
            &snapshot.trucks,
            self.config.collection_threshold_pct,
        )?;
        Ok(summary)
    }

    /// 看板总览（汇总 + 分实体报表, 同一次加载）
    #[instrument(skip(self))]
    pub async fn get_overview(&self) -> ApiResult<DashboardOverview> {
        let snapshot = self.loader.load().await?;
        let engine = self.summary_engine()?;

        Ok(DashboardOverview {
            summary: engine.dashboard_summary(
                &snapshot.bins,
                &snapshot.trucks,
                self.config.collection_threshold_pct,
            )?,
            bins: engine.summarize_bins(&snapshot.bins)?,
            trucks: engine.summarize_trucks(&snapshot.trucks),
            routes: engine.summarize_routes(&snapshot.routes),
            landfills: engine.summarize_landfills(&snapshot.landfills),
        })
    }

    // ==========================================
    // 列表
    // ==========================================

    /// 全部垃圾桶（满溢率为最新读数, 按 bin_id 排序）
    pub async fn list_bins(&self) -> ApiResult<Vec<Bin>> {
        self.loader.load_bins().await
    }

    /// 全部车辆
    pub async fn list_trucks(&self) -> ApiResult<Vec<Truck>> {
        self.loader.load_trucks().await
    }

    /// 全部填埋场
    pub async fn list_landfills(&self) -> ApiResult<Vec<Landfill>> {
        self.loader.load_landfills().await
    }

    // ==========================================
    // 紧急度
    // ==========================================

    /// 按紧急度排序的待收运垃圾桶
    ///
    /// # 参数
    /// - capacity_threshold: 纳入阈值, 缺省使用 collection_threshold_pct
    #[instrument(skip(self))]
    pub async fn get_prioritized_bins(
        &self,
        capacity_threshold: Option<i32>,
    ) -> ApiResult<PrioritizationResult> {
        let bins = self.loader.load_bins().await?;
        let threshold = capacity_threshold.unwrap_or(self.config.collection_threshold_pct);
        let prioritizer = BinPrioritizer::new(self.config.classifier()?);
        Ok(prioritizer.prioritize(&bins, &self.config.depot, threshold)?)
    }

    /// 以已知坐标的平均值作为建议车场位置
    pub async fn suggest_depot(&self) -> ApiResult<Option<GeoPoint>> {
        let bins = self.loader.load_bins().await?;
        let points: Vec<GeoPoint> = bins.iter().filter_map(|b| b.location).collect();
        Ok(geographic_center(&points))
    }

    // ==========================================
    // 告警
    // ==========================================

    /// 最近的告警（新的在前）
    pub async fn get_recent_alerts(&self, limit: usize) -> ApiResult<Vec<MonitoringAlert>> {
        let repo = self.alert_repo()?.clone();
        run_blocking(move || repo.recent(limit)).await
    }

    /// 按当前满溢率派生告警并落库
    ///
    /// # 返回
    /// 新写入的告警数量
    pub async fn refresh_fill_alerts(&self) -> ApiResult<usize> {
        let repo = self.alert_repo()?.clone();
        let bins = self.loader.load_bins().await?;
        let alerts = derive_fill_alerts(&bins, &self.config.classifier()?, Utc::now())?;
        let count = run_blocking(move || repo.insert_batch(&alerts)).await?;
        info!(count, "满溢告警已刷新");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::data_source::SnapshotDataSource;
    use crate::domain::bin::Bin;
    use crate::domain::types::UrgencyTier;

    fn api(bins: Vec<Bin>) -> DashboardApi {
        DashboardApi::new(
            Arc::new(SnapshotDataSource::with_bins(bins)),
            EngineConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_prioritized_bins_default_threshold() {
        let api = api(vec![
            Bin::new("B1", 95, Some(GeoPoint { lat: -37.81, lon: 144.96 })),
            Bin::new("B2", 50, None),
            Bin::new("B3", 80, None),
        ]);
        let result = api.get_prioritized_bins(None).await.unwrap();
        let ids: Vec<&str> = result.bins.iter().map(|p| p.bin.bin_id.as_str()).collect();
        assert_eq!(ids, vec!["B1", "B3"]);
        assert_eq!(result.bins[0].tier, UrgencyTier::Overflow);
    }

    #[tokio::test]
    async fn test_overview_on_empty_snapshot() {
        let overview = api(Vec::new()).get_overview().await.unwrap();
        assert_eq!(overview.summary.total_bins, 0);
        assert!(!overview.bins.average_fill_level.is_defined());
        assert!(!overview.landfills.usage.is_defined());
    }

    #[tokio::test]
    async fn test_suggest_depot_ignores_unlocated() {
        let api = api(vec![
            Bin::new("B1", 10, Some(GeoPoint { lat: 10.0, lon: 20.0 })),
            Bin::new("B2", 10, Some(GeoPoint { lat: 20.0, lon: 40.0 })),
            Bin::new("B3", 10, None),
        ]);
        assert_eq!(
            api.suggest_depot().await.unwrap(),
            Some(GeoPoint { lat: 15.0, lon: 30.0 })
        );
    }

    #[tokio::test]
    async fn test_alerts_unavailable_without_repository() {
        let api = api(Vec::new());
        assert!(matches!(
            api.get_recent_alerts(DEFAULT_ALERT_LIMIT).await,
            Err(ApiError::BusinessRuleViolation(_))
        ));
        assert!(matches!(
            api.refresh_fill_alerts().await,
            Err(ApiError::BusinessRuleViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_list_operations_pass_through_source() {
        let api = api(vec![Bin::new("B2", 10, None), Bin::new("B1", 20, None)]);
        let ids: Vec<String> = api.list_bins().await.unwrap().into_iter().map(|b| b.bin_id).collect();
        assert_eq!(ids, vec!["B2", "B1"]);
        assert!(api.list_trucks().await.unwrap().is_empty());
        assert!(api.list_landfills().await.unwrap().is_empty());
    }
}
