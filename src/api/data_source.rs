// ==========================================
// 城市垃圾收运调度 - 数据源抽象
// ==========================================
// DataSource: 看板所需实体快照的异步读取接口
// DashboardLoader: 并发拉取全部实体, 任一失败则整体失败
//                  (不向引擎传递不完整的数据)
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::bin::Bin;
use crate::domain::fleet::{CollectionRoute, Truck};
use crate::domain::landfill::Landfill;
use crate::repository::{BinRepository, FleetRepository, LandfillRepository, RepositoryResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

/// 路线历史默认读取条数
pub const DEFAULT_ROUTE_HISTORY_LIMIT: usize = 100;

// ==========================================
// DataSource Trait
// ==========================================
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_bins(&self) -> ApiResult<Vec<Bin>>;
    async fn fetch_trucks(&self) -> ApiResult<Vec<Truck>>;
    async fn fetch_routes(&self) -> ApiResult<Vec<CollectionRoute>>;
    async fn fetch_landfills(&self) -> ApiResult<Vec<Landfill>>;
}

// ==========================================
// RepositoryDataSource - SQLite 数据源
// ==========================================
pub struct RepositoryDataSource {
    bin_repo: Arc<BinRepository>,
    fleet_repo: Arc<FleetRepository>,
    landfill_repo: Arc<LandfillRepository>,
    route_limit: usize,
}

impl RepositoryDataSource {
    pub fn new(
        bin_repo: Arc<BinRepository>,
        fleet_repo: Arc<FleetRepository>,
        landfill_repo: Arc<LandfillRepository>,
    ) -> Self {
        Self {
            bin_repo,
            fleet_repo,
            landfill_repo,
            route_limit: DEFAULT_ROUTE_HISTORY_LIMIT,
        }
    }

    pub fn with_route_limit(mut self, route_limit: usize) -> Self {
        self.route_limit = route_limit;
        self
    }
}

/// 在阻塞线程池上执行同步仓储调用
pub(crate) async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> RepositoryResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::InternalError(format!("后台任务失败: {}", e)))?
        .map_err(ApiError::from)
}

#[async_trait]
impl DataSource for RepositoryDataSource {
    async fn fetch_bins(&self) -> ApiResult<Vec<Bin>> {
        let repo = self.bin_repo.clone();
        run_blocking(move || repo.list_bins()).await
    }

    async fn fetch_trucks(&self) -> ApiResult<Vec<Truck>> {
        let repo = self.fleet_repo.clone();
        run_blocking(move || repo.list_trucks()).await
    }

    async fn fetch_routes(&self) -> ApiResult<Vec<CollectionRoute>> {
        let repo = self.fleet_repo.clone();
        let limit = self.route_limit;
        run_blocking(move || repo.list_routes(limit)).await
    }

    async fn fetch_landfills(&self) -> ApiResult<Vec<Landfill>> {
        let repo = self.landfill_repo.clone();
        run_blocking(move || repo.list()).await
    }
}

// ==========================================
// SnapshotDataSource - 内存快照数据源
// ==========================================
// 用于离线文件分析与测试
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDataSource {
    pub bins: Vec<Bin>,
    pub trucks: Vec<Truck>,
    pub routes: Vec<CollectionRoute>,
    pub landfills: Vec<Landfill>,
}

impl SnapshotDataSource {
    pub fn with_bins(bins: Vec<Bin>) -> Self {
        Self {
            bins,
            ..Default::default()
        }
    }
}

#[async_trait]
impl DataSource for SnapshotDataSource {
    async fn fetch_bins(&self) -> ApiResult<Vec<Bin>> {
        Ok(self.bins.clone())
    }

    async fn fetch_trucks(&self) -> ApiResult<Vec<Truck>> {
        Ok(self.trucks.clone())
    }

    async fn fetch_routes(&self) -> ApiResult<Vec<CollectionRoute>> {
        Ok(self.routes.clone())
    }

    async fn fetch_landfills(&self) -> ApiResult<Vec<Landfill>> {
        Ok(self.landfills.clone())
    }
}

// ==========================================
// DashboardLoader - 并发加载
// ==========================================

/// 一次完整加载的结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub bins: Vec<Bin>,
    pub trucks: Vec<Truck>,
    pub routes: Vec<CollectionRoute>,
    pub landfills: Vec<Landfill>,
}

#[derive(Clone)]
pub struct DashboardLoader {
    source: Arc<dyn DataSource>,
}

impl DashboardLoader {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self { source }
    }

    /// 并发拉取四类实体, 全部成功后返回
    #[instrument(skip(self))]
    pub async fn load(&self) -> ApiResult<DashboardSnapshot> {
        let (bins, trucks, routes, landfills) = futures::try_join!(
            self.source.fetch_bins(),
            self.source.fetch_trucks(),
            self.source.fetch_routes(),
            self.source.fetch_landfills(),
        )?;

        debug!(
            bins = bins.len(),
            trucks = trucks.len(),
            routes = routes.len(),
            landfills = landfills.len(),
            "看板数据加载完成"
        );

        Ok(DashboardSnapshot {
            bins,
            trucks,
            routes,
            landfills,
        })
    }

    /// 只拉取垃圾桶
    pub async fn load_bins(&self) -> ApiResult<Vec<Bin>> {
        self.source.fetch_bins().await
    }

    pub async fn load_trucks(&self) -> ApiResult<Vec<Truck>> {
        self.source.fetch_trucks().await
    }

    pub async fn load_landfills(&self) -> ApiResult<Vec<Landfill>> {
        self.source.fetch_landfills().await
    }
}
