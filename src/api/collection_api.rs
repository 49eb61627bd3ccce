// ==========================================
// 城市垃圾收运调度 - 收运派车 API
// ==========================================
// 流程:
// 1. 读取当前垃圾桶快照, 只考虑可用 (ACTIVE) 的桶
// 2. 筛选收运候选 → 无候选返回 NoBinsNeedCollection
// 3. 取第一辆空闲车辆 → 无车返回 NoTruckAvailable
// 4. 最近邻构建路线, 单事务落库 (车辆/垃圾桶状态 + 路线 + 流水)
// 5. 可选: 立即完成路线
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::api::error::ApiResult;
use crate::config::EngineConfig;
use crate::domain::bin::Bin;
use crate::domain::fleet::{CollectionRoute, CollectionTransaction, Truck};
use crate::domain::types::{BinServiceStatus, RouteStatus};
use crate::engine::collection::find_bins_for_collection;
use crate::engine::{RoutePlan, RoutePlanner};
use crate::i18n;
use crate::repository::{BinRepository, FleetRepository};

// ==========================================
// DispatchOutcome - 派车结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatchOutcome {
    NoBinsNeedCollection {
        message: String,
    },
    NoTruckAvailable {
        candidates: usize,
        message: String,
    },
    Dispatched {
        truck: Truck,
        route: CollectionRoute,
        plan: RoutePlan,
        transaction: CollectionTransaction,
        message: String,
    },
}

impl DispatchOutcome {
    pub fn message(&self) -> &str {
        match self {
            DispatchOutcome::NoBinsNeedCollection { message }
            | DispatchOutcome::NoTruckAvailable { message, .. }
            | DispatchOutcome::Dispatched { message, .. } => message,
        }
    }
}

/// 预估收运量: sum(容量 × 满溢率)
pub fn estimate_waste_weight(bins: &[Bin]) -> f64 {
    bins.iter()
        .map(|b| b.capacity * b.fill_level as f64 / 100.0)
        .sum()
}

// ==========================================
// CollectionApi
// ==========================================
pub struct CollectionApi {
    bin_repo: Arc<BinRepository>,
    fleet_repo: Arc<FleetRepository>,
    config: EngineConfig,
}

impl CollectionApi {
    pub fn new(
        bin_repo: Arc<BinRepository>,
        fleet_repo: Arc<FleetRepository>,
        config: EngineConfig,
    ) -> Self {
        Self {
            bin_repo,
            fleet_repo,
            config,
        }
    }

    /// 派出一次收运
    ///
    /// # 参数
    /// - complete_immediately: 派车后立即完成路线（批处理/演示模式）
    #[instrument(skip(self))]
    pub fn dispatch_collection(&self, complete_immediately: bool) -> ApiResult<DispatchOutcome> {
        let available: Vec<Bin> = self
            .bin_repo
            .list_bins()?
            .into_iter()
            .filter(|b| b.service_status == BinServiceStatus::Active)
            .collect();

        let readings = self.bin_repo.latest_readings()?;
        let candidates =
            find_bins_for_collection(&available, &readings, self.config.collection_threshold_pct)?;
        if candidates.is_empty() {
            info!("没有需要收运的垃圾桶");
            return Ok(DispatchOutcome::NoBinsNeedCollection {
                message: i18n::no_bins_need_collection(),
            });
        }

        let Some(truck) = self.fleet_repo.find_idle_truck()? else {
            info!(candidates = candidates.len(), "没有空闲车辆");
            return Ok(DispatchOutcome::NoTruckAvailable {
                candidates: candidates.len(),
                message: i18n::no_truck_available(),
            });
        };

        let plan = RoutePlanner::nearest_neighbor(self.config.depot.location, &candidates)?;
        let now = Utc::now();
        let mut route = CollectionRoute {
            route_id: Uuid::new_v4().to_string(),
            truck_id: Some(truck.truck_id),
            status: RouteStatus::InProgress,
            bin_sequence: plan.bin_sequence(),
            distance_km: Some(plan.total_distance_km),
            assigned_at: now,
            completed_at: None,
        };

        let transaction = self.fleet_repo.record_assignment(
            truck.truck_id,
            &route,
            estimate_waste_weight(&candidates),
        )?;
        info!(
            truck = %truck.name,
            route_id = %route.route_id,
            bins = route.bin_sequence.len(),
            distance_km = plan.total_distance_km,
            "车辆已派出"
        );

        if complete_immediately {
            let completed_at = Utc::now();
            self.fleet_repo.complete_routes(truck.truck_id, completed_at)?;
            route.status = RouteStatus::Completed;
            route.completed_at = Some(completed_at);
        }
        let message =
            i18n::truck_assigned(&truck.name, route.bin_sequence.len(), complete_immediately);

        Ok(DispatchOutcome::Dispatched {
            truck,
            route,
            plan,
            transaction,
            message,
        })
    }

    /// 完成车辆当前路线
    pub fn complete_route(&self, truck_id: i64) -> ApiResult<usize> {
        let count = self.fleet_repo.complete_routes(truck_id, Utc::now())?;
        info!(truck_id, count, "路线已完成");
        Ok(count)
    }
}
