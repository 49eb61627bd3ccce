// ==========================================
// DashboardApi 集成测试
// ==========================================
// 测试范围:
// 1. 汇总计数: get_dashboard_summary, get_overview
// 2. 紧急度排序: get_prioritized_bins
// 3. 告警: refresh_fill_alerts, get_recent_alerts
// 4. 建议车场: suggest_depot
// 5. 列表: list_bins, list_trucks, list_landfills (含默认填埋场)
// ==========================================


use smart_waste::app::{AppState, DEFAULT_LANDFILLS};
use smart_waste::{Bin, BinServiceStatus, Landfill, LandfillStatus, Ratio, TruckStatus, UrgencyTier};
use test_helpers::{bin_at, create_test_db, TestEnv};

fn seeded_env() -> TestEnv {
    let env = TestEnv::new().expect("无法创建测试环境");
    env.seed_bins(&[
        bin_at("B-01", 95, -37.81, 144.96),
        bin_at("B-02", 85, -37.80, 144.97),
        bin_at("B-03", 40, -37.79, 144.95),
        Bin::new("B-04", 10, None),
    ])
    .unwrap();
    env.seed_trucks(&["Truck-01", "Truck-02"]).unwrap();
    env
}

#[tokio::test]
async fn test_get_dashboard_summary_计数() {
    let env = seeded_env();
    env.bin_repo
        .set_service_status(&["B-03".to_string()], BinServiceStatus::InService)
        .unwrap();

    let summary = env.dashboard_api.get_dashboard_summary().await.unwrap();
    assert_eq!(summary.total_bins, 4);
    assert_eq!(summary.active_bins, 1);
    assert_eq!(summary.available_bins, 3);
    assert_eq!(summary.full_bins, 2);
    assert_eq!(summary.idle_trucks, 2);
    assert_eq!(summary.active_trucks, 0);
}

#[tokio::test]
async fn test_get_overview_空库() {
    let env = TestEnv::new().expect("无法创建测试环境");

    let overview = env.dashboard_api.get_overview().await.unwrap();
    assert_eq!(overview.summary.total_bins, 0);
    assert_eq!(overview.bins.statistics.total, 0);
    assert_eq!(overview.bins.average_fill_level, Ratio::Undefined);
    assert_eq!(overview.trucks.load_usage, Ratio::Undefined);
    assert_eq!(overview.routes.average_distance_km, Ratio::Undefined);
    assert_eq!(overview.landfills.usage, Ratio::Undefined);
}

#[tokio::test]
async fn test_get_overview_分实体报表() {
    let env = seeded_env();
    env.landfill_repo
        .upsert(&Landfill {
            landfill_id: 0,
            name: "Werribee".to_string(),
            capacity_tons: 1000.0,
            used_tons: 750.0,
            closed: false,
            location: None,
        })
        .unwrap();

    let overview = env.dashboard_api.get_overview().await.unwrap();

    assert_eq!(overview.bins.statistics.total, 4);
    assert_eq!(overview.bins.statistics.count(UrgencyTier::Overflow), 1);
    assert_eq!(overview.bins.statistics.count(UrgencyTier::Full), 1);
    assert_eq!(overview.bins.statistics.percentage(UrgencyTier::Empty), Some(25));
    assert_eq!(overview.bins.missing_location, 1);
    assert_eq!(overview.bins.average_fill_level, Ratio::Defined(57.5));

    assert_eq!(overview.landfills.usage, Ratio::Defined(75.0));
    assert_eq!(overview.landfills.near_full_sites, 1);
}

#[tokio::test]
async fn test_get_prioritized_bins_默认阈值() {
    let env = seeded_env();

    let result = env.dashboard_api.get_prioritized_bins(None).await.unwrap();
    assert_eq!(result.capacity_threshold, 80);
    let ids: Vec<&str> = result.bins.iter().map(|b| b.bin.bin_id.as_str()).collect();
    assert_eq!(ids, vec!["B-01", "B-02"]);

    let all = env.dashboard_api.get_prioritized_bins(Some(0)).await.unwrap();
    assert_eq!(all.bins.len(), 4);
    // 缺坐标的桶排在同等级之后, 仍然出现
    assert_eq!(all.missing_distance_count(), 1);
}

#[tokio::test]
async fn test_get_prioritized_bins_非法阈值() {
    let env = seeded_env();
    assert!(env.dashboard_api.get_prioritized_bins(Some(120)).await.is_err());
}

#[tokio::test]
async fn test_refresh_fill_alerts_新的在前() {
    let env = seeded_env();

    let count = env.dashboard_api.refresh_fill_alerts().await.unwrap();
    assert!(count >= 2, "满溢桶至少各有一条告警, 实际 {}", count);

    let alerts = env.dashboard_api.get_recent_alerts(10).await.unwrap();
    assert_eq!(alerts.len(), count.min(10));
    assert!(alerts.iter().any(|a| a.bin_id.as_deref() == Some("B-01")));
    assert!(alerts
        .windows(2)
        .all(|w| w[0].created_at >= w[1].created_at));

    assert_eq!(env.dashboard_api.get_recent_alerts(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_suggest_depot_坐标平均() {
    let env = seeded_env();
    let center = env.dashboard_api.suggest_depot().await.unwrap().unwrap();
    assert!((center.lat - (-37.80)).abs() < 1e-9);
    assert!((center.lon - 144.96).abs() < 1e-9);

    let empty = TestEnv::new().unwrap();
    assert!(empty.dashboard_api.suggest_depot().await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_bins_与_list_trucks() {
    let env = seeded_env();

    let bins = env.dashboard_api.list_bins().await.unwrap();
    let ids: Vec<&str> = bins.iter().map(|b| b.bin_id.as_str()).collect();
    assert_eq!(ids, vec!["B-01", "B-02", "B-03", "B-04"]);
    assert_eq!(bins[0].fill_level, 95);

    let trucks = env.dashboard_api.list_trucks().await.unwrap();
    assert_eq!(trucks.len(), 2);
    assert!(trucks.iter().all(|t| t.status == TruckStatus::Idle));
}

#[tokio::test]
async fn test_list_landfills_默认登记() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path).unwrap();

    let landfills = state.dashboard_api.list_landfills().await.unwrap();
    let names: Vec<&str> = landfills.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Central Landfill", "East Waste Facility"]);
    assert_eq!(landfills.len(), DEFAULT_LANDFILLS.len());
    assert_eq!(landfills[0].capacity_tons, 10_000.0);
    assert_eq!(landfills[0].used_tons, 4_000.0);

    // (4000 + 2500) / (10000 + 8000) = 36.11%
    let overview = state.dashboard_api.get_overview().await.unwrap();
    assert_eq!(overview.landfills.statistics.total, 2);
    assert_eq!(overview.landfills.statistics.count(LandfillStatus::Active), 2);
    assert_eq!(overview.landfills.total_capacity_tons, 18_000.0);
    let usage = overview.landfills.usage.value().unwrap();
    assert!((usage - 6_500.0 / 18_000.0 * 100.0).abs() < 1e-9);
}
