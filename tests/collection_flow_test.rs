// ==========================================
// 收运派车全流程测试
// ==========================================
// 测试范围:
// 1. 无待收运桶 → NoBinsNeedCollection
// 2. 无空闲车辆 → NoTruckAvailable
// 3. 派车 → 路线/流水落库 → 完成路线 → 状态复位
// ==========================================


use smart_waste::api::DispatchOutcome;
use smart_waste::{BinServiceStatus, RouteStatus, TruckStatus};
use test_helpers::{bin_at, TestEnv};

#[test]
fn test_dispatch_无待收运桶() {
    let env = TestEnv::new().expect("无法创建测试环境");
    env.seed_bins(&[bin_at("B-01", 30, -37.81, 144.96)]).unwrap();
    env.seed_trucks(&["Truck-01"]).unwrap();

    let outcome = env.collection_api.dispatch_collection(false).unwrap();
    assert!(matches!(outcome, DispatchOutcome::NoBinsNeedCollection { .. }));
    assert!(env.fleet_repo.list_routes(10).unwrap().is_empty());
}

#[test]
fn test_dispatch_无空闲车辆() {
    let env = TestEnv::new().expect("无法创建测试环境");
    env.seed_bins(&[
        bin_at("B-01", 95, -37.81, 144.96),
        bin_at("B-02", 85, -37.80, 144.97),
    ])
    .unwrap();

    let outcome = env.collection_api.dispatch_collection(false).unwrap();
    match outcome {
        DispatchOutcome::NoTruckAvailable { candidates, .. } => assert_eq!(candidates, 2),
        other => panic!("应无空闲车辆, 实际: {:?}", other),
    }

    // 桶状态不变
    let bins = env.bin_repo.list_bins().unwrap();
    assert!(bins.iter().all(|b| b.service_status == BinServiceStatus::Active));
}

#[test]
fn test_dispatch_派车并完成() {
    let env = TestEnv::new().expect("无法创建测试环境");
    env.seed_bins(&[
        bin_at("B-FAR", 95, -37.85, 144.96),
        bin_at("B-NEAR", 90, -37.801, 144.96),
        bin_at("B-LOW", 20, -37.80, 144.96),
    ])
    .unwrap();
    env.seed_trucks(&["Truck-01"]).unwrap();

    let outcome = env.collection_api.dispatch_collection(false).unwrap();
    let (truck, route, transaction) = match outcome {
        DispatchOutcome::Dispatched {
            truck,
            route,
            transaction,
            ..
        } => (truck, route, transaction),
        other => panic!("应成功派车, 实际: {:?}", other),
    };

    // 最近邻: 从车场先去近的
    assert_eq!(route.bin_sequence, vec!["B-NEAR".to_string(), "B-FAR".to_string()]);
    assert_eq!(route.status, RouteStatus::InProgress);
    assert!(route.distance_km.unwrap() > 0.0);

    assert_eq!(transaction.bins_collected, 2);
    assert_eq!(transaction.waste_weight, 95.0 + 90.0);

    let trucks = env.fleet_repo.list_trucks().unwrap();
    assert_eq!(trucks[0].status, TruckStatus::OnRoute);

    let near = env.bin_repo.find_by_id("B-NEAR").unwrap().unwrap();
    assert_eq!(near.service_status, BinServiceStatus::InService);
    let low = env.bin_repo.find_by_id("B-LOW").unwrap().unwrap();
    assert_eq!(low.service_status, BinServiceStatus::Active);

    // 车辆在途, 再次派车没有可用车辆
    let again = env.collection_api.dispatch_collection(false).unwrap();
    assert!(matches!(
        again,
        DispatchOutcome::NoBinsNeedCollection { .. } | DispatchOutcome::NoTruckAvailable { .. }
    ));

    let completed = env.collection_api.complete_route(truck.truck_id).unwrap();
    assert_eq!(completed, 1);

    let trucks = env.fleet_repo.list_trucks().unwrap();
    assert_eq!(trucks[0].status, TruckStatus::Idle);

    let near = env.bin_repo.find_by_id("B-NEAR").unwrap().unwrap();
    assert_eq!(near.service_status, BinServiceStatus::Active);
    assert!(near.last_serviced.is_some());

    let routes = env.fleet_repo.list_routes(10).unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].status, RouteStatus::Completed);
    assert!(routes[0].completed_at.is_some());

    assert_eq!(env.fleet_repo.list_transactions(truck.truck_id).unwrap().len(), 1);
}

#[test]
fn test_dispatch_立即完成模式() {
    let env = TestEnv::new().expect("无法创建测试环境");
    env.seed_bins(&[bin_at("B-01", 95, -37.81, 144.96)]).unwrap();
    env.seed_trucks(&["Truck-01", "Truck-02"]).unwrap();

    let outcome = env.collection_api.dispatch_collection(true).unwrap();
    match &outcome {
        DispatchOutcome::Dispatched { route, .. } => {
            assert_eq!(route.status, RouteStatus::Completed);
            assert!(route.completed_at.is_some());
        }
        other => panic!("应成功派车, 实际: {:?}", other),
    }
    assert!(outcome.message().contains("Truck-0"));

    let trucks = env.fleet_repo.list_trucks().unwrap();
    assert!(trucks.iter().all(|t| t.status == TruckStatus::Idle));

    // 完成后桶恢复可用, 读数未变, 仍然满足收运条件
    let b = env.bin_repo.find_by_id("B-01").unwrap().unwrap();
    assert_eq!(b.service_status, BinServiceStatus::Active);
}

#[test]
fn test_complete_route_无在途路线() {
    let env = TestEnv::new().expect("无法创建测试环境");
    env.seed_trucks(&["Truck-01"]).unwrap();
    let truck = env.fleet_repo.list_trucks().unwrap().remove(0);

    assert_eq!(env.collection_api.complete_route(truck.truck_id).unwrap(), 0);
}
