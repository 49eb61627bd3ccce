// ==========================================
// 引擎集成测试
// ==========================================
// 测试范围:
// 1. 排序: 等级降序 / 距离升序 / 坐标缺失排后 / bin_id 兜底
// 2. 边界: 空输入、全部低于阈值、单桶
// 3. 统计: half-up 百分比、除零保护
// ==========================================


use approx::assert_relative_eq;
use smart_waste::engine::summary::{percent_half_up, usage_percentage};
use smart_waste::engine::{prioritize, summarize, LandfillThresholds};
use smart_waste::{
    distance_km, Bin, DepotPoint, EngineError, Landfill, Ratio, SummaryEngine, UrgencyTier,
};
use test_helpers::bin_at;

fn depot() -> DepotPoint {
    DepotPoint::new(-37.80, 144.96)
}

// ==========================================
// 排序
// ==========================================

#[test]
fn test_prioritize_墨尔本场景() {
    let bins = vec![
        bin_at("A", 95, -37.81, 144.96),
        bin_at("B", 92, -37.80, 144.97),
        Bin::new("C", 92, None),
        bin_at("D", 70, -37.80, 144.961),
        bin_at("E", 50, -37.80, 144.96),
    ];

    let result = prioritize(&bins, &depot(), 60).unwrap();
    let order: Vec<&str> = result.bins.iter().map(|b| b.bin.bin_id.as_str()).collect();
    assert_eq!(order, vec!["B", "A", "C", "D"]);

    let ranks: Vec<usize> = result.bins.iter().map(|b| b.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4]);

    assert_eq!(result.bins[0].tier, UrgencyTier::Overflow);
    assert_eq!(result.bins[3].tier, UrgencyTier::Full);
    assert!(result.bins[2].distance_km.is_none());
    assert_eq!(result.missing_distance_count(), 1);

    assert_eq!(result.tier_counts.total, 4);
    assert_eq!(result.tier_counts.count(UrgencyTier::Overflow), 3);
    assert_eq!(result.tier_counts.count(UrgencyTier::Full), 1);

    // 平均距离只统计有坐标的桶
    let known: Vec<f64> = result.bins.iter().filter_map(|b| b.distance_km).collect();
    assert_eq!(known.len(), 3);
    assert_relative_eq!(
        result.average_distance_km.unwrap(),
        known.iter().sum::<f64>() / 3.0,
        max_relative = 1e-12
    );
}

#[test]
fn test_prioritize_同等级同距离按编号() {
    let bins = vec![
        bin_at("X2", 80, -37.81, 144.97),
        bin_at("X1", 80, -37.81, 144.97),
    ];
    let result = prioritize(&bins, &depot(), 0).unwrap();
    assert_eq!(result.bins[0].bin.bin_id, "X1");
    assert_eq!(result.bins[1].bin.bin_id, "X2");
}

#[test]
fn test_prioritize_不修改输入且结果确定() {
    let bins = vec![
        bin_at("A", 95, -37.81, 144.96),
        Bin::new("C", 92, None),
        bin_at("B", 92, -37.80, 144.97),
    ];
    let before = bins.clone();

    let first = prioritize(&bins, &depot(), 60).unwrap();
    let second = prioritize(&bins, &depot(), 60).unwrap();

    assert_eq!(bins, before);
    assert_eq!(first, second);
}

#[test]
fn test_prioritize_边界输入() {
    // 空输入不是错误
    let empty = prioritize(&[], &depot(), 60).unwrap();
    assert!(empty.is_empty());
    assert!(empty.average_distance_km.is_none());

    // 全部低于阈值
    let low = vec![bin_at("L1", 10, -37.8, 144.9), bin_at("L2", 59, -37.8, 144.9)];
    assert!(prioritize(&low, &depot(), 60).unwrap().is_empty());

    // 单桶
    let single = prioritize(&[bin_at("S", 60, -37.8, 144.9)], &depot(), 60).unwrap();
    assert_eq!(single.bins.len(), 1);
    assert_eq!(single.bins[0].rank, 1);
}

#[test]
fn test_prioritize_非法输入立即失败() {
    let bad_fill = vec![bin_at("A", 95, -37.81, 144.96), Bin::new("Z", 101, None)];
    assert_eq!(
        prioritize(&bad_fill, &depot(), 60).unwrap_err(),
        EngineError::InvalidFillLevel { value: 101 }
    );

    let bad_coord = vec![bin_at("Q", 95, -91.0, 144.96)];
    assert!(matches!(
        prioritize(&bad_coord, &depot(), 60),
        Err(EngineError::InvalidCoordinate { .. })
    ));

    assert!(matches!(
        prioritize(&[], &depot(), -1),
        Err(EngineError::InvalidFillLevel { value: -1 })
    ));
}

// ==========================================
// 距离
// ==========================================

#[test]
fn test_distance_对称且同点为零() {
    let ab = distance_km(-37.80, 144.96, -33.87, 151.21).unwrap();
    let ba = distance_km(-33.87, 151.21, -37.80, 144.96).unwrap();
    assert_relative_eq!(ab, ba, epsilon = 1e-9);
    // 墨尔本到悉尼约 714 km
    assert!((700.0..730.0).contains(&ab), "distance = {}", ab);

    assert_eq!(distance_km(-37.80, 144.96, -37.80, 144.96).unwrap(), 0.0);
}

// ==========================================
// 统计
// ==========================================

#[test]
fn test_summary_百分比与除零() {
    assert_eq!(percent_half_up(1, 8), 13); // 12.5 → 13
    assert_eq!(percent_half_up(1, 3), 33);
    assert_eq!(percent_half_up(2, 3), 67);

    let stats = summarize(&[1, 1, 2, 3, 3, 3, 3, 3], |v| *v);
    assert_eq!(stats.total, 8);
    assert_eq!(stats.percentage(1), Some(25));
    assert_eq!(stats.percentage(2), Some(13));
    assert_eq!(stats.percentage(3), Some(63)); // 62.5 → 63
    assert_eq!(stats.percentage(4), None);

    assert_eq!(usage_percentage(10.0, 0.0), Ratio::Undefined);
    assert_eq!(usage_percentage(25.0, 100.0), Ratio::Defined(25.0));
}

#[test]
fn test_summary_填埋场零容量() {
    let engine = SummaryEngine::new(Default::default(), LandfillThresholds::default());
    let landfills = vec![Landfill {
        landfill_id: 1,
        name: "Empty Site".to_string(),
        capacity_tons: 0.0,
        used_tons: 0.0,
        closed: false,
        location: None,
    }];

    let report = engine.summarize_landfills(&landfills);
    assert_eq!(report.usage, Ratio::Undefined);
    assert_eq!(report.near_full_sites, 0);
    assert_eq!(report.statistics.total, 1);
}
