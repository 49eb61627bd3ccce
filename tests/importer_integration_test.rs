// ==========================================
// 导入集成测试
// ==========================================
// 测试范围:
// 1. CSV 文件 → 解析 → 校验 → 落库 → 列表查询
// 2. JSON 载荷导入
// 3. 不支持的文件格式
// ==========================================


use std::io::Write;

use serde_json::json;
use smart_waste::importer::ImportError;
use smart_waste::BinServiceStatus;
use tempfile::Builder;
use test_helpers::TestEnv;

const SENSOR_CSV: &str = "\
serial,address,lat,lon,status_current_fill_level,bin_status,time
S-001,Argyle Square North,-37.8021,144.9654,45,Half,2024-05-01T08:00:00Z
S-002,Argyle Square South,-37.8030,144.9660,92%,Full,2024-05-01T08:00:00Z
S-001,,,,81,Full,2024-05-01T10:00:00Z
S-003,Lygon St,,,30,Empty,2024-05-01T08:00:00Z
,Nowhere,-37.80,144.96,50,Half,2024-05-01T08:00:00Z
S-004,Far Away,-95.0,144.96,50,Half,2024-05-01T08:00:00Z
S-005,No Reading,-37.80,144.96,,Half,2024-05-01T08:00:00Z
";

fn write_csv(content: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_import_csv_端到端() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let file = write_csv(SENSOR_CSV);

    let report = env.importer.import_file(file.path()).expect("导入失败");

    assert_eq!(report.total_rows, 7);
    assert_eq!(report.imported_readings, 4);
    assert_eq!(report.distinct_bins, 3);

    // 缺编号 / 坐标越界 / 缺满溢率 三行被拒绝
    let rejected_rows: Vec<usize> = report.rejected.iter().map(|r| r.row_number).collect();
    assert_eq!(rejected_rows, vec![5, 6, 7]);
    assert!(report.message().contains(&report.imported_readings.to_string()));

    let bins = env.bin_repo.list_bins().unwrap();
    assert_eq!(bins.len(), 3);

    // 满溢率取最新读数, 坐标保留首行的非空值
    let s1 = env.bin_repo.find_by_id("S-001").unwrap().unwrap();
    assert_eq!(s1.fill_level, 81);
    assert_eq!(s1.address.as_deref(), Some("Argyle Square North"));
    assert!(s1.location.is_some());
    assert_eq!(s1.service_status, BinServiceStatus::Active);

    let s2 = env.bin_repo.find_by_id("S-002").unwrap().unwrap();
    assert_eq!(s2.fill_level, 92);

    // 缺坐标的桶保留
    let s3 = env.bin_repo.find_by_id("S-003").unwrap().unwrap();
    assert!(s3.location.is_none());

    assert!(env.bin_repo.find_by_id("S-004").unwrap().is_none());
    assert_eq!(env.bin_repo.count_readings().unwrap(), 4);
}

#[test]
fn test_import_csv_重复导入不覆盖服务状态() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let file = write_csv(SENSOR_CSV);
    env.importer.import_file(file.path()).unwrap();

    env.bin_repo
        .set_service_status(&["S-002".to_string()], BinServiceStatus::InService)
        .unwrap();

    env.importer.import_file(file.path()).unwrap();

    let s2 = env.bin_repo.find_by_id("S-002").unwrap().unwrap();
    assert_eq!(s2.service_status, BinServiceStatus::InService);
    assert_eq!(env.bin_repo.count_readings().unwrap(), 8);
}

#[test]
fn test_import_json_载荷() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let payload = json!({
        "data": [
            {"bin_id": "J-1", "fill_level": 95, "latitude": -37.81, "longitude": 144.97},
            {"bin_id": "J-2", "fill_level": 10, "capacity": 240},
            {"bin_id": "J-3"}
        ]
    });

    let report = env.importer.import_json(&payload, "api").unwrap();
    assert_eq!(report.source, "api");
    assert_eq!(report.imported_readings, 2);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].bin_id.as_deref(), Some("J-3"));

    let j2 = env.bin_repo.find_by_id("J-2").unwrap().unwrap();
    assert_eq!(j2.capacity, 240.0);
}

#[test]
fn test_import_不支持的格式() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let file = Builder::new().suffix(".txt").tempfile().unwrap();

    let err = env.importer.import_file(file.path()).unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedFormat(_)));
}

#[test]
fn test_import_文件不存在() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let err = env
        .importer
        .import_file("/nonexistent/readings.csv")
        .unwrap_err();
    assert!(matches!(err, ImportError::FileNotFound(_)));
}
