// ==========================================
// 城市垃圾收运调度 - 命令行入口
// ==========================================
// 输出: 结果以 JSON 写到 stdout, 日志写到 stderr
// ==========================================

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use smart_waste::api::DEFAULT_ALERT_LIMIT;
use smart_waste::app::{get_default_db_path, AppState};
use smart_waste::engine::geo::point_from_pair;
use smart_waste::engine::geographic_center;
use smart_waste::importer::{prepare_rows, FileParser, UniversalFileParser};
use smart_waste::{i18n, logging, GeoPoint, Landfill};

#[derive(Parser)]
#[command(
    name = "smart-waste",
    version,
    about = "城市垃圾收运调度: 紧急度排序、看板统计与派车"
)]
struct Cli {
    /// 数据库文件路径（默认: SMART_WASTE_DB_PATH 或用户数据目录）
    #[arg(long, global = true)]
    db: Option<String>,

    /// 消息语言 (zh-CN / en)
    #[arg(long, global = true, default_value = "zh-CN")]
    lang: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 导入传感器读数 (.csv / .xlsx / .json)
    Import {
        file: PathBuf,
    },
    /// 按紧急度排序待收运垃圾桶
    Prioritize {
        /// 纳入阈值 (%), 缺省使用配置的收运阈值
        #[arg(long)]
        threshold: Option<i32>,
    },
    /// 看板总览
    Summary,
    /// 垃圾桶列表（最新读数）
    Bins,
    /// 车辆列表
    Trucks,
    /// 填埋场列表 / 登记
    Landfills {
        #[command(subcommand)]
        action: Option<LandfillAction>,
    },
    /// 派出一次收运
    Collect {
        /// 派车后立即完成路线
        #[arg(long)]
        complete: bool,
    },
    /// 完成车辆当前路线
    Complete {
        truck_id: i64,
    },
    /// 最近告警
    Alerts {
        #[arg(long, default_value_t = DEFAULT_ALERT_LIMIT)]
        limit: usize,
        /// 先按当前满溢率派生告警
        #[arg(long)]
        refresh: bool,
    },
    /// 计算文件中垃圾桶坐标的地理中心（不访问数据库）
    Center {
        file: PathBuf,
    },
    /// 引擎参数
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// 显示生效参数
    Show,
    /// 写入参数
    Set { key: String, value: String },
}

#[derive(Subcommand)]
enum LandfillAction {
    /// 列出全部填埋场
    List,
    /// 按名称新增或更新
    Set {
        name: String,
        #[arg(long)]
        capacity_tons: f64,
        #[arg(long, default_value_t = 0.0)]
        used_tons: f64,
        #[arg(long)]
        closed: bool,
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
}

#[derive(Serialize)]
struct CenterOutput {
    bins: usize,
    located: usize,
    center: Option<GeoPoint>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_state(db: Option<String>) -> Result<AppState> {
    let db_path = db.unwrap_or_else(get_default_db_path);
    AppState::new(db_path).map_err(|e| anyhow!(e))
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    i18n::set_locale(&cli.lang);

    tracing::info!(version = smart_waste::VERSION, "{}", smart_waste::APP_NAME);

    match cli.command {
        Commands::Center { file } => {
            let rows = UniversalFileParser
                .parse_to_raw_records(&file)
                .with_context(|| format!("无法读取 {}", file.display()))?;
            let batch = prepare_rows(&rows, chrono::Utc::now());
            let points: Vec<GeoPoint> = batch.bins.iter().filter_map(|b| b.location).collect();
            print_json(&CenterOutput {
                bins: batch.bins.len(),
                located: points.len(),
                center: geographic_center(&points),
            })?;
        }
        Commands::Import { file } => {
            let state = open_state(cli.db)?;
            let report = state.importer.import_file(&file)?;
            tracing::info!("{}", report.message());
            print_json(&report)?;
        }
        Commands::Prioritize { threshold } => {
            let state = open_state(cli.db)?;
            let result = state.dashboard_api.get_prioritized_bins(threshold).await?;
            for category in &result.tier_counts.categories {
                tracing::info!(
                    tier = %i18n::tier_label(category.category),
                    count = category.count,
                    percentage = category.percentage,
                    "满溢等级分布"
                );
            }
            print_json(&result)?;
        }
        Commands::Summary => {
            let state = open_state(cli.db)?;
            print_json(&state.dashboard_api.get_overview().await?)?;
        }
        Commands::Bins => {
            let state = open_state(cli.db)?;
            print_json(&state.dashboard_api.list_bins().await?)?;
        }
        Commands::Trucks => {
            let state = open_state(cli.db)?;
            print_json(&state.dashboard_api.list_trucks().await?)?;
        }
        Commands::Landfills { action } => {
            let state = open_state(cli.db)?;
            if let Some(LandfillAction::Set {
                name,
                capacity_tons,
                used_tons,
                closed,
                lat,
                lon,
            }) = action
            {
                let location = point_from_pair(lat, lon)?;
                let id = state.landfill_repo.upsert(&Landfill {
                    landfill_id: 0,
                    name,
                    capacity_tons,
                    used_tons,
                    closed,
                    location,
                })?;
                tracing::info!(landfill_id = id, "填埋场已保存");
            }
            print_json(&state.dashboard_api.list_landfills().await?)?;
        }
        Commands::Collect { complete } => {
            let state = open_state(cli.db)?;
            let outcome = state.collection_api.dispatch_collection(complete)?;
            tracing::info!("{}", outcome.message());
            print_json(&outcome)?;
        }
        Commands::Complete { truck_id } => {
            let state = open_state(cli.db)?;
            let completed = state.collection_api.complete_route(truck_id)?;
            print_json(&serde_json::json!({ "truck_id": truck_id, "completed_routes": completed }))?;
        }
        Commands::Alerts { limit, refresh } => {
            let state = open_state(cli.db)?;
            if refresh {
                state.dashboard_api.refresh_fill_alerts().await?;
            }
            print_json(&state.dashboard_api.get_recent_alerts(limit).await?)?;
        }
        Commands::Config { action } => {
            let state = open_state(cli.db)?;
            match action {
                ConfigAction::Show => print_json(&state.engine_config)?,
                ConfigAction::Set { key, value } => {
                    state
                        .config_manager
                        .set_config_value(&key, &value)
                        .map_err(|e| anyhow!("配置写入失败: {}", e))?;
                    // 写入后重新读取, 非法值立即报错
                    let config = state
                        .config_manager
                        .get_engine_config()
                        .map_err(|e| anyhow!("配置校验失败: {}", e))?;
                    print_json(&config)?;
                }
            }
        }
    }

    Ok(())
}
