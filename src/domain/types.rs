// ==========================================
// 城市垃圾收运调度 - 领域类型定义
// ==========================================
// 紧急等级: 由满溢率派生,读时计算,不落库
// 状态标签: 与各后端口径统一后的规范值
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 满溢等级 (Urgency Tier)
// ==========================================
// 顺序: Empty < Half < Full < Overflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyTier {
    Empty,    // 空桶
    Half,     // 半满
    Full,     // 已满
    Overflow, // 溢出
}

impl UrgencyTier {
    /// 全部等级（按严重度升序）
    pub const ALL: [UrgencyTier; 4] = [
        UrgencyTier::Empty,
        UrgencyTier::Half,
        UrgencyTier::Full,
        UrgencyTier::Overflow,
    ];

    /// 告警视角下的严重度（一一对应）
    pub fn severity(self) -> AlertSeverity {
        match self {
            UrgencyTier::Empty => AlertSeverity::Low,
            UrgencyTier::Half => AlertSeverity::Medium,
            UrgencyTier::Full => AlertSeverity::High,
            UrgencyTier::Overflow => AlertSeverity::Critical,
        }
    }
}

impl fmt::Display for UrgencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrgencyTier::Empty => write!(f, "EMPTY"),
            UrgencyTier::Half => write!(f, "HALF"),
            UrgencyTier::Full => write!(f, "FULL"),
            UrgencyTier::Overflow => write!(f, "OVERFLOW"),
        }
    }
}

// ==========================================
// 告警严重度 (Alert Severity)
// ==========================================
// 顺序: Low < Medium < High < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    /// 从数据库/接口字符串解析（大小写不敏感）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "LOW" => Some(AlertSeverity::Low),
            "MEDIUM" => Some(AlertSeverity::Medium),
            "HIGH" => Some(AlertSeverity::High),
            "CRITICAL" => Some(AlertSeverity::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Low => write!(f, "LOW"),
            AlertSeverity::Medium => write!(f, "MEDIUM"),
            AlertSeverity::High => write!(f, "HIGH"),
            AlertSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

// ==========================================
// 垃圾桶服务状态 (Bin Service Status)
// ==========================================
// Active: 可用; InService: 已分配到收运路线
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BinServiceStatus {
    Active,
    InService,
}

impl BinServiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BinServiceStatus::Active => "ACTIVE",
            BinServiceStatus::InService => "IN_SERVICE",
        }
    }

    /// 兼容 'Active' / 'In-Service' 等旧口径
    pub fn parse(s: &str) -> Option<Self> {
        match normalize_label(s).as_str() {
            "ACTIVE" => Some(BinServiceStatus::Active),
            "IN_SERVICE" | "INSERVICE" => Some(BinServiceStatus::InService),
            _ => None,
        }
    }
}

impl fmt::Display for BinServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 车辆状态 (Truck Status)
// ==========================================
// 两套后端口径: Idle/On-Route 与 Available/On Route
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TruckStatus {
    Idle,
    OnRoute,
    Maintenance,
}

impl TruckStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TruckStatus::Idle => "IDLE",
            TruckStatus::OnRoute => "ON_ROUTE",
            TruckStatus::Maintenance => "MAINTENANCE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match normalize_label(s).as_str() {
            "IDLE" | "AVAILABLE" => Some(TruckStatus::Idle),
            "ON_ROUTE" | "ONROUTE" => Some(TruckStatus::OnRoute),
            "MAINTENANCE" => Some(TruckStatus::Maintenance),
            _ => None,
        }
    }
}

impl fmt::Display for TruckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 路线状态 (Route Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteStatus {
    Scheduled,
    InProgress,
    Completed,
}

impl RouteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteStatus::Scheduled => "SCHEDULED",
            RouteStatus::InProgress => "IN_PROGRESS",
            RouteStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match normalize_label(s).as_str() {
            "SCHEDULED" => Some(RouteStatus::Scheduled),
            "IN_PROGRESS" | "INPROGRESS" => Some(RouteStatus::InProgress),
            "COMPLETED" => Some(RouteStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 填埋场状态 (Landfill Status)
// ==========================================
// 由使用率派生: >= full → Full, >= near_full → NearFull, 其余 Active
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LandfillStatus {
    Active,
    NearFull,
    Full,
    Closed,
}

impl fmt::Display for LandfillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LandfillStatus::Active => write!(f, "ACTIVE"),
            LandfillStatus::NearFull => write!(f, "NEAR_FULL"),
            LandfillStatus::Full => write!(f, "FULL"),
            LandfillStatus::Closed => write!(f, "CLOSED"),
        }
    }
}

/// 统一状态字符串: 去空白、转大写、'-' 与空格替换为 '_'
fn normalize_label(s: &str) -> String {
    s.trim()
        .to_uppercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect()
}
