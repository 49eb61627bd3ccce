// ==========================================
// 城市垃圾收运调度 - 国际化
// ==========================================
// 语言包: locales/zh-CN.yml（默认）, locales/en.yml
// 业务文案统一由本模块拼装, 调用方不直接引用 key
// ==========================================

use crate::domain::types::UrgencyTier;

/// 设置语言（"zh-CN" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息, 以 args 替换 `%{name}` 占位符
///
/// # 示例
/// ```no_run
/// use smart_waste::i18n::t_with_args;
/// let msg = t_with_args("alert.bin_fill", &[("bin_id", "S-001"), ("fill", "95")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = t(key);
    for (k, v) in args {
        result = result.replace(&format!("%{{{}}}", k), v);
    }
    result
}

// ==========================================
// 业务文案
// ==========================================

/// 满溢等级显示名
pub fn tier_label(tier: UrgencyTier) -> String {
    t(match tier {
        UrgencyTier::Empty => "tier.empty",
        UrgencyTier::Half => "tier.half",
        UrgencyTier::Full => "tier.full",
        UrgencyTier::Overflow => "tier.overflow",
    })
}

/// 满溢告警正文
pub fn fill_alert(bin_id: &str, fill_level: i32) -> String {
    t_with_args(
        "alert.bin_fill",
        &[("bin_id", bin_id), ("fill", &fill_level.to_string())],
    )
}

/// 导入完成摘要
pub fn import_completed(batch_id: &str, readings: usize, rejected: usize) -> String {
    t_with_args(
        "import.completed",
        &[
            ("batch_id", batch_id),
            ("readings", &readings.to_string()),
            ("rejected", &rejected.to_string()),
        ],
    )
}

pub fn no_bins_need_collection() -> String {
    t("collection.no_bins")
}

pub fn no_truck_available() -> String {
    t("collection.no_trucks")
}

/// 派车结果; completed 为 true 表示路线已同时完成
pub fn truck_assigned(truck: &str, bins: usize, completed: bool) -> String {
    if completed {
        t_with_args("collection.assigned_completed", &[("truck", truck)])
    } else {
        t_with_args(
            "collection.assigned",
            &[("truck", truck), ("bins", &bins.to_string())],
        )
    }
}
