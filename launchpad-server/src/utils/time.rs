//! 时间工具函数 — 业务时区转换
//!
//! 所有日期→时间戳转换统一在 API handler 层完成，
//! repository 层只接收 `i64` Unix millis。

use chrono::NaiveDate;
use chrono_tz::Tz;

pub const MILLIS_PER_HOUR: i64 = 3_600_000;
pub const MILLIS_PER_MINUTE: i64 = 60_000;

/// 当前时间 → Unix millis
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// 日期开始 (00:00:00) → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 当天零点 → Unix millis (业务时区)
///
/// 用于 "today" 统计边界 (check_in >= 当天零点)。
pub fn current_day_start_millis(tz: Tz) -> i64 {
    let today = chrono::Utc::now().with_timezone(&tz).date_naive();
    day_start_millis(today, tz)
}

/// 签到/签出时间差 → 小时数
pub fn hours_between(check_in: i64, check_out: i64) -> f64 {
    (check_out - check_in) as f64 / MILLIS_PER_HOUR as f64
}

/// 小时数四舍五入到一位小数
pub fn round_hours(hours: f64) -> f64 {
    (hours * 10.0).round() / 10.0
}

/// 时长 → "Xh Ym" 显示字符串
pub fn format_duration_millis(elapsed: i64) -> String {
    let elapsed = elapsed.max(0);
    let hours = elapsed / MILLIS_PER_HOUR;
    let minutes = (elapsed % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE;
    format!("{}h {}m", hours, minutes)
}

/// 计算下一次提醒触发时间 (Unix millis)
///
/// 返回最小的 `check_in + k * interval` (k >= 1) 使其严格大于 `now`。
pub fn next_interval_boundary(check_in: i64, now: i64, interval: i64) -> i64 {
    debug_assert!(interval > 0);
    let elapsed = (now - check_in).max(0);
    let k = elapsed / interval + 1;
    check_in + k * interval
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hours_rounding_one_decimal() {
        assert_eq!(round_hours(2.04), 2.0);
        assert_eq!(round_hours(2.05), 2.1);
        assert_eq!(round_hours(2.5), 2.5);
        assert_eq!(round_hours(0.0), 0.0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration_millis(2 * MILLIS_PER_HOUR + 30 * MILLIS_PER_MINUTE), "2h 30m");
        assert_eq!(format_duration_millis(59 * MILLIS_PER_MINUTE), "0h 59m");
        assert_eq!(format_duration_millis(0), "0h 0m");
        // Clock skew must never render a negative duration
        assert_eq!(format_duration_millis(-5000), "0h 0m");
    }

    #[test]
    fn test_next_interval_boundary() {
        let two_hours = 2 * MILLIS_PER_HOUR;
        // 30 minutes in: first boundary is check_in + 2h
        assert_eq!(
            next_interval_boundary(0, 30 * MILLIS_PER_MINUTE, two_hours),
            two_hours
        );
        // Exactly on a boundary: next one is strictly later
        assert_eq!(next_interval_boundary(0, two_hours, two_hours), 2 * two_hours);
        // 3h10m in: next boundary is 4h
        assert_eq!(
            next_interval_boundary(0, 3 * MILLIS_PER_HOUR + 10 * MILLIS_PER_MINUTE, two_hours),
            2 * two_hours
        );
    }
}
