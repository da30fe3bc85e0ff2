//! 固定 +05:30 偏移（无夏令时）的时间戳。

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

/// 本地时区相对 UTC 的偏移（秒）。
pub const LOCAL_OFFSET_SECONDS: i64 = 5 * 3600 + 30 * 60;

/// 格式化为 `YYYY-MM-DDTHH:mm:ss+05:30`。
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    let local = at.naive_utc() + TimeDelta::seconds(LOCAL_OFFSET_SECONDS);
    local.format("%Y-%m-%dT%H:%M:%S+05:30").to_string()
}

pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// 取时间戳所在的本地日期；无法解析时返回 None。
pub fn local_date(timestamp: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|at| at.date_naive())
}
