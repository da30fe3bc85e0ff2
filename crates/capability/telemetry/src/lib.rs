//! 追踪、请求 ID 生成与轮询指标。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub poll_success: u64,
    pub poll_failure: u64,
    pub poll_timeout: u64,
    pub normalized_records: u64,
    pub passed_through_entries: u64,
    pub history_appends: u64,
    pub history_flush_failure: u64,
    pub poll_latency_ms_total: u64,
    pub poll_latency_ms_count: u64,
}

/// 进程级轮询指标。
#[derive(Default)]
pub struct TelemetryMetrics {
    poll_success: AtomicU64,
    poll_failure: AtomicU64,
    poll_timeout: AtomicU64,
    normalized_records: AtomicU64,
    passed_through_entries: AtomicU64,
    history_appends: AtomicU64,
    history_flush_failure: AtomicU64,
    poll_latency_ms_total: AtomicU64,
    poll_latency_ms_count: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            poll_success: self.poll_success.load(Ordering::Relaxed),
            poll_failure: self.poll_failure.load(Ordering::Relaxed),
            poll_timeout: self.poll_timeout.load(Ordering::Relaxed),
            normalized_records: self.normalized_records.load(Ordering::Relaxed),
            passed_through_entries: self.passed_through_entries.load(Ordering::Relaxed),
            history_appends: self.history_appends.load(Ordering::Relaxed),
            history_flush_failure: self.history_flush_failure.load(Ordering::Relaxed),
            poll_latency_ms_total: self.poll_latency_ms_total.load(Ordering::Relaxed),
            poll_latency_ms_count: self.poll_latency_ms_count.load(Ordering::Relaxed),
        }
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录轮询周期成功次数。
pub fn record_poll_success() {
    metrics().poll_success.fetch_add(1, Ordering::Relaxed);
}

/// 记录轮询周期失败次数（含超时）。
pub fn record_poll_failure() {
    metrics().poll_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录远端拉取超时次数。
pub fn record_poll_timeout() {
    metrics().poll_timeout.fetch_add(1, Ordering::Relaxed);
}

/// 记录标准化设备记录数与透传条目数。
pub fn record_normalized(records: u64, passed_through: u64) {
    let metrics = metrics();
    metrics
        .normalized_records
        .fetch_add(records, Ordering::Relaxed);
    metrics
        .passed_through_entries
        .fetch_add(passed_through, Ordering::Relaxed);
}

/// 记录历史日志追加次数。
pub fn record_history_append() {
    metrics().history_appends.fetch_add(1, Ordering::Relaxed);
}

/// 记录历史日志落盘失败次数。
pub fn record_history_flush_failure() {
    metrics()
        .history_flush_failure
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录单次轮询耗时（毫秒）。
pub fn record_poll_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .poll_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .poll_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}
