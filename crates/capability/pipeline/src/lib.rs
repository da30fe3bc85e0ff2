//! 轮询流水线：拉取快照 → 标准化 → 发布当前快照 → 追加历史日志。
//!
//! 所有对活跃状态与历史日志的写入都发生在同一个轮询任务上；
//! 读路径通过 `watch` 通道拿到整份快照的引用，不会看到写了一半的状态。

pub mod query;
pub mod usage;

pub use query::{DeviceState, QueryError, QueryService};
pub use usage::{DailyUsage, daily_usage};

use domain::{HistoryEntry, NormalizedRecord, NormalizedSnapshot, SequenceKey};
use meter_ingest::{IngestError, SnapshotSource};
use meter_normalize::{ActivityState, NormalizeError, Normalizer};
use meter_storage::HistoryLog;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, watch};
use tracing::{info, warn};

/// 轮询周期错误；任何错误都只影响当前周期。
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("source error: {0}")]
    Source(#[from] IngestError),
    #[error("fetch timed out after {0}ms")]
    Timeout(u64),
    #[error("normalize error: {0}")]
    Normalize(#[from] NormalizeError),
}

/// 轮询参数。
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// 上一周期结束到下一周期开始的间隔（fixed-delay）
    pub interval: Duration,
    /// 单次拉取的超时
    pub fetch_timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            fetch_timeout: Duration::from_secs(5),
        }
    }
}

impl PollerConfig {
    fn sanitized(mut self) -> Self {
        if self.interval.is_zero() {
            self.interval = Duration::from_millis(1);
        }
        if self.fetch_timeout.is_zero() {
            self.fetch_timeout = Duration::from_millis(1);
        }
        self
    }
}

/// 最近一次成功轮询的结果。
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSnapshot {
    pub time: String,
    /// 所有见过的设备的活跃状态
    pub statuses: BTreeMap<String, bool>,
    /// 所有见过的设备的上次序列键
    pub last_keys: BTreeMap<String, SequenceKey>,
    pub data: NormalizedSnapshot,
}

impl LiveSnapshot {
    /// 按读数中的 `device` 字段查找设备记录。
    pub fn record_for(&self, device_id: &str) -> Option<&NormalizedRecord> {
        self.data
            .values()
            .filter_map(|entry| entry.record())
            .find(|record| record.reading.device_id == device_id)
    }
}

/// 当前快照的发布通道：`None` 表示尚未有成功的轮询。
pub type LiveReceiver = watch::Receiver<Option<Arc<LiveSnapshot>>>;

/// 单个周期的结果摘要。
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    pub time: String,
    pub records: usize,
    pub passed_through: usize,
    pub persisted: bool,
}

struct PollerInner {
    source: Arc<dyn SnapshotSource>,
    normalizer: Normalizer,
    history: Arc<HistoryLog>,
    activity: Mutex<ActivityState>,
    live: watch::Sender<Option<Arc<LiveSnapshot>>>,
    config: PollerConfig,
}

/// 轮询器。
#[derive(Clone)]
pub struct Poller {
    inner: Arc<PollerInner>,
}

impl Poller {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        normalizer: Normalizer,
        history: Arc<HistoryLog>,
        config: PollerConfig,
    ) -> Self {
        let (live, _) = watch::channel(None);
        let inner = PollerInner {
            source,
            normalizer,
            history,
            activity: Mutex::new(ActivityState::new()),
            live,
            config: config.sanitized(),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// 订阅当前快照。
    pub fn subscribe(&self) -> LiveReceiver {
        self.inner.live.subscribe()
    }

    pub fn history(&self) -> Arc<HistoryLog> {
        self.inner.history.clone()
    }

    /// 执行一个完整周期。
    ///
    /// 拉取或标准化失败时不发布新快照、不写历史，调用方继续提供旧数据。
    /// 历史落盘失败只记录日志，不算周期失败。
    pub async fn poll_once(&self) -> Result<PollOutcome, PollError> {
        let started = Instant::now();
        let result = self.run_cycle().await;
        meter_telemetry::record_poll_latency_ms(started.elapsed().as_millis() as u64);
        match &result {
            Ok(_) => meter_telemetry::record_poll_success(),
            Err(PollError::Timeout(_)) => meter_telemetry::record_poll_timeout(),
            Err(_) => meter_telemetry::record_poll_failure(),
        }
        result
    }

    async fn run_cycle(&self) -> Result<PollOutcome, PollError> {
        let inner = &self.inner;
        let timeout = inner.config.fetch_timeout;
        let snapshot = tokio::time::timeout(timeout, inner.source.fetch_snapshot())
            .await
            .map_err(|_| PollError::Timeout(timeout.as_millis() as u64))??;

        let (data, statuses, last_keys) = {
            let mut activity = inner.activity.lock().await;
            let data = inner.normalizer.normalize(snapshot, &mut activity).await?;
            (data, activity.statuses(), activity.last_keys())
        };

        let records = data.values().filter(|entry| entry.record().is_some()).count();
        let passed_through = data.len() - records;
        meter_telemetry::record_normalized(records as u64, passed_through as u64);

        let time = domain::now_timestamp();
        inner.live.send_replace(Some(Arc::new(LiveSnapshot {
            time: time.clone(),
            statuses,
            last_keys,
            data: data.clone(),
        })));

        let persisted = match inner
            .history
            .append(HistoryEntry::new(time.clone(), data))
            .await
        {
            Ok(()) => true,
            Err(err) => {
                meter_telemetry::record_history_flush_failure();
                warn!(target: "meter.history", error = %err, "history_flush_failed");
                false
            }
        };
        meter_telemetry::record_history_append();

        Ok(PollOutcome {
            time,
            records,
            passed_through,
            persisted,
        })
    }

    /// 运行轮询循环：立即执行第一个周期，之后每个周期结束后等待 `interval`。
    /// 收到停机信号后在当前周期结束时退出。
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let interval = self.inner.config.interval;
        info!(
            target: "meter.poller",
            interval_ms = interval.as_millis() as u64,
            "poller_started"
        );
        loop {
            if *shutdown.borrow() {
                break;
            }
            match self.poll_once().await {
                Ok(outcome) => info!(
                    target: "meter.poller",
                    time = %outcome.time,
                    records = outcome.records,
                    passed_through = outcome.passed_through,
                    persisted = outcome.persisted,
                    "poll_cycle_completed"
                ),
                Err(err) => warn!(target: "meter.poller", error = %err, "poll_cycle_failed"),
            }
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!(target: "meter.poller", "poller_stopped");
    }
}
