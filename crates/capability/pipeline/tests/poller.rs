use async_trait::async_trait;
use domain::{RateTable, SequenceKey};
use meter_ingest::{InMemorySource, IngestError, SnapshotSource};
use meter_normalize::{Normalizer, StorageTariffProvider};
use meter_pipeline::{PollError, Poller, PollerConfig, QueryError, QueryService};
use meter_storage::{HistoryLog, InMemoryHistoryPersistence, InMemoryTariffStore, TariffStore};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn rate_table() -> RateTable {
    RateTable {
        ranges: vec!["0-60".to_string(), "61-120".to_string()],
        monthly_cost: vec![5.0, 10.0],
        unit_price: vec![2.0, 3.0],
    }
}

/// 可切换为失败或挂起的数据源。
#[derive(Default)]
struct FlakySource {
    inner: InMemorySource,
    failing: AtomicBool,
    hanging: AtomicBool,
}

#[async_trait]
impl SnapshotSource for FlakySource {
    async fn fetch_raw(&self) -> Result<Value, IngestError> {
        if self.hanging.load(Ordering::Relaxed) {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        if self.failing.load(Ordering::Relaxed) {
            return Err(IngestError::Source("store unavailable".to_string()));
        }
        self.inner.fetch_raw().await
    }

    async fn write_value(&self, path: &str, value: Value) -> Result<(), IngestError> {
        self.inner.write_value(path, value).await
    }
}

struct Harness {
    source: Arc<FlakySource>,
    persistence: Arc<InMemoryHistoryPersistence>,
    tariff: Arc<InMemoryTariffStore>,
    poller: Poller,
    query: QueryService,
}

async fn harness(capacity: usize) -> Harness {
    let source = Arc::new(FlakySource::default());
    let persistence = Arc::new(InMemoryHistoryPersistence::new());
    let tariff = Arc::new(InMemoryTariffStore::new(rate_table()));
    let history = Arc::new(
        HistoryLog::open(persistence.clone(), capacity)
            .await
            .expect("history"),
    );
    let normalizer = Normalizer::new(Arc::new(StorageTariffProvider::new(tariff.clone())));
    let poller = Poller::new(
        source.clone(),
        normalizer,
        history.clone(),
        PollerConfig {
            interval: Duration::from_millis(10),
            fetch_timeout: Duration::from_millis(50),
        },
    );
    let query = QueryService::new(source.clone(), history, tariff.clone(), poller.subscribe());
    Harness {
        source,
        persistence,
        tariff,
        poller,
        query,
    }
}

async fn write_device(source: &FlakySource, device: &str, key: i64, total_power: f64) {
    source
        .write_value(
            device,
            json!({
                "device": device,
                "key": key,
                "battery": 77,
                "current": 1.5,
                "livepower": 20,
                "totalpower": total_power,
                "voltage": 231
            }),
        )
        .await
        .expect("write");
}

#[tokio::test]
async fn key_sequence_drives_activity() {
    let h = harness(10).await;
    let mut observed = Vec::new();
    for key in [10, 10, 25, 25, 40] {
        write_device(&h.source, "A", key, 50.0).await;
        h.poller.poll_once().await.expect("poll");
        observed.push(h.query.get_device_state("A").expect("state").is_active);
    }
    assert_eq!(observed, vec![false, false, true, false, true]);

    let history: Vec<bool> = h
        .query
        .get_device_history("A")
        .await
        .into_iter()
        .map(|point| point.status)
        .collect();
    assert_eq!(history, vec![false, false, true, false, true]);
}

#[tokio::test]
async fn snapshot_is_not_ready_before_first_poll() {
    let h = harness(10).await;
    assert!(matches!(h.query.get_snapshot(), Err(QueryError::NotReady)));
    assert!(matches!(h.query.list_device_ids(), Err(QueryError::NotReady)));
}

#[tokio::test]
async fn poll_publishes_cost_and_opaque_entries() {
    let h = harness(10).await;
    write_device(&h.source, "001", 1, 90.0).await;
    h.source
        .write_value("notice", json!("maintenance"))
        .await
        .expect("write");

    let outcome = h.poller.poll_once().await.expect("poll");
    assert_eq!(outcome.records, 1);
    assert_eq!(outcome.passed_through, 1);
    assert!(outcome.persisted);

    let snapshot = h.query.get_snapshot().expect("snapshot");
    let record = snapshot.record_for("001").expect("record");
    assert_eq!(record.calculated_cost, 280.0);
    assert_eq!(snapshot.statuses.get("001"), Some(&false));
    assert_eq!(snapshot.last_keys.get("001"), Some(&SequenceKey::from(1)));
    assert_eq!(h.query.list_device_ids().expect("ids"), vec!["001"]);
    assert_eq!(h.persistence.save_count(), 2);
}

#[tokio::test]
async fn unknown_device_is_not_found() {
    let h = harness(10).await;
    write_device(&h.source, "001", 1, 10.0).await;
    h.poller.poll_once().await.expect("poll");

    let err = h.query.get_device_state("999").expect_err("missing");
    assert!(matches!(err, QueryError::DeviceNotFound(id) if id == "999"));
}

#[tokio::test]
async fn failed_cycle_keeps_previous_snapshot() {
    let h = harness(10).await;
    write_device(&h.source, "001", 1, 10.0).await;
    let first = h.poller.poll_once().await.expect("poll");

    h.source.failing.store(true, Ordering::Relaxed);
    let err = h.poller.poll_once().await.expect_err("source down");
    assert!(matches!(err, PollError::Source(_)));

    let snapshot = h.query.get_snapshot().expect("snapshot");
    assert_eq!(snapshot.time, first.time);
    assert_eq!(h.query.get_device_history("001").await.len(), 1);

    h.source.failing.store(false, Ordering::Relaxed);
    write_device(&h.source, "001", 2, 11.0).await;
    h.poller.poll_once().await.expect("recovered");
    assert!(h.query.get_device_state("001").expect("state").is_active);
}

#[tokio::test]
async fn hanging_fetch_times_out() {
    let h = harness(10).await;
    h.source.hanging.store(true, Ordering::Relaxed);
    let err = h.poller.poll_once().await.expect_err("timeout");
    assert!(matches!(err, PollError::Timeout(50)));
    assert!(h.query.get_device_history("001").await.is_empty());
}

#[tokio::test]
async fn invalid_tariff_fails_cycle_without_touching_activity() {
    let h = harness(10).await;
    write_device(&h.source, "001", 1, 10.0).await;
    h.poller.poll_once().await.expect("poll");

    let broken = Arc::new(InMemoryTariffStore::new(RateTable {
        ranges: vec!["cheap".to_string()],
        monthly_cost: vec![1.0],
        unit_price: vec![1.0],
    }));
    let history = Arc::new(
        HistoryLog::open(Arc::new(InMemoryHistoryPersistence::new()), 10)
            .await
            .expect("history"),
    );
    let poller = Poller::new(
        h.source.clone(),
        Normalizer::new(Arc::new(StorageTariffProvider::new(broken))),
        history,
        PollerConfig::default(),
    );
    let err = poller.poll_once().await.expect_err("invalid tariff");
    assert!(matches!(err, PollError::Normalize(_)));
    assert!(poller.subscribe().borrow().is_none());
}

#[tokio::test]
async fn flush_failure_still_publishes_and_records() {
    let h = harness(10).await;
    h.persistence.set_fail_saves(true);
    write_device(&h.source, "001", 1, 10.0).await;

    let outcome = h.poller.poll_once().await.expect("poll");
    assert!(!outcome.persisted);
    assert_eq!(h.query.get_device_history("001").await.len(), 1);
    assert!(h.query.get_snapshot().is_ok());
}

#[tokio::test]
async fn history_is_bounded_by_capacity() {
    let h = harness(3).await;
    for key in 1..=5 {
        write_device(&h.source, "001", key, key as f64).await;
        h.poller.poll_once().await.expect("poll");
    }
    let totals: Vec<f64> = h
        .query
        .get_device_history("001")
        .await
        .into_iter()
        .filter_map(|point| point.record.reading.total_power)
        .collect();
    assert_eq!(totals, vec![3.0, 4.0, 5.0]);
}

#[tokio::test]
async fn rate_table_update_round_trips() {
    let h = harness(10).await;
    let updated = h
        .query
        .update_rate_table(vec![7.0, 12.0], vec![2.5, 3.5])
        .await
        .expect("update");
    assert_eq!(updated.ranges, rate_table().ranges);

    let read_back = h.query.get_rate_table().await.expect("read");
    assert_eq!(read_back.monthly_cost, vec![7.0, 12.0]);
    assert_eq!(read_back.unit_price, vec![2.5, 3.5]);
    assert_eq!(read_back.ranges, rate_table().ranges);
}

#[tokio::test]
async fn rate_table_update_rejects_wrong_length() {
    let h = harness(10).await;
    let err = h
        .query
        .update_rate_table(vec![7.0], vec![2.5, 3.5])
        .await
        .expect_err("length");
    assert!(matches!(err, QueryError::InvalidTariff(_)));
    assert_eq!(h.tariff.load().await.expect("load"), rate_table());
}

#[tokio::test]
async fn new_tariff_applies_on_next_cycle() {
    let h = harness(10).await;
    write_device(&h.source, "001", 1, 50.0).await;
    h.poller.poll_once().await.expect("poll");
    assert_eq!(
        h.query.get_device_state("001").expect("state").record.calculated_cost,
        105.0
    );

    h.query
        .update_rate_table(vec![0.0, 0.0], vec![1.0, 1.0])
        .await
        .expect("update");
    h.poller.poll_once().await.expect("poll");
    assert_eq!(
        h.query.get_device_state("001").expect("state").record.calculated_cost,
        50.0
    );
}

#[tokio::test]
async fn run_polls_until_shutdown() {
    let h = harness(10).await;
    write_device(&h.source, "001", 1, 10.0).await;
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let mut live = h.poller.subscribe();

    let task = tokio::spawn(h.poller.clone().run(shutdown_rx));
    live.changed().await.expect("first cycle");
    shutdown_tx.send(true).expect("shutdown");
    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("stopped")
        .expect("join");

    assert!(!h.query.get_device_history("001").await.is_empty());
}

#[tokio::test]
async fn raw_snapshot_passes_store_root_through() {
    let h = harness(10).await;
    h.source
        .write_value("banner", json!({"text": "hi"}))
        .await
        .expect("write");
    let raw = h.query.raw_snapshot().await.expect("raw");
    assert_eq!(raw, json!({"banner": {"text": "hi"}}));
}
