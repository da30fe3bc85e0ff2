//! 查询服务：HTTP 层所有读写请求的入口。
//!
//! 当前快照来自轮询器的 `watch` 通道；历史、电价表直接读存储层。

use crate::usage::{DailyUsage, daily_usage};
use crate::{LiveReceiver, LiveSnapshot};
use domain::{DeviceHistoryPoint, NormalizedRecord, RateTable, SequenceKey};
use meter_ingest::{IngestError, SnapshotSource};
use meter_storage::{HistoryLog, StorageError, TariffStore};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

/// 查询错误。
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("no successful poll yet")]
    NotReady,
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("invalid tariff: {0}")]
    InvalidTariff(#[from] domain::TariffError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("source error: {0}")]
    Source(#[from] IngestError),
}

/// 单设备当前状态。
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    pub is_active: bool,
    pub last_key: Option<SequenceKey>,
    pub time: String,
    pub record: NormalizedRecord,
}

#[derive(Clone)]
pub struct QueryService {
    source: Arc<dyn SnapshotSource>,
    history: Arc<HistoryLog>,
    tariff: Arc<dyn TariffStore>,
    live: LiveReceiver,
}

impl QueryService {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        history: Arc<HistoryLog>,
        tariff: Arc<dyn TariffStore>,
        live: LiveReceiver,
    ) -> Self {
        Self {
            source,
            history,
            tariff,
            live,
        }
    }

    /// 最近一次成功轮询的完整快照。
    pub fn get_snapshot(&self) -> Result<Arc<LiveSnapshot>, QueryError> {
        self.live.borrow().clone().ok_or(QueryError::NotReady)
    }

    pub fn get_device_state(&self, device_id: &str) -> Result<DeviceState, QueryError> {
        let snapshot = self.get_snapshot()?;
        let record = snapshot
            .record_for(device_id)
            .ok_or_else(|| QueryError::DeviceNotFound(device_id.to_string()))?;
        Ok(DeviceState {
            is_active: record.is_active,
            last_key: snapshot.last_keys.get(device_id).cloned(),
            time: snapshot.time.clone(),
            record: record.clone(),
        })
    }

    /// 最新快照中的设备 ID（去重、有序）。
    pub fn list_device_ids(&self) -> Result<Vec<String>, QueryError> {
        let snapshot = self.get_snapshot()?;
        let ids: BTreeSet<String> = snapshot
            .data
            .values()
            .filter_map(|entry| entry.record())
            .map(|record| record.reading.device_id.clone())
            .collect();
        Ok(ids.into_iter().collect())
    }

    pub async fn get_device_history(&self, device_id: &str) -> Vec<DeviceHistoryPoint> {
        self.history.query_device(device_id).await
    }

    pub async fn get_rate_table(&self) -> Result<RateTable, QueryError> {
        Ok(self.tariff.load().await?)
    }

    /// 替换固定费用与单价；校验失败时电价表保持不变。
    pub async fn update_rate_table(
        &self,
        monthly_cost: Vec<f64>,
        unit_price: Vec<f64>,
    ) -> Result<RateTable, QueryError> {
        let current = self.tariff.load().await?;
        let updated = current.with_prices(monthly_cost, unit_price)?;
        self.tariff.save(&updated).await?;
        info!(
            target: "meter.tariff",
            tiers = updated.ranges.len(),
            "tariff_updated"
        );
        Ok(updated)
    }

    pub async fn daily_usage(&self) -> Vec<DailyUsage> {
        daily_usage(&self.history.entries().await)
    }

    /// 直接读取远端存储根节点，不经过标准化。
    pub async fn raw_snapshot(&self) -> Result<Value, QueryError> {
        Ok(self.source.fetch_raw().await?)
    }
}
