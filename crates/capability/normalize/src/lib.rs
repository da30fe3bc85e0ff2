//! 快照标准化：为每条设备读数附加活跃状态与阶梯电费。

pub mod activity;
pub mod cost;

pub use activity::ActivityState;
pub use cost::{calculate_cost, round_cost};

use async_trait::async_trait;
use domain::{
    DeviceReading, NormalizedEntry, NormalizedRecord, NormalizedSnapshot, Snapshot, StoreEntry,
    Tier,
};
use meter_storage::TariffStore;
use std::sync::Arc;

/// 派生字段名，原始读数中的同名字段会被覆盖。
const DERIVED_FIELDS: [&str; 2] = ["deviceStatus", "calculatedCost"];

/// 规范化错误。
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("tariff provider error: {0}")]
    TariffProvider(String),
    #[error("invalid tariff: {0}")]
    InvalidTariff(#[from] domain::TariffError),
}

/// 电价档位提供者抽象。
#[async_trait]
pub trait TariffProvider: Send + Sync {
    /// 每次计算前读取最新档位。
    async fn current_tiers(&self) -> Result<Vec<Tier>, NormalizeError>;
}

/// 快照 -> 标准化快照。
#[derive(Clone)]
pub struct Normalizer {
    provider: Arc<dyn TariffProvider>,
}

impl Normalizer {
    pub fn new(provider: Arc<dyn TariffProvider>) -> Self {
        Self { provider }
    }

    /// 先读取电价，成功后才更新活跃状态，避免失败周期污染状态。
    pub async fn normalize(
        &self,
        snapshot: Snapshot,
        state: &mut ActivityState,
    ) -> Result<NormalizedSnapshot, NormalizeError> {
        let tiers = self.provider.current_tiers().await?;
        Ok(normalize_snapshot(snapshot, &tiers, state))
    }
}

/// 标准化整份快照；非设备条目原样透传。
pub fn normalize_snapshot(
    snapshot: Snapshot,
    tiers: &[Tier],
    state: &mut ActivityState,
) -> NormalizedSnapshot {
    snapshot
        .entries
        .into_iter()
        .map(|(key, entry)| {
            let normalized = match entry {
                StoreEntry::Reading(reading) => {
                    NormalizedEntry::Record(normalize_reading(reading, tiers, state))
                }
                StoreEntry::Opaque(raw) => NormalizedEntry::Opaque(raw),
            };
            (key, normalized)
        })
        .collect()
}

/// 标准化单条读数；缺少 `totalpower` 时按 0 用量计费。
pub fn normalize_reading(
    mut reading: DeviceReading,
    tiers: &[Tier],
    state: &mut ActivityState,
) -> NormalizedRecord {
    for field in DERIVED_FIELDS {
        reading.extra.remove(field);
    }
    let is_active = state.update(&reading.device_id, reading.sequence_key.as_ref());
    let calculated_cost = calculate_cost(reading.total_power.unwrap_or(0.0), tiers);
    NormalizedRecord {
        reading,
        is_active,
        calculated_cost,
    }
}

/// 基于 storage 的电价提供者（每次读取最新电价表）。
#[derive(Clone)]
pub struct StorageTariffProvider {
    store: Arc<dyn TariffStore>,
}

impl StorageTariffProvider {
    pub fn new(store: Arc<dyn TariffStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TariffProvider for StorageTariffProvider {
    async fn current_tiers(&self) -> Result<Vec<Tier>, NormalizeError> {
        let table = self
            .store
            .load()
            .await
            .map_err(|err| NormalizeError::TariffProvider(err.to_string()))?;
        Ok(table.tiers()?)
    }
}
