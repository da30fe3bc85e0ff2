//! 稳定的 DTO 与 API 响应契约。
//!
//! 仪表盘直接读取裸 JSON（数组 / 对象），因此成功响应不做统一封装，
//! 失败响应统一为 `{ "error": ..., "details": ... }`。

use domain::{NormalizedRecord, NormalizedSnapshot, RateTable, SequenceKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 失败响应体。
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// 当前状态查询参数。
#[derive(Debug, Deserialize)]
pub struct DeviceQuery {
    pub device: Option<String>,
}

/// 单设备当前状态。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStateDto {
    pub device_status: bool,
    pub last_updated_key: Option<SequenceKey>,
    pub time: String,
    pub data: NormalizedRecord,
}

/// 全部设备当前状态。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentStateDto {
    pub device_status: BTreeMap<String, bool>,
    pub last_updated_keys: BTreeMap<String, SequenceKey>,
    pub time: String,
    pub data: NormalizedSnapshot,
}

/// 电价表更新请求体；缺失字段由 handler 返回 400。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTariffRequest {
    pub monthly_cost: Option<Vec<f64>>,
    pub unit_price: Option<Vec<f64>>,
}

/// 电价表更新响应体。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTariffResponse {
    pub message: String,
    pub ceb_data: RateTable,
}

/// 每日用电量。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUsageDto {
    pub date: String,
    pub total_usage: f64,
}

/// 轮询指标快照。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
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
