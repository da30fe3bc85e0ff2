//! 轮询指标快照。
//!
//! - GET /metrics

use api_contract::MetricsSnapshotDto;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use meter_telemetry::metrics;

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(MetricsSnapshotDto {
            poll_success: snapshot.poll_success,
            poll_failure: snapshot.poll_failure,
            poll_timeout: snapshot.poll_timeout,
            normalized_records: snapshot.normalized_records,
            passed_through_entries: snapshot.passed_through_entries,
            history_appends: snapshot.history_appends,
            history_flush_failure: snapshot.history_flush_failure,
            poll_latency_ms_total: snapshot.poll_latency_ms_total,
            poll_latency_ms_count: snapshot.poll_latency_ms_count,
        }),
    )
        .into_response()
}
