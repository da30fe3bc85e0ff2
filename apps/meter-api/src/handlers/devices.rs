//! 设备查询 handlers
//!
//! - GET /devices - 最新快照中的设备 ID
//! - GET /currentState?device= - 单设备或全部设备的当前状态
//! - GET /pastData?device= - 单设备历史
//!
//! 当前状态来自最近一次成功的轮询；尚未轮询成功时返回 500。

use crate::AppState;
use crate::utils::response::query_error;
use crate::utils::{normalize_optional, normalize_required};
use api_contract::{CurrentStateDto, DeviceQuery, DeviceStateDto};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub async fn list_devices(State(state): State<AppState>) -> Response {
    match state.query.list_device_ids() {
        Ok(ids) => (StatusCode::OK, Json(ids)).into_response(),
        Err(err) => query_error(err, "Failed to fetch device IDs"),
    }
}

pub async fn current_state(
    State(state): State<AppState>,
    Query(query): Query<DeviceQuery>,
) -> Response {
    let Some(device_id) = normalize_optional(query.device) else {
        return match state.query.get_snapshot() {
            Ok(snapshot) => (
                StatusCode::OK,
                Json(CurrentStateDto {
                    device_status: snapshot.statuses.clone(),
                    last_updated_keys: snapshot.last_keys.clone(),
                    time: snapshot.time.clone(),
                    data: snapshot.data.clone(),
                }),
            )
                .into_response(),
            Err(err) => query_error(err, "Failed to fetch current state"),
        };
    };

    match state.query.get_device_state(&device_id) {
        Ok(device) => (
            StatusCode::OK,
            Json(DeviceStateDto {
                device_status: device.is_active,
                last_updated_key: device.last_key,
                time: device.time,
                data: device.record,
            }),
        )
            .into_response(),
        Err(err) => query_error(err, "Failed to fetch current state"),
    }
}

pub async fn past_data(
    State(state): State<AppState>,
    Query(query): Query<DeviceQuery>,
) -> Response {
    let device_id = match normalize_required(query.device, "Missing device parameter") {
        Ok(device_id) => device_id,
        Err(response) => return response,
    };
    let points = state.query.get_device_history(&device_id).await;
    (StatusCode::OK, Json(points)).into_response()
}
