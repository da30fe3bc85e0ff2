//! HTTP 响应辅助函数
//!
//! 错误响应统一为 `{ "error": ..., "details": ... }`：
//! - bad_request_error：400，请求参数错误
//! - not_found_error：404，设备不存在
//! - internal_error：500，附带底层错误信息
//! - query_error：按 QueryError 变体选择状态码

use api_contract::ErrorBody;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use meter_pipeline::QueryError;
use tracing::warn;

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorBody::new(message))).into_response()
}

/// 资源未找到错误响应
pub fn not_found_error(message: impl Into<String>) -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new(message))).into_response()
}

/// 内部错误响应
pub fn internal_error(message: impl Into<String>, details: impl std::fmt::Display) -> Response {
    let message = message.into();
    let details = details.to_string();
    warn!(target: "meter.api", error = %message, details = %details, "request_failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::with_details(message, details)),
    )
        .into_response()
}

/// 查询错误响应；`message` 用作 500 时的错误描述
pub fn query_error(err: QueryError, message: &str) -> Response {
    match err {
        QueryError::DeviceNotFound(_) => not_found_error("Device not found"),
        QueryError::InvalidTariff(err) => bad_request_error(err.to_string()),
        err => internal_error(message, err),
    }
}
