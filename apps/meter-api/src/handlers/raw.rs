//! - GET /raw：远端存储根节点原样返回

use crate::AppState;
use crate::utils::response::query_error;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub async fn raw_snapshot(State(state): State<AppState>) -> Response {
    match state.query.raw_snapshot().await {
        Ok(root) => (StatusCode::OK, Json(root)).into_response(),
        Err(err) => query_error(err, "Failed to fetch data from store"),
    }
}
