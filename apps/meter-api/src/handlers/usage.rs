//! - GET /api/daily-usage

use crate::AppState;
use api_contract::DailyUsageDto;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub async fn daily_usage(State(state): State<AppState>) -> Response {
    let usage: Vec<DailyUsageDto> = state
        .query
        .daily_usage()
        .await
        .into_iter()
        .map(|day| DailyUsageDto {
            date: day.date.format("%Y-%m-%d").to_string(),
            total_usage: day.total_usage,
        })
        .collect();
    (StatusCode::OK, Json(usage)).into_response()
}
