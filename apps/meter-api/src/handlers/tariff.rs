//! 电价表 handlers
//!
//! - GET /cebData - 当前电价表
//! - POST /cebData - 替换固定费用与单价（档位范围不可修改）

use crate::AppState;
use crate::utils::require_values;
use crate::utils::response::{bad_request_error, query_error};
use api_contract::{UpdateTariffRequest, UpdateTariffResponse};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub async fn get_tariff(State(state): State<AppState>) -> Response {
    match state.query.get_rate_table().await {
        Ok(table) => (StatusCode::OK, Json(table)).into_response(),
        Err(err) => query_error(err, "Failed to read tariff data"),
    }
}

pub async fn update_tariff(
    State(state): State<AppState>,
    body: Result<Json<UpdateTariffRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_request_error(rejection.body_text()),
    };
    let monthly_cost = match require_values(req.monthly_cost, "monthlyCost") {
        Ok(values) => values,
        Err(response) => return response,
    };
    let unit_price = match require_values(req.unit_price, "unitPrice") {
        Ok(values) => values,
        Err(response) => return response,
    };

    match state
        .query
        .update_rate_table(monthly_cost, unit_price)
        .await
    {
        Ok(table) => (
            StatusCode::OK,
            Json(UpdateTariffResponse {
                message: "CEB data updated successfully".to_string(),
                ceb_data: table,
            }),
        )
            .into_response(),
        Err(err) => query_error(err, "Failed to update tariff data"),
    }
}
