//! 路由定义
//!
//! 集中管理所有 API 路由，将路径映射到对应的 handlers：
//! - 健康检查：/health
//! - 设备查询：/devices, /currentState, /pastData
//! - 电价表：/cebData
//! - 用电统计：/api/daily-usage
//! - 原始数据：/raw
//! - 指标：/metrics

use super::AppState;
use super::handlers::*;
use crate::middleware::request_context;
use axum::{Router, middleware, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// 创建 API 路由
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/devices", get(list_devices))
        .route("/currentState", get(current_state))
        .route("/pastData", get(past_data))
        .route("/cebData", get(get_tariff).post(update_tariff))
        .route("/api/daily-usage", get(daily_usage))
        .route("/raw", get(raw_snapshot))
        .route("/metrics", get(get_metrics))
}

/// 创建完整应用：路由 + 状态 + 中间件
pub fn create_app(state: AppState) -> Router {
    create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        // 注入 request_id/trace_id
        .layer(middleware::from_fn(request_context))
}
