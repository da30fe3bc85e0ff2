//! 电表遥测服务：后台轮询远端存储，并通过 HTTP 提供当前状态、历史与电价表。

mod handlers;
mod middleware;
mod routes;
mod utils;

use meter_config::AppConfig;
use meter_ingest::{HttpSnapshotSource, HttpSourceConfig, SnapshotSource};
use meter_normalize::{Normalizer, StorageTariffProvider};
use meter_pipeline::{Poller, PollerConfig, QueryService};
use meter_storage::{HistoryLog, JsonFileHistory, JsonFileTariffStore, TariffStore};
use meter_telemetry::init_tracing;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub query: Arc<QueryService>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    // 电价表：首次启动写入默认表，文件损坏直接退出
    let tariff: Arc<dyn TariffStore> = Arc::new(JsonFileTariffStore::open(&config.tariff_path).await?);
    // 历史日志：文件不存在则创建，内容损坏则从空日志开始
    let history = Arc::new(
        HistoryLog::open(
            Arc::new(JsonFileHistory::new(&config.history_path)),
            config.history_capacity,
        )
        .await?,
    );
    info!(
        target: "meter.history",
        path = %config.history_path.display(),
        entries = history.len().await,
        capacity = history.capacity(),
        "history_loaded"
    );

    let source: Arc<dyn SnapshotSource> = Arc::new(HttpSnapshotSource::new(HttpSourceConfig {
        base_url: config.store_url.clone(),
        auth: config.store_auth.clone(),
        timeout: config.fetch_timeout,
    })?);

    let normalizer = Normalizer::new(Arc::new(StorageTariffProvider::new(tariff.clone())));
    let poller = Poller::new(
        source.clone(),
        normalizer,
        history.clone(),
        PollerConfig {
            interval: config.poll_interval,
            fetch_timeout: config.fetch_timeout,
        },
    );
    let query = Arc::new(QueryService::new(
        source,
        history.clone(),
        tariff,
        poller.subscribe(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller_task = if config.poll_enabled {
        Some(tokio::spawn(poller.run(shutdown_rx)))
    } else {
        warn!(target: "meter.poller", "poller_disabled");
        None
    };

    let app = routes::create_app(AppState { query });
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(target: "meter.api", addr = %config.http_addr, "http_listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 停止轮询（等待当前周期结束）并落盘历史
    let _ = shutdown_tx.send(true);
    if let Some(task) = poller_task {
        if let Err(err) = task.await {
            warn!(target: "meter.poller", error = %err, "poller_join_failed");
        }
    }
    if let Err(err) = history.flush().await {
        warn!(target: "meter.history", error = %err, "history_final_flush_failed");
    }
    info!(target: "meter.api", "shutdown_complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(target: "meter.api", error = %err, "shutdown_signal_failed");
        std::future::pending::<()>().await;
    }
    info!(target: "meter.api", "shutdown_requested");
}
