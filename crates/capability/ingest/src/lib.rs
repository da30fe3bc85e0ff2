//! 远端键值存储接入：拉取根节点快照、写入单个值。

use async_trait::async_trait;
use domain::{DecodeError, Snapshot};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// 采集错误。
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("invalid store url: {0}")]
    InvalidUrl(String),
    #[error("source error: {0}")]
    Source(String),
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl From<reqwest::Error> for IngestError {
    fn from(err: reqwest::Error) -> Self {
        Self::Source(err.to_string())
    }
}

/// 远端数据源抽象。
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// 拉取当前完整快照。
    async fn fetch_raw(&self) -> Result<Value, IngestError>;

    /// 写入单个路径的值。
    async fn write_value(&self, path: &str, value: Value) -> Result<(), IngestError>;

    /// 拉取并在边界处解码为快照。
    async fn fetch_snapshot(&self) -> Result<Snapshot, IngestError> {
        let root = self.fetch_raw().await?;
        Ok(Snapshot::from_root(root)?)
    }
}

/// HTTP 数据源配置。
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    pub base_url: String,
    pub auth: Option<String>,
    pub timeout: Duration,
}

/// 基于 REST 的实时数据库数据源：`GET {base}/.json`、`PUT {base}/{path}.json`。
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    client: reqwest::Client,
    base_url: reqwest::Url,
    auth: Option<String>,
}

impl HttpSnapshotSource {
    pub fn new(config: HttpSourceConfig) -> Result<Self, IngestError> {
        let base = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url =
            reqwest::Url::parse(&base).map_err(|err| IngestError::InvalidUrl(err.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url,
            auth: config.auth,
        })
    }

    /// 拼接 `{base}/{path}.json`，根节点对应 `{base}/.json`。
    pub fn resource_url(&self, path: &str) -> Result<reqwest::Url, IngestError> {
        let path = path.trim_matches('/');
        let mut url = self
            .base_url
            .join(&format!("{path}.json"))
            .map_err(|err| IngestError::InvalidUrl(err.to_string()))?;
        if let Some(auth) = self.auth.as_deref() {
            url.query_pairs_mut().append_pair("auth", auth);
        }
        Ok(url)
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch_raw(&self) -> Result<Value, IngestError> {
        let url = self.resource_url("")?;
        debug!(target: "meter.ingest", "store_fetch");
        let value = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(value)
    }

    async fn write_value(&self, path: &str, value: Value) -> Result<(), IngestError> {
        if path.trim_matches('/').is_empty() {
            return Err(IngestError::Source("refusing to overwrite store root".to_string()));
        }
        let url = self.resource_url(path)?;
        self.client
            .put(url)
            .json(&value)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// 内存数据源（用于接线与测试）。
#[derive(Debug, Default)]
pub struct InMemorySource {
    root: RwLock<serde_json::Map<String, Value>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotSource for InMemorySource {
    async fn fetch_raw(&self) -> Result<Value, IngestError> {
        let root = self.root.read().await;
        if root.is_empty() {
            return Ok(Value::Null);
        }
        Ok(Value::Object(root.clone()))
    }

    async fn write_value(&self, path: &str, value: Value) -> Result<(), IngestError> {
        let key = path.trim_matches('/');
        if key.is_empty() || key.contains('/') {
            return Err(IngestError::Source(format!("unsupported path: {path}")));
        }
        let mut root = self.root.write().await;
        if value.is_null() {
            root.remove(key);
        } else {
            root.insert(key.to_string(), value);
        }
        Ok(())
    }
}
