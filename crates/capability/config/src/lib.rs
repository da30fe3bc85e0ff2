//! 应用运行配置加载。

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub store_url: String,
    pub store_auth: Option<String>,
    pub poll_enabled: bool,
    pub poll_interval: Duration,
    pub fetch_timeout: Duration,
    pub history_capacity: usize,
    pub history_path: PathBuf,
    pub tariff_path: PathBuf,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源读取配置（测试时无需修改进程环境）。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let reader = Reader { lookup };
        let store_url = reader
            .optional("METER_STORE_URL")
            .ok_or_else(|| ConfigError::Missing("METER_STORE_URL".to_string()))?;
        let store_auth = reader.optional("METER_STORE_AUTH");
        let http_addr = reader
            .optional("METER_HTTP_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3020".to_string());
        let poll_enabled = reader.bool_with_default("METER_POLL", true);
        let poll_interval =
            Duration::from_millis(reader.positive_u64_with_default("METER_POLL_INTERVAL_MS", 2000)?);
        let fetch_timeout =
            Duration::from_millis(reader.positive_u64_with_default("METER_FETCH_TIMEOUT_MS", 5000)?);
        let history_capacity =
            reader.positive_u64_with_default("METER_HISTORY_CAPACITY", 1000)? as usize;
        let history_path = reader
            .optional("METER_HISTORY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data.json"));
        let tariff_path = reader
            .optional("METER_TARIFF_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("ceb_data.json"));

        Ok(Self {
            http_addr,
            store_url,
            store_auth,
            poll_enabled,
            poll_interval,
            fetch_timeout,
            history_capacity,
            history_path,
            tariff_path,
        })
    }
}

struct Reader<F> {
    lookup: F,
}

impl<F> Reader<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// 读取非空字符串。
    fn optional(&self, key: &str) -> Option<String> {
        match (self.lookup)(key) {
            Some(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
            _ => None,
        }
    }

    /// 读取大于 0 的 u64，缺省时使用默认值。
    fn positive_u64_with_default(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        let Some(value) = self.optional(key) else {
            return Ok(default);
        };
        match value.parse::<u64>() {
            Ok(parsed) if parsed > 0 => Ok(parsed),
            _ => Err(ConfigError::Invalid(key.to_string(), value)),
        }
    }

    fn bool_with_default(&self, key: &str, default: bool) -> bool {
        match self.optional(key) {
            Some(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
            None => default,
        }
    }
}
