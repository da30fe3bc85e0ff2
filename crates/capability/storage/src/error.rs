//! 存储层错误类型
//!
//! 区分三类失败：
//! - 文件 I/O 错误（启动时不可恢复）
//! - 持久化内容损坏（历史日志可重置为空）
//! - 数据校验失败（电价表配置错误）

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt data: {0}")]
    Corrupt(String),
    #[error("invalid data: {0}")]
    Invalid(String),
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("{0}")]
    Backend(String),
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<domain::TariffError> for StorageError {
    fn from(err: domain::TariffError) -> Self {
        Self::Invalid(err.to_string())
    }
}
