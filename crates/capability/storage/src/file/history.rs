//! 历史日志 JSON 文件实现
//!
//! 文件内容为 HistoryEntry 的 JSON 数组（两空格缩进）。

use super::{read_optional, write_json_file};
use crate::error::StorageError;
use crate::traits::HistoryPersistence;
use domain::HistoryEntry;
use std::path::{Path, PathBuf};

pub struct JsonFileHistory {
    path: PathBuf,
}

impl JsonFileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl HistoryPersistence for JsonFileHistory {
    async fn load(&self) -> Result<Option<Vec<HistoryEntry>>, StorageError> {
        let Some(raw) = read_optional(&self.path).await? else {
            return Ok(None);
        };
        let entries = serde_json::from_str::<Vec<HistoryEntry>>(&raw)
            .map_err(|err| StorageError::Corrupt(format!("{}: {err}", self.path.display())))?;
        Ok(Some(entries))
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(entries)?;
        write_json_file(&self.path, contents).await
    }
}
