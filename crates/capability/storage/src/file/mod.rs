//! JSON 文件存储实现模块
//!
//! 生产环境使用，包含以下实现：
//! - HistoryPersistence: JsonFileHistory
//! - TariffStore: JsonFileTariffStore

pub mod history;
pub mod tariff;

pub use history::*;
pub use tariff::*;

use crate::error::StorageError;
use std::path::Path;

/// 先写临时文件再重命名，读者不会看到写了一半的文件。
pub(crate) async fn write_json_file(path: &Path, contents: String) -> Result<(), StorageError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|err| StorageError::io(&tmp, err))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|err| StorageError::io(path, err))
}

/// 读取文件内容；文件不存在时返回 None。
pub(crate) async fn read_optional(path: &Path) -> Result<Option<String>, StorageError> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StorageError::io(path, err)),
    }
}
