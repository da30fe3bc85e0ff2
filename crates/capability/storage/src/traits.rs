//! 存储接口 Trait 定义
//!
//! - HistoryPersistence：历史日志的整体读写
//! - TariffStore：电价表的读取与替换
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use async_trait::async_trait;
use domain::{HistoryEntry, RateTable};

/// 历史日志持久化接口
///
/// 每次都整体读写完整日志。
#[async_trait]
pub trait HistoryPersistence: Send + Sync {
    /// 读取完整日志；尚未创建时返回 None
    async fn load(&self) -> Result<Option<Vec<HistoryEntry>>, StorageError>;

    /// 覆盖写入完整日志
    async fn save(&self, entries: &[HistoryEntry]) -> Result<(), StorageError>;
}

/// 电价表存储接口
///
/// 电价表是计费的唯一依据，每次计费前都重新读取。
#[async_trait]
pub trait TariffStore: Send + Sync {
    /// 读取当前电价表
    async fn load(&self) -> Result<RateTable, StorageError>;

    /// 整体替换电价表
    async fn save(&self, table: &RateTable) -> Result<(), StorageError>;
}
