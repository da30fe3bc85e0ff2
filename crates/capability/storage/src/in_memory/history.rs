//! 历史日志内存实现
//!
//! 可切换为"写入失败"模式，用于验证落盘失败时的行为。

use crate::error::StorageError;
use crate::traits::HistoryPersistence;
use domain::HistoryEntry;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
pub struct InMemoryHistoryPersistence {
    saved: RwLock<Option<Vec<HistoryEntry>>>,
    fail_saves: AtomicBool,
    save_count: AtomicUsize,
}

impl InMemoryHistoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以已有日志内容初始化（模拟重启前写入的文件）
    pub fn with_entries(entries: Vec<HistoryEntry>) -> Self {
        Self {
            saved: RwLock::new(Some(entries)),
            ..Self::default()
        }
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::Relaxed);
    }

    /// 最近一次成功写入的内容（用于测试）
    pub fn saved(&self) -> Option<Vec<HistoryEntry>> {
        self.saved.read().ok().and_then(|saved| saved.clone())
    }

    /// 成功写入次数（用于测试）
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl HistoryPersistence for InMemoryHistoryPersistence {
    async fn load(&self) -> Result<Option<Vec<HistoryEntry>>, StorageError> {
        let saved = self
            .saved
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(saved.clone())
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::Relaxed) {
            return Err(StorageError::new("history save disabled"));
        }
        let mut saved = self
            .saved
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        *saved = Some(entries.to_vec());
        self.save_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
