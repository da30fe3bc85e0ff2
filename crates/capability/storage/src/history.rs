//! 有界历史日志
//!
//! 按时间顺序保存最近 `capacity` 个标准化快照；超出容量时丢弃最旧的条目。
//! 内存中的日志是权威数据，落盘失败不会回滚内存状态。

use crate::error::StorageError;
use crate::traits::HistoryPersistence;
use domain::{DeviceHistoryPoint, HistoryEntry};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

pub struct HistoryLog {
    entries: RwLock<VecDeque<HistoryEntry>>,
    capacity: usize,
    persistence: Arc<dyn HistoryPersistence>,
    flush_lock: Mutex<()>,
}

impl HistoryLog {
    /// 从持久化层加载日志。
    ///
    /// - 尚未创建：立即写入空日志（写入失败视为启动失败）
    /// - 内容损坏：记录警告并从空日志开始
    /// - 其他 I/O 错误：返回错误
    ///
    /// 加载条目多于容量时只保留最新的 `capacity` 条；容量为 0 时按 1 处理。
    pub async fn open(
        persistence: Arc<dyn HistoryPersistence>,
        capacity: usize,
    ) -> Result<Self, StorageError> {
        let capacity = capacity.max(1);
        let loaded = match persistence.load().await {
            Ok(Some(entries)) => entries,
            Ok(None) => {
                persistence.save(&[]).await?;
                Vec::new()
            }
            Err(StorageError::Corrupt(reason)) => {
                warn!(target: "meter.history", reason = %reason, "history_corrupt_reset");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        let mut entries: VecDeque<HistoryEntry> = loaded.into();
        while entries.len() > capacity {
            entries.pop_front();
        }

        Ok(Self {
            entries: RwLock::new(entries),
            capacity,
            persistence,
            flush_lock: Mutex::new(()),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// 仅追加到内存（不落盘）。
    pub async fn push(&self, entry: HistoryEntry) {
        let mut entries = self.entries.write().await;
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// 追加并落盘；落盘失败时内存中的条目保留。
    pub async fn append(&self, entry: HistoryEntry) -> Result<(), StorageError> {
        self.push(entry).await;
        self.flush().await
    }

    /// 将当前内存日志整体写入持久化层。并发调用按顺序执行。
    pub async fn flush(&self) -> Result<(), StorageError> {
        let _guard = self.flush_lock.lock().await;
        let snapshot = self.entries().await;
        self.persistence.save(&snapshot).await
    }

    pub async fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.read().await.iter().cloned().collect()
    }

    /// 单设备历史：按时间顺序返回包含该设备记录的条目，不包含的条目跳过。
    pub async fn query_device(&self, device_id: &str) -> Vec<DeviceHistoryPoint> {
        self.entries
            .read()
            .await
            .iter()
            .filter_map(|entry| {
                entry
                    .record_for(device_id)
                    .map(|record| DeviceHistoryPoint::new(entry.time.clone(), record.clone()))
            })
            .collect()
    }
}
