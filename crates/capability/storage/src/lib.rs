//! # Meter Storage 模块
//!
//! 本模块提供服务的两类持久化数据：有界历史日志与阶梯电价表。
//!
//! ## 架构设计
//!
//! 1. **接口抽象层** (`traits.rs`)：`HistoryPersistence`、`TariffStore`
//! 2. **错误处理层** (`error.rs`)：统一的存储错误类型
//! 3. **历史日志** (`history.rs`)：内存中的有界日志，每次追加后整体落盘
//! 4. **实现层**：
//!    - `file/`：JSON 文件实现（生产环境使用）
//!    - `in_memory/`：内存实现（用于测试）
//!
//! ## 文件格式
//!
//! - 历史日志：`[{ "time": "...+05:30", "data": { 根键: 标准化条目 } }, ...]`
//! - 电价表：`{ "ranges": [...], "monthlyCost": [...], "unitPrice": [...] }`
//!
//! 两者写入时都先写 `*.tmp` 再重命名，读者只会看到完整文件。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use meter_storage::{HistoryLog, JsonFileHistory, JsonFileTariffStore};
//! use std::sync::Arc;
//!
//! let history = HistoryLog::open(Arc::new(JsonFileHistory::new("data.json")), 1000).await?;
//! let tariff = JsonFileTariffStore::open("ceb_data.json").await?;
//! ```

pub mod error;
pub mod file;
pub mod history;
pub mod in_memory;
pub mod traits;

pub use error::*;
pub use file::{JsonFileHistory, JsonFileTariffStore};
pub use history::HistoryLog;
pub use in_memory::{InMemoryHistoryPersistence, InMemoryTariffStore};
pub use traits::*;
