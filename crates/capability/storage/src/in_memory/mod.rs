//! 内存存储实现模块
//!
//! 仅用于测试和不落盘的本地运行。
//!
//! 包含以下实现：
//! - HistoryPersistence: InMemoryHistoryPersistence
//! - TariffStore: InMemoryTariffStore

pub mod history;
pub mod tariff;

pub use history::*;
pub use tariff::*;
