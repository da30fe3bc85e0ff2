//! Handlers 模块

pub mod devices;
pub mod health;
pub mod metrics;
pub mod raw;
pub mod tariff;
pub mod usage;

pub use devices::*;
pub use health::*;
pub use metrics::*;
pub use raw::*;
pub use tariff::*;
pub use usage::*;
