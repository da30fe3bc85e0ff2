pub mod data;
pub mod tariff;
pub mod time;

pub use data::{
    DecodeError, DeviceHistoryPoint, DeviceReading, HistoryEntry, NormalizedEntry,
    NormalizedRecord, NormalizedSnapshot, SequenceKey, Snapshot, StoreEntry,
};
pub use tariff::{RateTable, TariffError, Tier};
pub use time::{format_timestamp, local_date, now_timestamp};
