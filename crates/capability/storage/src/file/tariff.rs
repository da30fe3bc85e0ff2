//! 电价表 JSON 文件实现
//!
//! 文件结构：`{ "ranges": [...], "monthlyCost": [...], "unitPrice": [...] }`。

use super::{read_optional, write_json_file};
use crate::error::StorageError;
use crate::traits::TariffStore;
use domain::RateTable;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::info;

pub struct JsonFileTariffStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileTariffStore {
    /// 打开电价表文件；文件不存在时写入默认电价表，内容非法时返回错误。
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let store = Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        };
        match read_optional(&store.path).await? {
            Some(raw) => {
                parse_table(&store.path, &raw)?;
            }
            None => {
                let table = RateTable::default();
                store.save(&table).await?;
                info!(
                    target: "meter.tariff",
                    path = %store.path.display(),
                    tiers = table.ranges.len(),
                    "tariff_seeded"
                );
            }
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl TariffStore for JsonFileTariffStore {
    async fn load(&self) -> Result<RateTable, StorageError> {
        let raw = read_optional(&self.path)
            .await?
            .ok_or_else(|| StorageError::new(format!("{} missing", self.path.display())))?;
        parse_table(&self.path, &raw)
    }

    async fn save(&self, table: &RateTable) -> Result<(), StorageError> {
        table.validate()?;
        let contents = serde_json::to_string_pretty(table)?;
        let _guard = self.write_lock.lock().await;
        write_json_file(&self.path, contents).await
    }
}

fn parse_table(path: &Path, raw: &str) -> Result<RateTable, StorageError> {
    let table = serde_json::from_str::<RateTable>(raw)
        .map_err(|err| StorageError::Corrupt(format!("{}: {err}", path.display())))?;
    table.validate()?;
    Ok(table)
}
