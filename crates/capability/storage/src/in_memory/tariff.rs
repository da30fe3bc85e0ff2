//! 电价表内存实现
//!
//! `new` 不做校验，便于测试非法电价表在计费路径上的表现；`save` 与文件实现一致会校验。

use crate::error::StorageError;
use crate::traits::TariffStore;
use domain::RateTable;
use std::sync::RwLock;

pub struct InMemoryTariffStore {
    table: RwLock<RateTable>,
}

impl InMemoryTariffStore {
    pub fn new(table: RateTable) -> Self {
        Self {
            table: RwLock::new(table),
        }
    }
}

impl Default for InMemoryTariffStore {
    fn default() -> Self {
        Self::new(RateTable::default())
    }
}

#[async_trait::async_trait]
impl TariffStore for InMemoryTariffStore {
    async fn load(&self) -> Result<RateTable, StorageError> {
        let table = self
            .table
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(table.clone())
    }

    async fn save(&self, table: &RateTable) -> Result<(), StorageError> {
        table.validate()?;
        let mut current = self
            .table
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        *current = table.clone();
        Ok(())
    }
}
