use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::{sort_newest_first, SaveRecord};
use crate::error::StoreError;
use crate::normalize::normalize_records;

use super::PrimaryStore;

/// In-memory primary store backed by `Arc<RwLock<HashMap>>`.
///
/// Clone-friendly (cloning shares the same underlying storage). Values are
/// kept as JSON so reads go through normalization like the SQLite store.
#[derive(Clone, Default)]
pub struct InMemoryPrimaryStore {
    storage: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl InMemoryPrimaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an arbitrary value under `id`, bypassing validation.
    pub fn insert_raw(&self, id: &str, value: serde_json::Value) -> Result<(), StoreError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::LockPoisoned("primary write"))?;
        storage.insert(id.to_string(), value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.storage.read().map(|storage| storage.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PrimaryStore for InMemoryPrimaryStore {
    fn get_all(&self) -> Result<Vec<SaveRecord>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::LockPoisoned("primary read"))?;
        let mut records = normalize_records(storage.values()).records;
        sort_newest_first(&mut records);
        Ok(records)
    }

    fn upsert(&self, record: &SaveRecord) -> Result<(), StoreError> {
        self.bulk_upsert(std::slice::from_ref(record))
    }

    fn bulk_upsert(&self, records: &[SaveRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }
        // Serialize everything before touching storage so a failure writes nothing.
        let values = records
            .iter()
            .map(|record| Ok((record.id.clone(), serde_json::to_value(record)?)))
            .collect::<Result<Vec<_>, StoreError>>()?;
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::LockPoisoned("primary write"))?;
        storage.extend(values);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::LockPoisoned("primary write"))?;
        storage.remove(id);
        Ok(())
    }
}
