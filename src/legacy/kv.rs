use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::StoreError;

/// Synchronous, quota-limited text storage addressed by key.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Blocking write of the whole value. Fails with
    /// [`StoreError::CapacityExceeded`] when the store would exceed its quota.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove_item(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove_item(key)
    }
}

/// Bytes an entry occupies against the quota.
pub(crate) fn entry_cost(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

/// In-memory key/value store with a byte quota.
///
/// Clone-friendly (cloning shares the same underlying storage).
#[derive(Clone)]
pub struct InMemoryKeyValueStore {
    storage: Arc<RwLock<HashMap<String, String>>>,
    capacity: usize,
}

impl Default for InMemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryKeyValueStore {
    /// Unbounded store.
    pub fn new() -> Self {
        Self::with_capacity(usize::MAX)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn used_bytes(&self) -> usize {
        self.storage
            .read()
            .map(|storage| storage.iter().map(|(k, v)| entry_cost(k, v)).sum())
            .unwrap_or(0)
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::LockPoisoned("key/value read"))?;
        Ok(storage.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::LockPoisoned("key/value write"))?;
        let others: usize = storage
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| entry_cost(k, v))
            .sum();
        let needed = others.saturating_add(entry_cost(key, value));
        if needed > self.capacity {
            return Err(StoreError::CapacityExceeded {
                needed,
                limit: self.capacity,
            });
        }
        storage.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::LockPoisoned("key/value write"))?;
        storage.remove(key);
        Ok(())
    }
}
