//! Primary store - durable, keyed, transactional storage for save records.
//!
//! Records are stored whole, keyed by id, with no size ceiling on embedded
//! images. Reads normalize every stored value, since the store may hold
//! records written by an earlier, differently-shaped version.

mod in_memory;
mod sqlite;

use crate::domain::SaveRecord;
use crate::error::StoreError;

pub use in_memory::InMemoryPrimaryStore;
pub use sqlite::SqlitePrimaryStore;

pub trait PrimaryStore: Send + Sync {
    /// Every record, normalized, most recent first.
    fn get_all(&self) -> Result<Vec<SaveRecord>, StoreError>;

    /// Insert or replace one record by id, atomically.
    fn upsert(&self, record: &SaveRecord) -> Result<(), StoreError>;

    /// Insert or replace many records in one atomic write. No-op when empty.
    fn bulk_upsert(&self, records: &[SaveRecord]) -> Result<(), StoreError>;

    /// Remove a record by id. Removing a missing id is not an error.
    fn delete(&self, id: &str) -> Result<(), StoreError>;
}

impl<S: PrimaryStore + ?Sized> PrimaryStore for std::sync::Arc<S> {
    fn get_all(&self) -> Result<Vec<SaveRecord>, StoreError> {
        (**self).get_all()
    }

    fn upsert(&self, record: &SaveRecord) -> Result<(), StoreError> {
        (**self).upsert(record)
    }

    fn bulk_upsert(&self, records: &[SaveRecord]) -> Result<(), StoreError> {
        (**self).bulk_upsert(records)
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        (**self).delete(id)
    }
}
