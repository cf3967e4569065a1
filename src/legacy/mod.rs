//! Legacy store - the small, synchronous key/value backend and its two
//! historical layouts.
//!
//! Generation 1 is a bare JSON array of records under its own key.
//! Generation 2 is an envelope `{ version: 2, updatedAt, slots }`. Reads try
//! the newest key first and lift whatever they find through the upcaster
//! chain; writes always produce the current envelope.
//!
//! ## Example
//!
//! ```
//! use luxe_archive::legacy::{InMemoryKeyValueStore, KeyValueStore, LegacySource, LegacyStore};
//! use luxe_archive::VaultConfig;
//!
//! let kv = InMemoryKeyValueStore::new();
//! kv.set_item("luxeauto_saves_v1", r#"[{"brand":{"id":"b1","name":"Aurelia"}}]"#).unwrap();
//!
//! let store = LegacyStore::new(kv, &VaultConfig::default());
//! let load = store.load_legacy_slots().unwrap();
//! assert_eq!(load.source, LegacySource::Generation(1));
//! assert_eq!(load.records[0].id, "b1");
//! ```

mod file_kv;
mod kv;
mod upcaster;

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::VaultConfig;
use crate::domain::SaveRecord;
use crate::error::StoreError;
use crate::normalize::normalize_records;

pub use file_kv::FileKeyValueStore;
pub use kv::{InMemoryKeyValueStore, KeyValueStore};
pub use upcaster::{current_slots, detect_version, upcast, SchemaUpcaster, CURRENT_VERSION, UPCASTERS};

/// Which generation a legacy load came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LegacySource {
    #[default]
    Empty,
    Generation(u64),
}

impl fmt::Display for LegacySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegacySource::Empty => f.write_str("empty"),
            LegacySource::Generation(version) => write!(f, "v{version}"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LegacyLoad {
    pub records: Vec<SaveRecord>,
    /// Entries that failed normalization.
    pub dropped: usize,
    pub source: LegacySource,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LegacyEnvelope<'a> {
    version: u64,
    updated_at: i64,
    slots: &'a [SaveRecord],
}

/// Reads and writes save records in the legacy key/value backend.
pub struct LegacyStore<K: KeyValueStore> {
    kv: K,
    /// Keys to read, newest generation first.
    generations: Vec<(u64, String)>,
    write_key: String,
}

impl<K: KeyValueStore> LegacyStore<K> {
    pub fn new(kv: K, config: &VaultConfig) -> Self {
        Self {
            kv,
            generations: config.legacy_generations(),
            write_key: config.legacy_write_key(),
        }
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Records from the newest generation that is present and parsable.
    ///
    /// Fails only when the backend itself cannot be read.
    pub fn load_legacy_slots(&self) -> Result<LegacyLoad, StoreError> {
        for (generation, key) in &self.generations {
            let Some(text) = self.kv.get_item(key)? else {
                continue;
            };
            let document = match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(document) => document,
                Err(err) => {
                    warn!(%key, error = %err, "legacy payload is not valid JSON");
                    continue;
                }
            };
            let Some(slots) = current_slots(document) else {
                warn!(%key, "legacy payload has an unrecognized layout");
                continue;
            };
            let batch = normalize_records(&slots);
            debug!(
                %key,
                generation,
                records = batch.records.len(),
                dropped = batch.dropped,
                "loaded legacy slots"
            );
            return Ok(LegacyLoad {
                records: batch.records,
                dropped: batch.dropped,
                source: LegacySource::Generation(*generation),
            });
        }
        Ok(LegacyLoad::default())
    }

    /// Overwrite the current-generation key with `records`.
    ///
    /// Capacity and storage errors are returned as-is; stripping images is
    /// the caller's decision.
    pub fn save_legacy_slots(&self, records: &[SaveRecord], updated_at: i64) -> Result<(), StoreError> {
        let envelope = LegacyEnvelope {
            version: CURRENT_VERSION,
            updated_at,
            slots: records,
        };
        let text = serde_json::to_string(&envelope)?;
        self.kv.set_item(&self.write_key, &text)?;
        debug!(count = records.len(), bytes = text.len(), "saved legacy slots");
        Ok(())
    }
}
