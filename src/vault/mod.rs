//! Archive vault - decides which backend holds the archives and keeps the
//! in-memory view consistent with what is durably stored.
//!
//! The vault starts with an undetermined [`StorageMode`] and resolves it in
//! [`ArchiveVault::initialize`], migrating legacy archives into the primary
//! store the first time it finds an empty one. Afterwards it falls back to the
//! legacy store when the primary store fails, and strips images when the
//! legacy store runs out of room.
//!
//! Every mutation runs through a single-writer queue and is reflected in
//! memory only after the backend confirmed it. Failures never escape as
//! errors; each operation returns a [`Notice`] for the user.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use luxe_archive::legacy::InMemoryKeyValueStore;
//! use luxe_archive::primary::InMemoryPrimaryStore;
//! use luxe_archive::{ArchiveVault, Brand, NoticeTone, StorageMode, SystemClock, VaultConfig};
//!
//! let vault = ArchiveVault::new(
//!     InMemoryPrimaryStore::new(),
//!     InMemoryKeyValueStore::new(),
//!     &VaultConfig::default(),
//!     Arc::new(SystemClock),
//! );
//! vault.initialize();
//! assert_eq!(vault.storage_mode(), Some(StorageMode::Primary));
//!
//! let notice = vault.save_current(Brand::new("b1", "Aurelian"), Vec::new());
//! assert_eq!(notice.tone, NoticeTone::Success);
//! assert_eq!(vault.records().len(), 1);
//! ```

mod mode;
mod notice;
mod write_queue;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::codec::{encode_export, export_file_name, parse_archive_text};
use crate::config::VaultConfig;
use crate::domain::{merge, replace, sort_newest_first, Brand, CarModel, SaveRecord};
use crate::error::CodecError;
use crate::legacy::{FileKeyValueStore, KeyValueStore, LegacyStore};
use crate::primary::{PrimaryStore, SqlitePrimaryStore};

pub use mode::StorageMode;
pub use notice::{Notice, NoticeTone, NOTICE_EVENT};

#[cfg(feature = "emitter")]
use notice::NoticeBroadcaster;
use write_queue::WriteQueue;

const MSG_MIGRATED: &str = "Legacy archives migrated to the new vault.";
const MSG_PRIMARY_DOWN_LEGACY: &str =
    "Primary archive unavailable. Using legacy storage; large image archives may be limited.";
const MSG_NO_STORAGE: &str = "Archive storage unavailable. Your data cannot be saved.";
const MSG_SAVED: &str = "Legacy secured in archive.";
const MSG_SAVED_TO_LEGACY: &str =
    "Primary archive unavailable. Saved to legacy storage; large images may be limited.";
const MSG_SAVE_FAILED: &str = "Archive save failed. Storage unavailable.";
const MSG_LEGACY_SAVE_FAILED: &str = "Archive failed. Local storage may be unavailable.";
const MSG_DELETED: &str = "Legacy dissolved.";
const MSG_DELETE_FAILED: &str = "Unable to update archives. Storage may be locked.";
const MSG_NOTHING_TO_EXPORT: &str = "No archives to export yet.";
const MSG_EXPORTED: &str = "Archives exported.";
const MSG_EXPORT_FAILED: &str = "Export failed. Try again.";
const MSG_IMPORT_EMPTY: &str = "Import failed. No valid archives found.";
const MSG_IMPORT_NOT_JSON: &str = "Import failed. File is not valid JSON.";
const MSG_IMPORT_STORAGE: &str = "Import failed. Storage unavailable.";
const MSG_PRIMARY_ACTIVE: &str = "Primary archive already active.";
const MSG_PRIMARY_RESTORED: &str = "Primary archive restored.";
const MSG_PRIMARY_STILL_DOWN: &str = "Primary archive still unavailable.";

/// A downloadable export document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    /// `<prefix>-YYYY-MM-DD.json`
    pub file_name: String,
    pub contents: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOutcome {
    pub notice: Notice,
    /// Present only when the export succeeded.
    pub artifact: Option<ExportArtifact>,
}

/// Counts reported after an import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Valid records found in the file, one per id.
    pub imported: usize,
    /// Imported ids that were already archived.
    pub replaced: usize,
    /// File entries rejected as invalid.
    pub dropped: usize,
}

impl ImportReport {
    pub fn message(&self) -> String {
        let mut message = format!("Imported {} archives.", self.imported);
        if self.replaced > 0 {
            message.push_str(&format!(" {} replaced.", self.replaced));
        }
        if self.dropped > 0 {
            message.push_str(&format!(" {} invalid entries dropped.", self.dropped));
        }
        message
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportOutcome {
    pub notice: Notice,
    /// Present only when the import succeeded.
    pub report: Option<ImportReport>,
}

#[derive(Clone, Debug, Default)]
struct VaultState {
    /// Newest first, one per id.
    records: Vec<SaveRecord>,
    mode: Option<StorageMode>,
    notice: Option<Notice>,
}

pub struct ArchiveVault<P: PrimaryStore, K: KeyValueStore> {
    primary: P,
    legacy: LegacyStore<K>,
    clock: Arc<dyn Clock>,
    export_prefix: String,
    state: RwLock<VaultState>,
    writer: WriteQueue,
    #[cfg(feature = "emitter")]
    notices: NoticeBroadcaster,
}

impl ArchiveVault<SqlitePrimaryStore, FileKeyValueStore> {
    /// Vault over the on-disk backends named by `config`.
    pub fn open(config: &VaultConfig) -> Self {
        let primary = SqlitePrimaryStore::new(config.primary_database());
        let legacy = FileKeyValueStore::new(&config.legacy_dir, config.legacy_capacity_bytes);
        Self::new(primary, legacy, config, Arc::new(SystemClock))
    }
}

impl<P: PrimaryStore, K: KeyValueStore> ArchiveVault<P, K> {
    pub fn new(primary: P, legacy: K, config: &VaultConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            primary,
            legacy: LegacyStore::new(legacy, config),
            clock,
            export_prefix: config.export_prefix.clone(),
            state: RwLock::new(VaultState::default()),
            writer: WriteQueue::new(),
            #[cfg(feature = "emitter")]
            notices: NoticeBroadcaster::new(),
        }
    }

    // ------------------------------------------------------------------
    // Snapshot accessors
    // ------------------------------------------------------------------

    /// Archived records, newest first.
    pub fn records(&self) -> Vec<SaveRecord> {
        self.read_state().records.clone()
    }

    /// `None` until [`initialize`](Self::initialize) has run.
    pub fn storage_mode(&self) -> Option<StorageMode> {
        self.read_state().mode
    }

    /// Latest notice, if it has not been dismissed.
    pub fn notice(&self) -> Option<Notice> {
        self.read_state().notice.clone()
    }

    pub fn dismiss_notice(&self) {
        self.update_state(|state| state.notice = None);
    }

    /// Subscribe to every notice the vault raises. Returns the listener id.
    #[cfg(feature = "emitter")]
    pub fn on_notice<F>(&self, listener: F) -> String
    where
        F: Fn(Notice) + Send + Sync + 'static,
    {
        self.notices.subscribe(listener)
    }

    // ------------------------------------------------------------------
    // Protocols
    // ------------------------------------------------------------------

    /// Resolve the storage mode and load archives, migrating legacy archives
    /// into an empty primary store.
    ///
    /// Returns a notice only when there is something to tell the user.
    pub fn initialize(&self) -> Option<Notice> {
        let _turn = self.writer.enter();

        let legacy = self.legacy.load_legacy_slots().unwrap_or_else(|err| {
            warn!(error = %err, "legacy store unreadable, treating as empty");
            Default::default()
        });
        let mut legacy_records = legacy.records;
        sort_newest_first(&mut legacy_records);

        match self.primary.get_all() {
            Ok(records) if !records.is_empty() => {
                if !legacy_records.is_empty() {
                    debug!(
                        legacy = legacy_records.len(),
                        source = %legacy.source,
                        "primary already populated, skipping migration"
                    );
                }
                info!(count = records.len(), mode = %StorageMode::Primary, "vault initialized");
                self.update_state(|state| {
                    state.records = records;
                    state.mode = Some(StorageMode::Primary);
                });
                None
            }
            Ok(_) if !legacy_records.is_empty() => {
                match self.primary.bulk_upsert(&legacy_records) {
                    Ok(()) => {
                        info!(
                            count = legacy_records.len(),
                            dropped = legacy.dropped,
                            source = %legacy.source,
                            "migrated legacy archives into primary store"
                        );
                        self.update_state(|state| {
                            state.records = legacy_records;
                            state.mode = Some(StorageMode::Primary);
                        });
                        let notice = if legacy.dropped > 0 {
                            Notice::warning(format!(
                                "Legacy archives migrated. {} corrupted entries removed.",
                                legacy.dropped
                            ))
                        } else {
                            Notice::success(MSG_MIGRATED)
                        };
                        Some(self.announce(notice))
                    }
                    Err(err) => {
                        warn!(error = %err, "migration into primary store failed");
                        Some(self.adopt_legacy(legacy_records, legacy.dropped))
                    }
                }
            }
            Ok(_) => {
                info!(mode = %StorageMode::Primary, "vault initialized empty");
                self.update_state(|state| {
                    state.records = Vec::new();
                    state.mode = Some(StorageMode::Primary);
                });
                None
            }
            Err(err) => {
                warn!(error = %err, "primary store unavailable");
                Some(self.adopt_legacy(legacy_records, legacy.dropped))
            }
        }
    }

    fn adopt_legacy(&self, records: Vec<SaveRecord>, dropped: usize) -> Notice {
        info!(count = records.len(), mode = %StorageMode::Legacy, "vault initialized");
        let notice = if records.is_empty() {
            Notice::error(MSG_NO_STORAGE)
        } else if dropped > 0 {
            Notice::warning(format!(
                "Primary archive unavailable. Using legacy storage with {dropped} corrupted entries removed."
            ))
        } else {
            Notice::warning(MSG_PRIMARY_DOWN_LEGACY)
        };
        self.update_state(|state| {
            state.records = records;
            state.mode = Some(StorageMode::Legacy);
        });
        self.announce(notice)
    }

    /// Archive the brand and its models, replacing any earlier save of the
    /// same brand.
    pub fn save_current(&self, brand: Brand, models: Vec<CarModel>) -> Notice {
        let _turn = self.writer.enter();
        let current = self.read_state().clone();
        let record = SaveRecord::new(brand, models, self.clock.now_millis());
        let mode = StorageMode::effective(current.mode);

        match mode {
            StorageMode::Primary => self.save_to_primary(&current, record, mode),
            StorageMode::Legacy => self.save_to_legacy(&current.records, record),
        }
    }

    fn save_to_primary(&self, current: &VaultState, record: SaveRecord, mode: StorageMode) -> Notice {
        let merged = replace(&current.records, record.clone());
        let err = match self.primary.upsert(&record) {
            Ok(()) => {
                debug!(id = %record.id, "saved to primary store");
                self.update_state(|state| state.records = merged);
                return self.announce(Notice::success(MSG_SAVED));
            }
            Err(err) => err,
        };

        let Some(next) = mode.after_primary_failure(&err) else {
            error!(id = %record.id, error = %err, "primary save failed");
            return self.announce(Notice::error(MSG_SAVE_FAILED));
        };
        warn!(id = %record.id, error = %err, "primary save failed, falling back to legacy store");
        match self.legacy.save_legacy_slots(&merged, record.timestamp) {
            Ok(()) => {
                info!(from = %mode, to = %next, "storage mode changed");
                self.update_state(|state| {
                    state.records = merged;
                    state.mode = Some(next);
                });
                self.announce(Notice::warning(MSG_SAVED_TO_LEGACY))
            }
            Err(fallback_err) => {
                error!(id = %record.id, error = %fallback_err, "legacy fallback save failed");
                self.announce(Notice::error(MSG_SAVE_FAILED))
            }
        }
    }

    fn save_to_legacy(&self, current: &[SaveRecord], record: SaveRecord) -> Notice {
        let merged = replace(current, record.clone());
        let err = match self.legacy.save_legacy_slots(&merged, record.timestamp) {
            Ok(()) => {
                debug!(id = %record.id, "saved to legacy store");
                self.update_state(|state| state.records = merged);
                return self.announce(Notice::success(MSG_SAVED));
            }
            Err(err) => err,
        };
        if !err.is_capacity() {
            error!(id = %record.id, error = %err, "legacy save failed");
            return self.announce(Notice::error(MSG_LEGACY_SAVE_FAILED));
        }

        let excluded = record.inline_image_bytes();
        warn!(id = %record.id, excluded_bytes = excluded, error = %err, "legacy store full, retrying without images");
        let reduced = replace(current, record.without_images());
        match self.legacy.save_legacy_slots(&reduced, record.timestamp) {
            Ok(()) => {
                self.update_state(|state| state.records = reduced);
                let mut message = String::from("Legacy archived without visuals due to storage limits.");
                if excluded > 0 {
                    message.push_str(&format!(" {excluded} bytes of imagery excluded."));
                }
                self.announce(Notice::warning(message))
            }
            Err(err) => {
                error!(id = %record.id, error = %err, "legacy save without images failed");
                self.announce(Notice::error(MSG_LEGACY_SAVE_FAILED))
            }
        }
    }

    /// Remove an archive. Removing an id that is not archived still succeeds.
    pub fn delete(&self, id: &str) -> Notice {
        let _turn = self.writer.enter();
        let current = self.read_state().clone();
        let remaining: Vec<SaveRecord> = current
            .records
            .iter()
            .filter(|record| record.id != id)
            .cloned()
            .collect();

        let result = match StorageMode::effective(current.mode) {
            StorageMode::Primary => self.primary.delete(id),
            StorageMode::Legacy => self
                .legacy
                .save_legacy_slots(&remaining, self.clock.now_millis()),
        };
        match result {
            Ok(()) => {
                debug!(%id, "archive deleted");
                self.update_state(|state| state.records = remaining);
                self.announce(Notice::success(MSG_DELETED))
            }
            Err(err) => {
                error!(%id, error = %err, "delete failed");
                self.announce(Notice::error(MSG_DELETE_FAILED))
            }
        }
    }

    /// Serialize every archive into a downloadable document.
    pub fn export(&self) -> ExportOutcome {
        let current = self.read_state().clone();
        let records = match StorageMode::effective(current.mode) {
            StorageMode::Primary => match self.primary.get_all() {
                Ok(records) => records,
                Err(err) => {
                    error!(error = %err, "export read failed");
                    return self.export_failed();
                }
            },
            StorageMode::Legacy => current.records,
        };
        if records.is_empty() {
            return ExportOutcome {
                notice: self.announce(Notice::warning(MSG_NOTHING_TO_EXPORT)),
                artifact: None,
            };
        }

        let now = self.clock.now();
        let contents = match encode_export(&records, now) {
            Ok(contents) => contents,
            Err(err) => {
                error!(error = %err, "export encoding failed");
                return self.export_failed();
            }
        };
        let artifact = ExportArtifact {
            file_name: export_file_name(&self.export_prefix, now.date_naive()),
            contents,
        };
        info!(count = records.len(), file = %artifact.file_name, "archives exported");
        ExportOutcome {
            notice: self.announce(Notice::success(MSG_EXPORTED)),
            artifact: Some(artifact),
        }
    }

    fn export_failed(&self) -> ExportOutcome {
        ExportOutcome {
            notice: self.announce(Notice::error(MSG_EXPORT_FAILED)),
            artifact: None,
        }
    }

    /// Merge archives from an export file (or any array of records) into the
    /// vault. For ids already archived, the newer record wins.
    pub fn import(&self, text: &str) -> ImportOutcome {
        let _turn = self.writer.enter();
        let parsed = match parse_archive_text(text) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(error = %err, "import rejected");
                let message = match err {
                    CodecError::InvalidJson(_) => MSG_IMPORT_NOT_JSON,
                    CodecError::UnrecognizedLayout => MSG_IMPORT_EMPTY,
                };
                return self.import_failed(message);
            }
        };
        if parsed.records.is_empty() {
            warn!(dropped = parsed.dropped, "import held no valid archives");
            return self.import_failed(MSG_IMPORT_EMPTY);
        }

        let current = self.read_state().clone();
        let primary_mode = StorageMode::effective(current.mode) == StorageMode::Primary;
        // The primary store may hold revisions memory has not seen.
        let baseline = if primary_mode {
            match self.primary.get_all() {
                Ok(stored) => merge(&stored, current.records.clone()),
                Err(err) => {
                    warn!(error = %err, "primary store unreadable before import");
                    current.records.clone()
                }
            }
        } else {
            current.records.clone()
        };
        let existing: HashMap<&str, i64> = baseline
            .iter()
            .map(|record| (record.id.as_str(), record.timestamp))
            .collect();
        let report = ImportReport {
            imported: parsed.records.len(),
            replaced: parsed
                .records
                .iter()
                .filter(|record| existing.contains_key(record.id.as_str()))
                .count(),
            dropped: parsed.dropped,
        };

        let records = match StorageMode::effective(current.mode) {
            StorageMode::Primary => {
                let newer: Vec<SaveRecord> = parsed
                    .records
                    .iter()
                    .filter(|record| {
                        existing
                            .get(record.id.as_str())
                            .map_or(true, |&timestamp| record.timestamp >= timestamp)
                    })
                    .cloned()
                    .collect();
                if let Err(err) = self.primary.bulk_upsert(&newer) {
                    error!(error = %err, "import write to primary store failed");
                    return self.import_failed(MSG_IMPORT_STORAGE);
                }
                match self.primary.get_all() {
                    Ok(records) => records,
                    Err(err) => {
                        warn!(error = %err, "refresh after import failed, merging in memory");
                        merge(&baseline, newer)
                    }
                }
            }
            StorageMode::Legacy => {
                let merged = merge(&current.records, parsed.records);
                if let Err(err) = self
                    .legacy
                    .save_legacy_slots(&merged, self.clock.now_millis())
                {
                    error!(error = %err, "import write to legacy store failed");
                    return self.import_failed(MSG_IMPORT_STORAGE);
                }
                merged
            }
        };

        info!(
            imported = report.imported,
            replaced = report.replaced,
            dropped = report.dropped,
            "archives imported"
        );
        self.update_state(|state| state.records = records);
        ImportOutcome {
            notice: self.announce(Notice::success(report.message())),
            report: Some(report),
        }
    }

    fn import_failed(&self, message: &str) -> ImportOutcome {
        ImportOutcome {
            notice: self.announce(Notice::error(message)),
            report: None,
        }
    }

    /// Move back to the primary store after a fallback. Succeeds only if the
    /// primary store can be read and accepts every archive held in memory.
    pub fn retry_primary(&self) -> Notice {
        let _turn = self.writer.enter();
        let current = self.read_state().clone();
        if current.mode != Some(StorageMode::Legacy) {
            return self.announce(Notice::success(MSG_PRIMARY_ACTIVE));
        }

        let stored = match self.primary.get_all() {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "primary store still unavailable");
                return self.announce(Notice::error(MSG_PRIMARY_STILL_DOWN));
            }
        };
        let records = merge(&stored, current.records);
        let outdated = newer_than_stored(&records, &stored);
        if let Err(err) = self.primary.bulk_upsert(&outdated) {
            warn!(error = %err, "primary store rejected archives");
            return self.announce(Notice::error(MSG_PRIMARY_STILL_DOWN));
        }

        info!(
            count = records.len(),
            from = %StorageMode::Legacy,
            to = %StorageMode::Primary,
            "storage mode changed"
        );
        self.update_state(|state| {
            state.records = records;
            state.mode = Some(StorageMode::Primary);
        });
        self.announce(Notice::success(MSG_PRIMARY_RESTORED))
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, VaultState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_state(&self, apply: impl FnOnce(&mut VaultState)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        apply(&mut state);
    }

    /// Record `notice` as the latest one and broadcast it.
    fn announce(&self, notice: Notice) -> Notice {
        self.update_state(|state| state.notice = Some(notice.clone()));
        #[cfg(feature = "emitter")]
        self.notices.publish(&notice);
        notice
    }
}

/// Records of `merged` that `stored` lacks or holds an older revision of.
fn newer_than_stored(merged: &[SaveRecord], stored: &[SaveRecord]) -> Vec<SaveRecord> {
    let stored: HashMap<&str, i64> = stored
        .iter()
        .map(|record| (record.id.as_str(), record.timestamp))
        .collect();
    merged
        .iter()
        .filter(|record| {
            stored
                .get(record.id.as_str())
                .map_or(true, |&timestamp| record.timestamp > timestamp)
        })
        .cloned()
        .collect()
}
