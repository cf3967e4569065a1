pub mod clock;
pub mod codec;
pub mod config;
pub mod domain;
mod error;
pub mod legacy;
pub mod normalize;
pub mod primary;
pub mod vault;

pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{encode_export, export_file_name, parse_archive_text, ParsedArchive};
pub use config::{LegacyKeys, VaultConfig};
pub use domain::{
    dedupe, merge, replace, sort_newest_first, Brand, BrandBrief, CarModel, CarSpecs, CarTier,
    CarVariant, ImagePayload, LoreEntry, MarketInsight, ModelProgram, Review, ReviewPersona,
    SaveRecord, SPEC_KEYS,
};
pub use error::{CodecError, ConfigError, StoreError};
pub use legacy::{
    FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, LegacyLoad, LegacySource, LegacyStore,
};
pub use normalize::{normalize_records, normalize_save_record, NormalizedBatch};
pub use primary::{InMemoryPrimaryStore, PrimaryStore, SqlitePrimaryStore};
pub use vault::{
    ArchiveVault, ExportArtifact, ExportOutcome, ImportOutcome, ImportReport, Notice, NoticeTone,
    StorageMode,
};

// Re-export the EventEmitter notices are broadcast through
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
