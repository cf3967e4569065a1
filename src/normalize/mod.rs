//! Normalization - validation with defaulting for untrusted JSON.
//!
//! Every value read back from storage or an import file passes through here
//! before it is trusted as a domain record. Fields of the wrong type are
//! replaced by their defaults; records too malformed to be meaningful
//! (no `brand` object) are rejected and counted.
//!
//! ## Example
//!
//! ```
//! use luxe_archive::normalize::normalize_records;
//! use serde_json::json;
//!
//! let raw = vec![
//!     json!({ "id": "a", "timestamp": 1, "brand": { "name": "Aurelian" } }),
//!     json!({ "id": "b" }),
//! ];
//! let batch = normalize_records(&raw);
//! assert_eq!(batch.records.len(), 1);
//! assert_eq!(batch.dropped, 1);
//! ```

mod brand;
mod fields;
mod model;
mod record;

pub use brand::{normalize_brand, normalize_brand_brief, normalize_lore_entry};
pub use model::{
    normalize_market_insight, normalize_model, normalize_program, normalize_review,
    normalize_specs, normalize_variant,
};
pub use record::{normalize_records, normalize_save_record, NormalizedBatch};
