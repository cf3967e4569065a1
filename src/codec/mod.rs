//! Import/export file format.
//!
//! Exports are `{ version: 1, exportedAt: <ISO-8601>, slots: [...] }`. Imports
//! accept that envelope, any object carrying a `slots` array, or a bare array
//! of records.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::{dedupe, SaveRecord};
use crate::error::{CodecError, StoreError};
use crate::normalize::normalize_records;

pub const EXPORT_VERSION: u64 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportEnvelope<'a> {
    version: u64,
    exported_at: String,
    slots: &'a [SaveRecord],
}

/// Pretty-printed export document for `records`, stamped with `exported_at`.
pub fn encode_export(records: &[SaveRecord], exported_at: DateTime<Utc>) -> Result<String, StoreError> {
    let envelope = ExportEnvelope {
        version: EXPORT_VERSION,
        exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        slots: records,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// `<prefix>-YYYY-MM-DD.json`
pub fn export_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}-{}.json", date.format("%Y-%m-%d"))
}

/// Records recovered from an import file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedArchive {
    /// Valid records, one per id (newest timestamp wins).
    pub records: Vec<SaveRecord>,
    /// Entries rejected by normalization.
    pub dropped: usize,
}

pub fn parse_archive_text(text: &str) -> Result<ParsedArchive, CodecError> {
    let document: Value =
        serde_json::from_str(text).map_err(|err| CodecError::InvalidJson(err.to_string()))?;
    let slots = match &document {
        Value::Array(slots) => slots,
        Value::Object(object) => match object.get("slots") {
            Some(Value::Array(slots)) => slots,
            _ => return Err(CodecError::UnrecognizedLayout),
        },
        _ => return Err(CodecError::UnrecognizedLayout),
    };
    let batch = normalize_records(slots);
    let records = dedupe(batch.records);
    debug!(records = records.len(), dropped = batch.dropped, "parsed archive file");
    Ok(ParsedArchive {
        records,
        dropped: batch.dropped,
    })
}
