use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags};
use tracing::{debug, warn};

use crate::domain::{sort_newest_first, SaveRecord};
use crate::error::StoreError;
use crate::normalize::normalize_records;

use super::PrimaryStore;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS saves (
        id TEXT PRIMARY KEY NOT NULL,
        timestamp INTEGER NOT NULL,
        payload TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS saves_timestamp ON saves (timestamp);
";

/// SQLite-backed primary store.
///
/// Opens a fresh connection for every operation and creates the schema on
/// first open. Each record is stored verbatim as JSON in `payload`.
#[derive(Clone, Debug)]
pub struct SqlitePrimaryStore {
    path: PathBuf,
}

impl SqlitePrimaryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection, StoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags).map_err(|err| {
            StoreError::Unavailable(format!("open {}: {err}", self.path.display()))
        })?;
        conn.execute_batch(SCHEMA)
            .map_err(|err| StoreError::Unavailable(format!("create schema: {err}")))?;
        Ok(conn)
    }

    fn write_all(&self, records: &[SaveRecord]) -> Result<(), StoreError> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO saves (id, timestamp, payload) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET timestamp = excluded.timestamp, payload = excluded.payload",
            )?;
            for record in records {
                let payload = serde_json::to_string(record)?;
                stmt.execute(params![record.id, record.timestamp, payload])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

/// The row key is authoritative for payloads that carry no id of their own.
fn with_row_id(mut value: serde_json::Value, id: String) -> serde_json::Value {
    if let Some(object) = value.as_object_mut() {
        let has_id = object
            .get("id")
            .and_then(serde_json::Value::as_str)
            .is_some_and(|existing| !existing.trim().is_empty());
        if !has_id {
            object.insert("id".into(), serde_json::Value::String(id));
        }
    }
    value
}

impl PrimaryStore for SqlitePrimaryStore {
    fn get_all(&self) -> Result<Vec<SaveRecord>, StoreError> {
        let conn = self.open()?;
        let mut stmt = conn.prepare("SELECT id, payload FROM saves ORDER BY timestamp DESC")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut values = Vec::new();
        let mut unreadable = 0usize;
        for row in rows {
            let (id, payload) = row?;
            match serde_json::from_str::<serde_json::Value>(&payload) {
                Ok(value) => values.push(with_row_id(value, id)),
                Err(err) => {
                    warn!(%id, error = %err, "skipping unparsable primary record");
                    unreadable += 1;
                }
            }
        }

        let batch = normalize_records(&values);
        if batch.dropped + unreadable > 0 {
            warn!(
                dropped = batch.dropped + unreadable,
                "primary store held malformed records"
            );
        }
        let mut records = batch.records;
        sort_newest_first(&mut records);
        debug!(count = records.len(), "primary get_all");
        Ok(records)
    }

    fn upsert(&self, record: &SaveRecord) -> Result<(), StoreError> {
        self.write_all(std::slice::from_ref(record))
    }

    fn bulk_upsert(&self, records: &[SaveRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }
        self.write_all(records)
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM saves WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(())
    }
}
