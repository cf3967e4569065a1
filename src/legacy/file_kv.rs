use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StoreError;

use super::kv::{entry_cost, KeyValueStore};

/// Key/value store keeping one text file per key under a directory.
///
/// Writes go to a temp file in the same directory and are renamed into place,
/// so readers never see a partial value. The quota counts key and value bytes
/// across every entry in the directory.
#[derive(Clone, Debug)]
pub struct FileKeyValueStore {
    root: PathBuf,
    capacity: usize,
}

impl FileKeyValueStore {
    pub fn new(root: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            root: root.into(),
            capacity,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File name for `key`: ASCII alphanumerics, `-`, `_` and non-leading `.`
    /// kept, everything else percent-encoded byte by byte.
    fn file_name(key: &str) -> String {
        let mut name = String::with_capacity(key.len());
        for byte in key.bytes() {
            match byte {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' => name.push(byte as char),
                b'.' if !name.is_empty() => name.push('.'),
                _ => name.push_str(&format!("%{byte:02X}")),
            }
        }
        if name.is_empty() {
            name.push_str("%00");
        }
        name
    }

    fn key_from_file_name(name: &str) -> Option<String> {
        let mut bytes = Vec::with_capacity(name.len());
        let mut iter = name.bytes();
        while let Some(byte) = iter.next() {
            if byte == b'%' {
                let hi = iter.next()?;
                let lo = iter.next()?;
                let hex = [hi, lo];
                let hex = std::str::from_utf8(&hex).ok()?;
                bytes.push(u8::from_str_radix(hex, 16).ok()?);
            } else {
                bytes.push(byte);
            }
        }
        String::from_utf8(bytes).ok()
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(Self::file_name(key))
    }

    fn unavailable(&self, err: std::io::Error) -> StoreError {
        StoreError::Unavailable(format!("{}: {err}", self.root.display()))
    }

    /// Bytes used by every entry except `skip_key`.
    fn used_bytes_excluding(&self, skip_key: &str) -> Result<usize, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(self.unavailable(err)),
        };
        let mut used = 0usize;
        for entry in entries {
            let entry = entry.map_err(|err| self.unavailable(err))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            // Leftover temp file from an interrupted write; keys never start with '.'.
            if name.starts_with('.') {
                continue;
            }
            let Some(key) = Self::key_from_file_name(&name) else {
                continue;
            };
            if key == skip_key {
                continue;
            }
            let meta = entry.metadata().map_err(|err| self.unavailable(err))?;
            if meta.is_file() {
                used = used.saturating_add(key.len() + meta.len() as usize);
            }
        }
        Ok(used)
    }

    fn atomic_write(&self, path: &Path, data: &[u8]) -> Result<(), StoreError> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)
            .map_err(|err| self.unavailable(err))?;
        tmp.write_all(data)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|err| StoreError::TransactionFailed(err.to_string()))?;
        tmp.persist(path)
            .map_err(|err| StoreError::TransactionFailed(err.error.to_string()))?;
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) if err.kind() == std::io::ErrorKind::InvalidData => {
                debug!(key, "legacy value is not valid UTF-8");
                Ok(None)
            }
            Err(err) => Err(self.unavailable(err)),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|err| self.unavailable(err))?;
        let needed = self
            .used_bytes_excluding(key)?
            .saturating_add(entry_cost(key, value));
        if needed > self.capacity {
            return Err(StoreError::CapacityExceeded {
                needed,
                limit: self.capacity,
            });
        }
        self.atomic_write(&self.path_for(key), value.as_bytes())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.unavailable(err)),
        }
    }
}
