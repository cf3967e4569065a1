//! Vault configuration: where each backend lives and what its keys are called.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Legacy generation keys, oldest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacyKeys {
    pub v1: String,
    pub v2: String,
}

impl Default for LegacyKeys {
    fn default() -> Self {
        Self {
            v1: "luxeauto_saves_v1".into(),
            v2: "luxeauto_saves_v2".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VaultConfig {
    /// Prefix applied to every storage key and file name, for isolated stores.
    pub namespace: Option<String>,
    /// SQLite database file of the primary backend.
    pub primary_path: PathBuf,
    /// Directory of the file-backed legacy key/value store.
    pub legacy_dir: PathBuf,
    /// Byte ceiling across all legacy keys.
    pub legacy_capacity_bytes: usize,
    pub legacy_keys: LegacyKeys,
    pub export_prefix: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            primary_path: PathBuf::from("luxeauto_archive.sqlite3"),
            legacy_dir: PathBuf::from("luxeauto_local_storage"),
            legacy_capacity_bytes: 5 * 1024 * 1024,
            legacy_keys: LegacyKeys::default(),
            export_prefix: "luxeauto-archives".into(),
        }
    }
}

impl VaultConfig {
    /// Default layout rooted under `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let defaults = Self::default();
        Self {
            primary_path: dir.join(&defaults.primary_path),
            legacy_dir: dir.join(&defaults.legacy_dir),
            ..defaults
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_legacy_capacity(mut self, bytes: usize) -> Self {
        self.legacy_capacity_bytes = bytes;
        self
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Legacy keys, namespaced, newest generation first.
    pub fn legacy_generations(&self) -> Vec<(u64, String)> {
        vec![
            (2, self.scoped(&self.legacy_keys.v2)),
            (1, self.scoped(&self.legacy_keys.v1)),
        ]
    }

    /// Key the current generation is written under.
    pub fn legacy_write_key(&self) -> String {
        self.scoped(&self.legacy_keys.v2)
    }

    /// Primary database path with the namespace folded into the file name.
    pub fn primary_database(&self) -> PathBuf {
        match &self.namespace {
            None => self.primary_path.clone(),
            Some(ns) => {
                let file = self
                    .primary_path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.primary_path.with_file_name(format!("{ns}_{file}"))
            }
        }
    }

    fn scoped(&self, key: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}:{key}"),
            None => key.to_string(),
        }
    }
}
