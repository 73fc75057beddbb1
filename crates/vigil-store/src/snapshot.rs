//! JSON snapshots of an [`InMemoryStore`]
//!
//! Lets operator tooling run batch jobs against a file. Index definitions
//! are schema, not data: they are not written, and callers define them
//! again after loading.

use crate::error::{StoreError, StoreResult};
use crate::memory::{Collections, InMemoryStore};
use crate::record::Record;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    collections: IndexMap<String, Vec<Record>>,
}

impl InMemoryStore {
    /// Load a store from a snapshot file
    ///
    /// A missing file yields an empty store.
    ///
    /// # Errors
    /// IO failures, malformed JSON, or an unsupported snapshot version
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let store = Self::new();

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no snapshot found, starting empty");
                return Ok(store);
            }
            Err(e) => return Err(StoreError::io_error(path, e)),
        };

        let file: SnapshotFile = serde_json::from_str(&text)?;
        if file.version != SNAPSHOT_VERSION {
            return Err(StoreError::InvalidDocument(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                file.version
            )));
        }

        let mut collections = Collections::new();
        for (name, records) in file.collections {
            let docs = collections.entry(name.clone()).or_default();
            for mut record in records {
                record.collection.clone_from(&name);
                docs.insert(record.id.clone(), record);
            }
        }

        let total: usize = collections.values().map(IndexMap::len).sum();
        store.import(collections);
        tracing::info!(path = %path.display(), documents = total, "snapshot loaded");
        Ok(store)
    }

    /// Write the store to a snapshot file
    ///
    /// Written to a sibling temp file first, then renamed over `path`.
    ///
    /// # Errors
    /// IO or serialization failures
    pub fn save(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        let file = SnapshotFile {
            version: SNAPSHOT_VERSION,
            collections: self
                .export()
                .into_iter()
                .map(|(name, docs)| (name, docs.into_values().collect()))
                .collect(),
        };
        let text = serde_json::to_string_pretty(&file)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io_error(parent, e))?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, text).map_err(|e| StoreError::io_error(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| StoreError::io_error(path, e))?;

        tracing::debug!(path = %path.display(), "snapshot saved");
        Ok(())
    }
}
