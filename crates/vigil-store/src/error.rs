//! Error types for the document store
//!
//! Every store failure surfaces through [`StoreError`]. Callers in the seed
//! and migration crates propagate it unchanged.

use crate::record::DocumentId;
use std::path::PathBuf;

/// Document store error
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Store could not be reached or refused the call
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Lookup through an index that was never defined
    #[error("unknown index '{index}' on collection '{collection}'")]
    UnknownIndex {
        /// Queried collection
        collection: String,
        /// Undefined index name
        index: String,
    },

    /// Patch or delete on a document that does not exist
    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// Payload rejected by the store
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// IO error while reading or writing a snapshot
    #[error("io error on {path}: {source}")]
    Io {
        /// Snapshot path
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// Snapshot (de)serialization failed
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create unknown index error
    pub fn unknown_index(collection: impl Into<String>, index: impl Into<String>) -> Self {
        Self::UnknownIndex {
            collection: collection.into(),
            index: index.into(),
        }
    }
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
