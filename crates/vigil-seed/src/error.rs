//! Error types for seeding and migrations
//!
//! Store failures pass through unchanged (`#[error(transparent)]`): batch
//! jobs never retry or swallow them, the operator re-runs after fixing.

use std::path::PathBuf;
use vigil_store::{DocumentId, StoreError};

/// Seed Reconciler errors
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// Store failure, unchanged
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Entry rejected before any store call
    #[error("invalid seed entry #{position} ('{key}'): {reason}")]
    InvalidEntry {
        /// Index in the plan
        position: usize,
        /// Entry key
        key: String,
        /// What is wrong
        reason: String,
    },
}

impl SeedError {
    /// Create invalid entry error
    pub fn invalid_entry(position: usize, key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEntry {
            position,
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Legacy-Field Migrator errors
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Store failure, unchanged
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Legacy field does not have the shape the migration expects
    #[error("malformed field '{field}' on {collection}/{id}: {reason}")]
    MalformedField {
        /// Scanned collection
        collection: String,
        /// Offending record
        id: DocumentId,
        /// Legacy field label
        field: String,
        /// Shape found
        reason: String,
    },
}

/// Admin content operation errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Store failure, unchanged
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Document has no slug
    #[error("missing slug in {0}")]
    MissingSlug(String),

    /// Slug is not lowercase-kebab
    #[error("invalid slug '{0}'")]
    InvalidSlug(String),

    /// Slug already held by another document
    #[error("slug '{slug}' already used in {collection} by {holder}")]
    SlugConflict {
        /// Target collection
        collection: String,
        /// Requested slug
        slug: String,
        /// Document already holding it
        holder: DocumentId,
    },
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file unreadable
    #[error("io error reading {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config values contradict each other
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Seed entry file errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Entry file unreadable
    #[error("io error reading {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// JSON parse failure
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parse failure
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Extension is neither JSON nor YAML
    #[error("unsupported entry file format: '{0}'")]
    UnsupportedFormat(String),

    /// Entry has no usable key field
    #[error("entry #{position} has no string '{key_field}' field")]
    MissingKey {
        /// Index in the file
        position: usize,
        /// Expected key field
        key_field: String,
    },

    /// Entry is not a JSON object
    #[error("entry #{0} is not an object")]
    NotAnObject(usize),
}
