//! Workspace configuration
//!
//! Which fields a seed run refreshes is a per-entity-type product decision,
//! so it lives here rather than in code. Defaults encode the built-in
//! behavior; a TOML file overrides any part of it:
//!
//! ```toml
//! store_path = "data/vigil-store.json"
//!
//! [seed.communes]
//! refresh = ["seo_title", "seo_description"]
//!
//! [legacy.site_config]
//! fields = ["footer_config", { array = "navbar_items", key = "path" }]
//! ```

use crate::catalog::{seo, SeedTarget};
use crate::error::ConfigError;
use crate::legacy::{LegacyField, LegacyFieldSet};
use crate::orchestrator::MigrationBatch;
use crate::reconciler::{RefreshPolicy, DEFAULT_KEY_FIELD, DEFAULT_KEY_INDEX};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vigil_store::IndexSpec;

/// Default snapshot location
pub const DEFAULT_STORE_PATH: &str = "vigil-store.json";

/// Per-collection seed overrides; unset values fall back to defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedOverrides {
    /// Natural key index
    pub index: Option<String>,
    /// Natural key field
    pub key_field: Option<String>,
    /// Refreshable fields
    pub refresh: Option<Vec<String>>,
}

/// Per-collection legacy field override
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegacyOverrides {
    /// Replaces the built-in set entirely
    pub fields: Vec<LegacyField>,
}

/// Resolved seed settings of one collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSettings {
    /// Natural key index
    pub index: String,
    /// Natural key field
    pub key_field: String,
    /// Refreshable fields
    pub refresh: RefreshPolicy,
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VigilConfig {
    /// Store snapshot used by operator tooling
    pub store_path: PathBuf,
    /// Seed overrides by collection
    pub seed: IndexMap<String, SeedOverrides>,
    /// Legacy field overrides by collection
    pub legacy: IndexMap<String, LegacyOverrides>,
}

impl VigilConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With store snapshot path
    #[inline]
    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    /// With refreshable fields for a collection
    #[must_use]
    pub fn with_refresh<I, F>(mut self, collection: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.seed.entry(collection.into()).or_default().refresh =
            Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// With legacy fields for a collection
    #[must_use]
    pub fn with_legacy_fields(mut self, collection: impl Into<String>, fields: Vec<LegacyField>) -> Self {
        self.legacy.insert(collection.into(), LegacyOverrides { fields });
        self
    }

    /// Load from a TOML file; a missing file means defaults
    ///
    /// # Errors
    /// IO failures, malformed TOML, or contradictory values
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Malformed TOML or contradictory values
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no run could use
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the offending collection
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (collection, overrides) in &self.seed {
            if overrides.index.as_deref().is_some_and(str::is_empty) {
                return Err(ConfigError::Invalid(format!("seed.{collection}.index is empty")));
            }
            if overrides.key_field.as_deref().is_some_and(str::is_empty) {
                return Err(ConfigError::Invalid(format!(
                    "seed.{collection}.key_field is empty"
                )));
            }
        }
        for (collection, overrides) in &self.legacy {
            if overrides.fields.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "legacy.{collection}.fields is empty"
                )));
            }
        }
        Ok(())
    }

    /// Resolved seed settings for `collection`
    ///
    /// Built-in targets refresh their SEO fields by default; any other
    /// collection refreshes nothing unless configured.
    #[must_use]
    pub fn seed_settings(&self, collection: &str) -> SeedSettings {
        let overrides = self.seed.get(collection).cloned().unwrap_or_default();
        let default_refresh = if collection.parse::<SeedTarget>().is_ok() {
            RefreshPolicy::new([seo::SEO_TITLE, seo::SEO_DESCRIPTION])
        } else {
            RefreshPolicy::none()
        };

        SeedSettings {
            index: overrides
                .index
                .unwrap_or_else(|| DEFAULT_KEY_INDEX.to_string()),
            key_field: overrides
                .key_field
                .unwrap_or_else(|| DEFAULT_KEY_FIELD.to_string()),
            refresh: overrides.refresh.map_or(default_refresh, RefreshPolicy::new),
        }
    }

    /// Legacy field set for `collection`: override, else built-in
    #[must_use]
    pub fn legacy_set(&self, collection: &str) -> Option<LegacyFieldSet> {
        match self.legacy.get(collection) {
            Some(overrides) => Some(LegacyFieldSet::new(collection, overrides.fields.clone())),
            None => LegacyFieldSet::builtin(collection),
        }
    }

    /// Standard batch with overrides applied, then any extra configured
    /// collections in file order
    #[must_use]
    pub fn migration_batch(&self) -> MigrationBatch {
        let mut sets: Vec<LegacyFieldSet> = MigrationBatch::standard()
            .sets()
            .iter()
            .filter_map(|set| self.legacy_set(&set.collection))
            .collect();

        for collection in self.legacy.keys() {
            if !sets.iter().any(|set| &set.collection == collection) {
                if let Some(set) = self.legacy_set(collection) {
                    sets.push(set);
                }
            }
        }
        MigrationBatch::new(sets)
    }

    /// Key indexes every seeded collection needs
    #[must_use]
    pub fn index_specs(&self) -> Vec<IndexSpec> {
        let mut collections: Vec<&str> = SeedTarget::ALL.iter().map(|t| t.collection()).collect();
        for collection in self.seed.keys() {
            if !collections.contains(&collection.as_str()) {
                collections.push(collection);
            }
        }

        collections
            .into_iter()
            .map(|collection| {
                let settings = self.seed_settings(collection);
                IndexSpec::new(collection, settings.index, settings.key_field)
            })
            .collect()
    }
}

impl Default for VigilConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            seed: IndexMap::new(),
            legacy: IndexMap::new(),
        }
    }
}
