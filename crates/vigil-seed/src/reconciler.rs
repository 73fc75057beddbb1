//! Seed Reconciler
//!
//! Applies a list of canonical entries to a collection with an
//! insert-or-refresh pass:
//! - key not found: insert the whole payload
//! - key found: overwrite the refreshable fields only
//!
//! Re-running the same plan never duplicates a key and never clobbers
//! fields outside the refresh policy, so seed data can be re-applied after
//! copy or schema changes.
//!
//! Entries are processed strictly in order, one awaited store call at a
//! time. The first store error aborts the run: earlier entries stay
//! committed, later ones are never attempted.

use crate::error::SeedError;
use crate::slug::is_valid_slug;
use crate::uniqueness::UniquenessChecker;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use vigil_store::{DocumentStore, Fields, Patch};

/// Default natural key field
pub const DEFAULT_KEY_FIELD: &str = "slug";

/// Default natural key index
pub const DEFAULT_KEY_INDEX: &str = "by_slug";

/// Canonical record: natural key plus payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedEntry {
    /// Natural key
    pub key: String,
    /// Full document body used on insert
    pub payload: Fields,
}

impl SeedEntry {
    /// Create entry
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>, payload: Fields) -> Self {
        Self {
            key: key.into(),
            payload,
        }
    }

    /// Add a payload field
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(field.into(), value.into());
        self
    }

    /// Payload with the key field filled in
    fn document(&self, key_field: &str) -> Fields {
        let mut doc = self.payload.clone();
        doc.entry(key_field.to_string())
            .or_insert_with(|| Value::String(self.key.clone()));
        doc
    }
}

/// Fields a seed run overwrites on an existing record
///
/// Configured per entity type; empty means existing records are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshPolicy {
    fields: Vec<String>,
}

impl RefreshPolicy {
    /// Refresh the given fields
    #[must_use]
    pub fn new<I, F>(fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Refresh nothing
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Refreshable field names
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Patch overwriting the refreshable fields `entry` provides
    ///
    /// The key field is never part of it. Refreshable fields the entry does
    /// not carry are left untouched on the stored record.
    #[must_use]
    pub fn patch_for(&self, entry: &SeedEntry, key_field: &str) -> Patch {
        self.fields
            .iter()
            .filter(|field| field.as_str() != key_field)
            .filter_map(|field| entry.payload.get(field).map(|value| (field, value)))
            .fold(Patch::new(), |patch, (field, value)| {
                patch.set(field.clone(), value.clone())
            })
    }
}

/// Everything one reconciler run needs
#[derive(Debug, Clone, PartialEq)]
pub struct SeedPlan {
    /// Target collection
    pub collection: String,
    /// Index over the key field
    pub index: String,
    /// Natural key field
    pub key_field: String,
    /// Fields refreshed on existing records
    pub refresh: RefreshPolicy,
    /// Entries in application order
    pub entries: Vec<SeedEntry>,
}

impl SeedPlan {
    /// Plan keyed by `slug` through `by_slug`, refreshing nothing
    #[must_use]
    pub fn new(collection: impl Into<String>, entries: Vec<SeedEntry>) -> Self {
        Self {
            collection: collection.into(),
            index: DEFAULT_KEY_INDEX.to_string(),
            key_field: DEFAULT_KEY_FIELD.to_string(),
            refresh: RefreshPolicy::none(),
            entries,
        }
    }

    /// With key index
    #[must_use]
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    /// With key field
    #[must_use]
    pub fn with_key_field(mut self, key_field: impl Into<String>) -> Self {
        self.key_field = key_field.into();
        self
    }

    /// With refresh policy
    #[must_use]
    pub fn with_refresh(mut self, refresh: RefreshPolicy) -> Self {
        self.refresh = refresh;
        self
    }

    /// Check every entry before touching the store
    ///
    /// # Errors
    /// `SeedError::InvalidEntry` for an invalid key, or a payload key field
    /// that disagrees with the entry key
    ///
    /// Slug keys must be lowercase-kebab; any other key field only has to be
    /// non-blank.
    pub fn validate(&self) -> Result<(), SeedError> {
        let slug_keyed = self.key_field == DEFAULT_KEY_FIELD;
        for (position, entry) in self.entries.iter().enumerate() {
            if slug_keyed && !is_valid_slug(&entry.key) {
                return Err(SeedError::invalid_entry(
                    position,
                    &entry.key,
                    "key must be a lowercase-kebab slug",
                ));
            }
            if entry.key.trim().is_empty() {
                return Err(SeedError::invalid_entry(position, &entry.key, "key is blank"));
            }
            match entry.payload.get(&self.key_field) {
                None => {}
                Some(Value::String(s)) if *s == entry.key => {}
                Some(other) => {
                    return Err(SeedError::invalid_entry(
                        position,
                        &entry.key,
                        format!("payload '{}' is {other}", self.key_field),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Keys that occur more than once, first occurrence order
    #[must_use]
    pub fn duplicate_keys(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut dups = Vec::new();
        for entry in &self.entries {
            if !seen.insert(entry.key.as_str()) && !dups.contains(&entry.key.as_str()) {
                dups.push(entry.key.as_str());
            }
        }
        dups
    }
}

/// Outcome of a reconciler run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    /// Entries inserted as new records
    pub inserted: usize,
    /// Entries matched to an existing record (refreshed, not inserted)
    pub skipped: usize,
    /// Entries processed, always `inserted + skipped`
    pub total: usize,
}

/// Insert-or-refresh over a store
pub struct SeedReconciler<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> SeedReconciler<'a, S> {
    /// Create reconciler over a store
    #[inline]
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Apply `plan`
    ///
    /// # Errors
    /// - `SeedError::InvalidEntry` before any store call
    /// - `SeedError::Store` on the first failing store call; entries already
    ///   applied stay applied
    pub async fn reconcile(&self, plan: &SeedPlan) -> Result<SeedReport, SeedError> {
        plan.validate()?;

        let duplicates = plan.duplicate_keys();
        if !duplicates.is_empty() {
            tracing::warn!(
                collection = %plan.collection,
                keys = ?duplicates,
                "seed plan repeats keys; later occurrences refresh the first"
            );
        }

        tracing::info!(
            collection = %plan.collection,
            entries = plan.entries.len(),
            "seeding"
        );

        let checker = UniquenessChecker::new(self.store);
        let mut report = SeedReport::default();

        for entry in &plan.entries {
            let key = Value::String(entry.key.clone());
            let existing = checker.find(&plan.collection, &plan.index, &key).await?;

            match existing {
                None => {
                    let id = self
                        .store
                        .insert(&plan.collection, entry.document(&plan.key_field))
                        .await?;
                    tracing::debug!(collection = %plan.collection, key = %entry.key, %id, "inserted");
                    report.inserted += 1;
                }
                Some(record) => {
                    let patch = plan.refresh.patch_for(entry, &plan.key_field);
                    if patch.is_empty() {
                        tracing::debug!(collection = %plan.collection, key = %entry.key, "exists, nothing to refresh");
                    } else {
                        let fields = patch.len();
                        self.store.patch(&record.id, patch).await?;
                        tracing::debug!(collection = %plan.collection, key = %entry.key, fields, "refreshed");
                    }
                    report.skipped += 1;
                }
            }
            report.total += 1;
        }

        tracing::info!(
            collection = %plan.collection,
            inserted = report.inserted,
            skipped = report.skipped,
            total = report.total,
            "seed complete"
        );
        Ok(report)
    }
}
