//! Batch Orchestrator
//!
//! Runs a fixed sequence of legacy-field migrations and folds their reports
//! into one, keyed by collection in run order. The first error aborts the
//! batch; migrations already run keep their effects.

use crate::error::MigrationError;
use crate::legacy::LegacyFieldSet;
use crate::migrator::{LegacyFieldMigrator, MigrationReport};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use vigil_store::DocumentStore;

/// Combined report, keyed by collection name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchReport {
    reports: IndexMap<String, MigrationReport>,
}

impl BatchReport {
    /// Report for one collection
    #[inline]
    #[must_use]
    pub fn get(&self, collection: &str) -> Option<&MigrationReport> {
        self.reports.get(collection)
    }

    /// Reports in run order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MigrationReport)> {
        self.reports.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Records patched across all collections
    #[must_use]
    pub fn migrated(&self) -> usize {
        self.reports.values().map(|r| r.migrated).sum()
    }

    /// Number of collections migrated
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// No migration ran
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    fn record(&mut self, collection: &str, report: MigrationReport) {
        self.reports.insert(collection.to_string(), report);
    }
}

/// Ordered set of migrations run as one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationBatch {
    sets: Vec<LegacyFieldSet>,
}

impl MigrationBatch {
    /// Batch over explicit sets, run in the given order
    #[inline]
    #[must_use]
    pub fn new(sets: Vec<LegacyFieldSet>) -> Self {
        Self { sets }
    }

    /// Industries, then solutions, then site config
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            LegacyFieldSet::industries(),
            LegacyFieldSet::solutions(),
            LegacyFieldSet::site_config(),
        ])
    }

    /// Field sets in run order
    #[inline]
    #[must_use]
    pub fn sets(&self) -> &[LegacyFieldSet] {
        &self.sets
    }

    /// Run every migration in order
    ///
    /// # Errors
    /// The first migration error, unchanged
    pub async fn run<S: DocumentStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<BatchReport, MigrationError> {
        tracing::info!(migrations = self.sets.len(), "running migration batch");

        let mut batch = BatchReport::default();
        for set in &self.sets {
            let migrator = LegacyFieldMigrator::new(store, set.clone());
            let report = migrator.run().await?;
            batch.record(&set.collection, report);
        }

        tracing::info!(migrated = batch.migrated(), "migration batch complete");
        Ok(batch)
    }
}

impl Default for MigrationBatch {
    fn default() -> Self {
        Self::standard()
    }
}

/// Run the standard batch
///
/// # Errors
/// The first migration error, unchanged
pub async fn run_all_migrations<S: DocumentStore + ?Sized>(
    store: &S,
) -> Result<BatchReport, MigrationError> {
    MigrationBatch::standard().run(store).await
}
