//! Legacy-Field Migrator
//!
//! Scans a whole collection and clears the fields of a [`LegacyFieldSet`]
//! with one patch per affected record. Records are never deleted, and a
//! clean record is never patched, so a second run reports `migrated: 0`.

use crate::error::MigrationError;
use crate::legacy::LegacyFieldSet;
use serde::{Deserialize, Serialize};
use vigil_store::DocumentStore;

/// Outcome of a migrator run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Records patched
    pub migrated: usize,
    /// Records scanned
    pub total: usize,
}

/// Strips legacy fields from one collection
pub struct LegacyFieldMigrator<'a, S: ?Sized> {
    store: &'a S,
    fields: LegacyFieldSet,
}

impl<'a, S: DocumentStore + ?Sized> LegacyFieldMigrator<'a, S> {
    /// Create migrator for a field set
    #[inline]
    #[must_use]
    pub fn new(store: &'a S, fields: LegacyFieldSet) -> Self {
        Self { store, fields }
    }

    /// Collection this migrator scans
    #[inline]
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.fields.collection
    }

    /// Run the migration
    ///
    /// # Errors
    /// - `MigrationError::Store` on the first failing read or patch
    /// - `MigrationError::MalformedField` on a nested field of the wrong shape
    ///
    /// Records patched before the error stay patched; no report is returned.
    pub async fn run(&self) -> Result<MigrationReport, MigrationError> {
        let collection = self.collection();
        let records = self.store.collect(collection).await?;

        tracing::info!(
            collection,
            records = records.len(),
            fields = ?self.fields.fields.iter().map(|f| f.label()).collect::<Vec<_>>(),
            "migrating legacy fields"
        );

        let mut report = MigrationReport {
            migrated: 0,
            total: records.len(),
        };

        for record in &records {
            let patch = match self.fields.strip_patch(record) {
                Ok(Some(patch)) => patch,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(collection, id = %record.id, error = %e, "migration aborted");
                    return Err(e);
                }
            };

            let cleared: Vec<&str> = patch.iter().map(|(field, _)| field).collect();
            tracing::debug!(collection, id = %record.id, fields = ?cleared, "clearing legacy fields");

            self.store.patch(&record.id, patch).await?;
            report.migrated += 1;
        }

        tracing::info!(
            collection,
            migrated = report.migrated,
            total = report.total,
            "migration complete"
        );
        Ok(report)
    }
}
