//! Natural-key lookups
//!
//! The only enforcement of slug uniqueness: the store has no uniqueness
//! constraint, so every writer that must not duplicate a key asks here
//! first. Lookups always go through a named index.

use serde_json::Value;
use vigil_store::{DocumentId, DocumentStore, Record, StoreResult};

/// Index-backed existence check
pub struct UniquenessChecker<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> UniquenessChecker<'a, S> {
    /// Create checker over a store
    #[inline]
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Record holding `value` under `index`, or `None`
    ///
    /// # Errors
    /// Store failures, unchanged
    pub async fn find(
        &self,
        collection: &str,
        index: &str,
        value: &Value,
    ) -> StoreResult<Option<Record>> {
        self.store.first_by_index(collection, index, value).await
    }

    /// Whether `value` is held by a record other than `excluding`
    ///
    /// # Errors
    /// Store failures, unchanged
    pub async fn is_taken(
        &self,
        collection: &str,
        index: &str,
        value: &Value,
        excluding: Option<&DocumentId>,
    ) -> StoreResult<Option<DocumentId>> {
        let holder = self.find(collection, index, value).await?;
        Ok(holder
            .map(|record| record.id)
            .filter(|id| Some(id) != excluding))
    }
}
