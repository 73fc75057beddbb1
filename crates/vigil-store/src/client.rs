//! Document store client interface
//!
//! The seed and migration flows only see this trait. Every call is an
//! asynchronous round-trip; implementations apply each mutation atomically
//! to a single document and offer no multi-document transaction.

use crate::error::StoreResult;
use crate::record::{DocumentId, Fields, Patch, Record};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Capability surface of the hosted document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id
    async fn get(&self, id: &DocumentId) -> StoreResult<Option<Record>>;

    /// First document of `collection` whose indexed field equals `value`
    ///
    /// # Errors
    /// `StoreError::UnknownIndex` if `index` is not defined on `collection`
    async fn first_by_index(
        &self,
        collection: &str,
        index: &str,
        value: &Value,
    ) -> StoreResult<Option<Record>>;

    /// Every document of a collection, in creation order
    async fn collect(&self, collection: &str) -> StoreResult<Vec<Record>>;

    /// Insert a document and return its new id
    async fn insert(&self, collection: &str, fields: Fields) -> StoreResult<DocumentId>;

    /// Apply a partial update to one document
    ///
    /// # Errors
    /// `StoreError::DocumentNotFound` if the document does not exist
    async fn patch(&self, id: &DocumentId, patch: Patch) -> StoreResult<()>;

    /// Delete a document
    async fn delete(&self, id: &DocumentId) -> StoreResult<()>;
}

#[async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    async fn get(&self, id: &DocumentId) -> StoreResult<Option<Record>> {
        (**self).get(id).await
    }

    async fn first_by_index(
        &self,
        collection: &str,
        index: &str,
        value: &Value,
    ) -> StoreResult<Option<Record>> {
        (**self).first_by_index(collection, index, value).await
    }

    async fn collect(&self, collection: &str) -> StoreResult<Vec<Record>> {
        (**self).collect(collection).await
    }

    async fn insert(&self, collection: &str, fields: Fields) -> StoreResult<DocumentId> {
        (**self).insert(collection, fields).await
    }

    async fn patch(&self, id: &DocumentId, patch: Patch) -> StoreResult<()> {
        (**self).patch(id, patch).await
    }

    async fn delete(&self, id: &DocumentId) -> StoreResult<()> {
        (**self).delete(id).await
    }
}
