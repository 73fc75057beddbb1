//! Admin content conventions
//!
//! Every content type in the admin panel follows the same rules:
//! - slugs are lowercase-kebab and unique per collection, checked through
//!   the slug index before any write
//! - new documents start active
//! - removal from the site is a soft delete (`is_active = false`)

use crate::error::ContentError;
use crate::reconciler::{DEFAULT_KEY_FIELD, DEFAULT_KEY_INDEX};
use crate::slug::is_valid_slug;
use crate::uniqueness::UniquenessChecker;
use serde_json::Value;
use vigil_store::{DocumentId, DocumentStore, FieldUpdate, Fields, Patch, Record, StoreError};

/// Soft-delete flag
pub const IS_ACTIVE: &str = "is_active";

/// Slug-checked CRUD over any content collection
pub struct ContentRepository<'a, S: ?Sized> {
    store: &'a S,
    index: String,
}

impl<'a, S: DocumentStore + ?Sized> ContentRepository<'a, S> {
    /// Create repository using the `by_slug` index
    #[inline]
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            index: DEFAULT_KEY_INDEX.to_string(),
        }
    }

    /// With slug index name
    #[inline]
    #[must_use]
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    /// Create a document
    ///
    /// # Errors
    /// - `MissingSlug` / `InvalidSlug` for a bad slug
    /// - `SlugConflict` if the slug is taken
    pub async fn create(
        &self,
        collection: &str,
        mut fields: Fields,
    ) -> Result<DocumentId, ContentError> {
        let slug = match fields.get(DEFAULT_KEY_FIELD) {
            Some(Value::String(slug)) => slug.clone(),
            _ => return Err(ContentError::MissingSlug(collection.to_string())),
        };
        self.ensure_available(collection, &slug, None).await?;

        fields
            .entry(IS_ACTIVE.to_string())
            .or_insert(Value::Bool(true));
        let id = self.store.insert(collection, fields).await?;
        tracing::info!(collection, %slug, %id, "content created");
        Ok(id)
    }

    /// Update a document
    ///
    /// # Errors
    /// - `StoreError::DocumentNotFound` if `id` does not exist
    /// - `InvalidSlug` / `SlugConflict` if the patch changes the slug badly
    pub async fn update(&self, id: &DocumentId, patch: Patch) -> Result<(), ContentError> {
        let record = self.require(id).await?;

        match patch.get(DEFAULT_KEY_FIELD) {
            None => {}
            Some(FieldUpdate::Set(Value::String(slug))) => {
                if record.slug() != Some(slug.as_str()) {
                    self.ensure_available(&record.collection, slug, Some(id))
                        .await?;
                }
            }
            Some(_) => return Err(ContentError::MissingSlug(record.collection)),
        }

        self.store.patch(id, patch).await?;
        tracing::info!(collection = %record.collection, %id, "content updated");
        Ok(())
    }

    /// Soft delete
    ///
    /// # Errors
    /// `StoreError::DocumentNotFound` if `id` does not exist
    pub async fn deactivate(&self, id: &DocumentId) -> Result<(), ContentError> {
        self.set_active(id, false).await
    }

    /// Undo a soft delete
    ///
    /// # Errors
    /// `StoreError::DocumentNotFound` if `id` does not exist
    pub async fn reactivate(&self, id: &DocumentId) -> Result<(), ContentError> {
        self.set_active(id, true).await
    }

    /// Documents not soft-deleted, in creation order
    ///
    /// A document without the flag counts as active.
    ///
    /// # Errors
    /// Store failures
    pub async fn list_active(&self, collection: &str) -> Result<Vec<Record>, ContentError> {
        let records = self.store.collect(collection).await?;
        Ok(records.into_iter().filter(is_active).collect())
    }

    /// Hard delete, for admin cleanup only
    ///
    /// # Errors
    /// `StoreError::DocumentNotFound` if `id` does not exist
    pub async fn remove(&self, id: &DocumentId) -> Result<(), ContentError> {
        self.store.delete(id).await?;
        tracing::warn!(%id, "content hard-deleted");
        Ok(())
    }

    async fn set_active(&self, id: &DocumentId, active: bool) -> Result<(), ContentError> {
        self.require(id).await?;
        self.store
            .patch(id, Patch::new().set(IS_ACTIVE, active))
            .await?;
        tracing::info!(%id, active, "content visibility changed");
        Ok(())
    }

    async fn require(&self, id: &DocumentId) -> Result<Record, ContentError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| StoreError::DocumentNotFound(id.clone()).into())
    }

    async fn ensure_available(
        &self,
        collection: &str,
        slug: &str,
        excluding: Option<&DocumentId>,
    ) -> Result<(), ContentError> {
        if !is_valid_slug(slug) {
            return Err(ContentError::InvalidSlug(slug.to_string()));
        }
        let checker = UniquenessChecker::new(self.store);
        let holder = checker
            .is_taken(collection, &self.index, &Value::String(slug.to_string()), excluding)
            .await?;
        match holder {
            Some(holder) => Err(ContentError::SlugConflict {
                collection: collection.to_string(),
                slug: slug.to_string(),
                holder,
            }),
            None => Ok(()),
        }
    }
}

/// `is_active` is anything but `false`
#[must_use]
pub fn is_active(record: &Record) -> bool {
    record.get(IS_ACTIVE) != Some(&Value::Bool(false))
}
