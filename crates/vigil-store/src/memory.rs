//! In-process document store
//!
//! [`InMemoryStore`] implements [`DocumentStore`] with the same observable
//! semantics the seed and migration flows rely on from the hosted store:
//! - index-backed `first_by_index` (undefined indexes are rejected)
//! - creation-ordered `collect`
//! - per-document atomic `patch`, where `Remove` drops the key
//!
//! State sits behind a single `RwLock`; each call takes the lock once, so
//! every mutation is atomic with respect to every other call.

use crate::client::DocumentStore;
use crate::error::{StoreError, StoreResult};
use crate::index::{FieldIndex, IndexSpec};
use crate::record::{DocumentId, Fields, Patch, Record};
use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

/// Collection name -> documents in creation order
pub(crate) type Collections = IndexMap<String, IndexMap<DocumentId, Record>>;

#[derive(Debug, Default)]
struct StoreState {
    collections: Collections,
    /// id -> owning collection
    locations: HashMap<DocumentId, String>,
    /// (collection, index name) -> postings
    indexes: HashMap<(String, String), FieldIndex>,
}

impl StoreState {
    fn indexes_of<'a>(
        &'a mut self,
        collection: &'a str,
    ) -> impl Iterator<Item = &'a mut FieldIndex> + 'a {
        self.indexes
            .iter_mut()
            .filter(move |((owner, _), _)| owner == collection)
            .map(|(_, index)| index)
    }
}

/// Document store held in memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`InMemoryStore::define_index`]
    #[must_use]
    pub fn with_index(self, spec: IndexSpec) -> Self {
        self.define_index(spec);
        self
    }

    /// Define (or redefine) an index and build it over existing documents
    pub fn define_index(&self, spec: IndexSpec) {
        let mut state = self.state.write();
        let mut index = FieldIndex::new(spec.clone());
        if let Some(docs) = state.collections.get(&spec.collection) {
            for (id, record) in docs {
                index.add(id, &record.fields);
            }
        }
        tracing::debug!(
            collection = %spec.collection,
            index = %spec.name,
            field = %spec.field,
            "index defined"
        );
        state.indexes.insert((spec.collection, spec.name), index);
    }

    /// Every defined index
    #[must_use]
    pub fn index_specs(&self) -> Vec<IndexSpec> {
        let state = self.state.read();
        let mut specs: Vec<IndexSpec> = state
            .indexes
            .values()
            .map(|index| index.spec().clone())
            .collect();
        specs.sort_by(|a, b| (&a.collection, &a.name).cmp(&(&b.collection, &b.name)));
        specs
    }

    /// Names of collections holding at least one document
    #[must_use]
    pub fn collection_names(&self) -> Vec<String> {
        self.state
            .read()
            .collections
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Number of documents in a collection
    #[must_use]
    pub fn count(&self, collection: &str) -> usize {
        self.state
            .read()
            .collections
            .get(collection)
            .map_or(0, IndexMap::len)
    }

    /// Copy of every document, grouped by collection
    pub(crate) fn export(&self) -> Collections {
        self.state.read().collections.clone()
    }

    /// Replace all documents, rebuilding every index
    pub(crate) fn import(&self, collections: Collections) {
        let mut state = self.state.write();
        let mut locations = HashMap::new();
        for (name, docs) in &collections {
            for id in docs.keys() {
                locations.insert(id.clone(), name.clone());
            }
        }
        for ((collection, _), index) in &mut state.indexes {
            let mut rebuilt = FieldIndex::new(index.spec().clone());
            if let Some(docs) = collections.get(collection) {
                for (id, record) in docs {
                    rebuilt.add(id, &record.fields);
                }
            }
            *index = rebuilt;
        }
        state.collections = collections;
        state.locations = locations;
    }
}

fn validate_fields(fields: &Fields) -> StoreResult<()> {
    match fields.keys().find(|key| key.starts_with('_')) {
        Some(key) => Err(StoreError::InvalidDocument(format!(
            "field '{key}' uses the reserved '_' prefix"
        ))),
        None => Ok(()),
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn get(&self, id: &DocumentId) -> StoreResult<Option<Record>> {
        let state = self.state.read();
        Ok(state
            .locations
            .get(id)
            .and_then(|collection| state.collections.get(collection))
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn first_by_index(
        &self,
        collection: &str,
        index: &str,
        value: &Value,
    ) -> StoreResult<Option<Record>> {
        let state = self.state.read();
        let field_index = state
            .indexes
            .get(&(collection.to_string(), index.to_string()))
            .ok_or_else(|| StoreError::unknown_index(collection, index))?;

        Ok(field_index
            .first(value)
            .and_then(|id| state.collections.get(collection)?.get(id))
            .cloned())
    }

    async fn collect(&self, collection: &str) -> StoreResult<Vec<Record>> {
        let state = self.state.read();
        Ok(state
            .collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn insert(&self, collection: &str, fields: Fields) -> StoreResult<DocumentId> {
        validate_fields(&fields)?;

        let id = DocumentId::generate();
        let record = Record {
            id: id.clone(),
            collection: collection.to_string(),
            created_at: Utc::now(),
            fields,
        };

        let mut state = self.state.write();
        for index in state.indexes_of(collection) {
            index.add(&id, &record.fields);
        }
        state.locations.insert(id.clone(), collection.to_string());
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), record);

        tracing::trace!(collection, %id, "document inserted");
        Ok(id)
    }

    async fn patch(&self, id: &DocumentId, patch: Patch) -> StoreResult<()> {
        for (field, _) in patch.iter() {
            if field.starts_with('_') {
                return Err(StoreError::InvalidDocument(format!(
                    "field '{field}' uses the reserved '_' prefix"
                )));
            }
        }

        let mut state = self.state.write();
        let collection = state
            .locations
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::DocumentNotFound(id.clone()))?;

        let before = state
            .collections
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .map(|record| record.fields.clone())
            .ok_or_else(|| StoreError::DocumentNotFound(id.clone()))?;

        let mut after = before.clone();
        patch.apply_to(&mut after);

        for index in state.indexes_of(&collection) {
            let field = &index.spec().field;
            if before.get(field) != after.get(field) {
                index.remove(id, &before);
                index.add(id, &after);
            }
        }

        if let Some(record) = state
            .collections
            .get_mut(&collection)
            .and_then(|docs| docs.get_mut(id))
        {
            record.fields = after;
        }

        tracing::trace!(collection = %collection, %id, fields = patch.len(), "document patched");
        Ok(())
    }

    async fn delete(&self, id: &DocumentId) -> StoreResult<()> {
        let mut state = self.state.write();
        let collection = state
            .locations
            .remove(id)
            .ok_or_else(|| StoreError::DocumentNotFound(id.clone()))?;

        let removed = state
            .collections
            .get_mut(&collection)
            .and_then(|docs| docs.shift_remove(id));

        if let Some(record) = removed {
            for index in state.indexes_of(&collection) {
                index.remove(id, &record.fields);
            }
        }

        tracing::trace!(collection = %collection, %id, "document deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap_or_default()
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new().with_index(IndexSpec::by_field("communes", "slug"))
    }

    #[tokio::test]
    async fn insert_then_lookup_by_index() {
        let store = store();
        let id = store
            .insert("communes", fields(json!({"slug": "paris", "name": "Paris"})))
            .await
            .unwrap();

        let found = store
            .first_by_index("communes", "by_slug", &json!("paris"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.str_field("name"), Some("Paris"));

        let missing = store
            .first_by_index("communes", "by_slug", &json!("lyon"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn undefined_index_is_rejected() {
        let store = store();
        let result = store
            .first_by_index("services", "by_slug", &json!("guarding"))
            .await;
        assert!(matches!(result, Err(StoreError::UnknownIndex { .. })));
    }

    #[tokio::test]
    async fn patch_remove_and_reindex() {
        let store = store();
        let id = store
            .insert(
                "communes",
                fields(json!({"slug": "paris", "meta_title": "legacy"})),
            )
            .await
            .unwrap();

        store
            .patch(&id, Patch::new().remove("meta_title").set("slug", "paris-75"))
            .await
            .unwrap();

        let record = store.get(&id).await.unwrap().unwrap();
        assert!(!record.contains("meta_title"));

        assert!(store
            .first_by_index("communes", "by_slug", &json!("paris"))
            .await
            .unwrap()
            .is_none());
        assert!(store
            .first_by_index("communes", "by_slug", &json!("paris-75"))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn rewriting_same_key_keeps_oldest_match_first() {
        let store = store();
        let older = store
            .insert("communes", fields(json!({"slug": "paris"})))
            .await
            .unwrap();
        store
            .insert("communes", fields(json!({"slug": "paris"})))
            .await
            .unwrap();

        store
            .patch(&older, Patch::new().set("slug", "paris").set("name", "Paris"))
            .await
            .unwrap();

        let found = store
            .first_by_index("communes", "by_slug", &json!("paris"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, older);
    }

    #[tokio::test]
    async fn patch_missing_document_fails() {
        let store = store();
        let result = store
            .patch(&DocumentId::from("nope"), Patch::new().set("a", 1))
            .await;
        assert!(matches!(result, Err(StoreError::DocumentNotFound(_))));
    }

    #[tokio::test]
    async fn collect_keeps_creation_order() {
        let store = store();
        for slug in ["c", "a", "b"] {
            store
                .insert("communes", fields(json!({ "slug": slug })))
                .await
                .unwrap();
        }

        let slugs: Vec<String> = store
            .collect("communes")
            .await
            .unwrap()
            .iter()
            .filter_map(|r| r.slug().map(str::to_string))
            .collect();
        assert_eq!(slugs, vec!["c", "a", "b"]);
        assert!(store.collect("empty").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_unindexes_document() {
        let store = store();
        let id = store
            .insert("communes", fields(json!({"slug": "paris"})))
            .await
            .unwrap();

        store.delete(&id).await.unwrap();

        assert!(store.get(&id).await.unwrap().is_none());
        assert_eq!(store.count("communes"), 0);
        assert!(store
            .first_by_index("communes", "by_slug", &json!("paris"))
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            store.delete(&id).await,
            Err(StoreError::DocumentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn index_defined_late_covers_existing_documents() {
        let store = InMemoryStore::new();
        store
            .insert("services", fields(json!({"slug": "guarding"})))
            .await
            .unwrap();

        store.define_index(IndexSpec::by_field("services", "slug"));

        assert!(store
            .first_by_index("services", "by_slug", &json!("guarding"))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn reserved_fields_are_rejected() {
        let store = store();
        let result = store
            .insert("communes", fields(json!({"_id": "x", "slug": "paris"})))
            .await;
        assert!(matches!(result, Err(StoreError::InvalidDocument(_))));
    }
}
