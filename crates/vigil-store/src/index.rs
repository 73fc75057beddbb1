//! Named single-field indexes
//!
//! Lookups by natural key go through an [`IndexSpec`]. [`FieldIndex`] keeps
//! key -> ids postings for one spec, in insertion order so `first` returns
//! the oldest matching document.

use crate::record::{DocumentId, Fields};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Declaration of an index over one field of one collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Index name, unique per collection
    pub name: String,
    /// Indexed collection
    pub collection: String,
    /// Indexed field
    pub field: String,
}

impl IndexSpec {
    /// Create index spec
    #[inline]
    #[must_use]
    pub fn new(
        collection: impl Into<String>,
        name: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            collection: collection.into(),
            field: field.into(),
        }
    }

    /// Conventional `by_<field>` index
    #[inline]
    #[must_use]
    pub fn by_field(collection: impl Into<String>, field: &str) -> Self {
        Self::new(collection, format!("by_{field}"), field)
    }
}

/// Canonical key of an indexed value
///
/// Compact JSON text, so `"1"` and `1` stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct IndexKey(String);

impl IndexKey {
    pub(crate) fn of(value: &Value) -> Self {
        Self(value.to_string())
    }
}

/// Postings for one index
#[derive(Debug, Clone)]
pub(crate) struct FieldIndex {
    spec: IndexSpec,
    postings: BTreeMap<IndexKey, Vec<DocumentId>>,
}

impl FieldIndex {
    pub(crate) fn new(spec: IndexSpec) -> Self {
        Self {
            spec,
            postings: BTreeMap::new(),
        }
    }

    pub(crate) fn spec(&self) -> &IndexSpec {
        &self.spec
    }

    /// Index a document; documents without the field are not indexed
    pub(crate) fn add(&mut self, id: &DocumentId, fields: &Fields) {
        if let Some(value) = fields.get(&self.spec.field) {
            self.postings
                .entry(IndexKey::of(value))
                .or_default()
                .push(id.clone());
        }
    }

    /// Drop a document from the postings of its current value
    pub(crate) fn remove(&mut self, id: &DocumentId, fields: &Fields) {
        let Some(value) = fields.get(&self.spec.field) else {
            return;
        };
        let key = IndexKey::of(value);
        if let Some(ids) = self.postings.get_mut(&key) {
            ids.retain(|existing| existing != id);
            if ids.is_empty() {
                self.postings.remove(&key);
            }
        }
    }

    /// Oldest document indexed under `value`
    pub(crate) fn first(&self, value: &Value) -> Option<&DocumentId> {
        self.postings
            .get(&IndexKey::of(value))
            .and_then(|ids| ids.first())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.postings.values().map(Vec::len).sum()
    }
}
