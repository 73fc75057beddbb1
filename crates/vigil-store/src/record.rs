//! Documents, identifiers and patches
//!
//! A [`Record`] is a loosely-shaped JSON document plus a system-assigned
//! [`DocumentId`]. Absence and "cleared" are the same state: a field removed
//! through [`FieldUpdate::Remove`] is gone from the map, while JSON `null` is
//! a present value.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Field map of a document
pub type Fields = serde_json::Map<String, Value>;

/// System-assigned document identifier
///
/// ULID text, so identifiers sort by creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generate a fresh identifier
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Borrow as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// System identifier
    pub id: DocumentId,
    /// Owning collection
    pub collection: String,
    /// Creation time, assigned by the store
    pub created_at: DateTime<Utc>,
    /// Document body
    pub fields: Fields,
}

impl Record {
    /// Get a field value
    #[inline]
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Whether the field key exists (a `null` value counts as present)
    #[inline]
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Get a string field
    #[inline]
    #[must_use]
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// Natural key, if the document carries a `slug`
    #[inline]
    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        self.str_field("slug")
    }
}

/// Single-field change in a [`Patch`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum FieldUpdate {
    /// Overwrite the field with a value
    Set(Value),
    /// Remove the field from the document
    Remove,
}

/// Partial update applied atomically to one document
///
/// Field order is kept so applied patches are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    updates: IndexMap<String, FieldUpdate>,
}

impl Patch {
    /// Create empty patch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field
    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.updates
            .insert(field.into(), FieldUpdate::Set(value.into()));
        self
    }

    /// Remove a field
    #[must_use]
    pub fn remove(mut self, field: impl Into<String>) -> Self {
        self.updates.insert(field.into(), FieldUpdate::Remove);
        self
    }

    /// Insert an update in place
    pub fn push(&mut self, field: impl Into<String>, update: FieldUpdate) {
        self.updates.insert(field.into(), update);
    }

    /// No field touched
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Number of touched fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Update for a field, if any
    #[inline]
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldUpdate> {
        self.updates.get(field)
    }

    /// Iterate updates in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldUpdate)> {
        self.updates.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Apply to a field map
    pub fn apply_to(&self, fields: &mut Fields) {
        for (field, update) in &self.updates {
            match update {
                FieldUpdate::Set(value) => {
                    fields.insert(field.clone(), value.clone());
                }
                FieldUpdate::Remove => {
                    fields.remove(field);
                }
            }
        }
    }
}
