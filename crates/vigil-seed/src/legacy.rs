//! Legacy field sets and the strip transform
//!
//! A [`LegacyField`] names something a previous schema version wrote:
//! either a top-level field, or a key inside every element of an
//! array-valued field. [`has_legacy_value`] is the one presence predicate
//! every migrator uses; [`LegacyFieldSet::strip_patch`] turns the present
//! fields of a record into a single patch.

use crate::error::MigrationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vigil_store::{Patch, Record};

/// Industries collection
pub const INDUSTRIES: &str = "industries";
/// Solutions collection
pub const SOLUTIONS: &str = "solutions";
/// Site configuration collection
pub const SITE_CONFIG: &str = "site_config";

/// One deprecated field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LegacyField {
    /// Top-level field, removed outright
    Flat(String),
    /// Key stripped from every element of an array field; the array stays
    NestedArrayKey {
        /// Array-valued field
        array: String,
        /// Key removed from each element
        key: String,
    },
}

impl LegacyField {
    /// Top-level field
    #[inline]
    #[must_use]
    pub fn flat(name: impl Into<String>) -> Self {
        Self::Flat(name.into())
    }

    /// Key inside array elements
    #[inline]
    #[must_use]
    pub fn nested(array: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NestedArrayKey {
            array: array.into(),
            key: key.into(),
        }
    }

    /// Field the patch touches
    #[inline]
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Flat(name) => name,
            Self::NestedArrayKey { array, .. } => array,
        }
    }

    /// `name` or `array[].key`
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Flat(name) => name.clone(),
            Self::NestedArrayKey { array, key } => format!("{array}[].{key}"),
        }
    }
}

/// Whether `record` still carries `field`
///
/// Flat: the key exists (a `null` value counts). Nested: the array holds
/// at least one object element carrying the key. A nested target that is
/// missing or not an array has nothing to strip here; shape problems are
/// reported by [`LegacyFieldSet::strip_patch`].
#[must_use]
pub fn has_legacy_value(record: &Record, field: &LegacyField) -> bool {
    match field {
        LegacyField::Flat(name) => record.contains(name),
        LegacyField::NestedArrayKey { array, key } => match record.get(array) {
            Some(Value::Array(items)) => items
                .iter()
                .any(|item| item.as_object().is_some_and(|obj| obj.contains_key(key))),
            _ => false,
        },
    }
}

/// Ordered deprecated fields of one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyFieldSet {
    /// Collection the set applies to
    pub collection: String,
    /// Deprecated fields
    pub fields: Vec<LegacyField>,
}

impl LegacyFieldSet {
    /// Create set
    #[must_use]
    pub fn new(collection: impl Into<String>, fields: Vec<LegacyField>) -> Self {
        Self {
            collection: collection.into(),
            fields,
        }
    }

    /// Built-in set for `industries`
    #[must_use]
    pub fn industries() -> Self {
        Self::new(
            INDUSTRIES,
            ["id", "challenges", "solutions", "meta_title", "meta_description"]
                .into_iter()
                .map(LegacyField::flat)
                .collect(),
        )
    }

    /// Built-in set for `solutions`
    #[must_use]
    pub fn solutions() -> Self {
        Self::new(
            SOLUTIONS,
            ["id", "name", "relatedServices", "meta_title", "meta_description"]
                .into_iter()
                .map(LegacyField::flat)
                .collect(),
        )
    }

    /// Built-in set for `site_config`
    #[must_use]
    pub fn site_config() -> Self {
        Self::new(
            SITE_CONFIG,
            vec![
                LegacyField::flat("footer_config"),
                LegacyField::nested("navbar_items", "path"),
            ],
        )
    }

    /// Built-in set for a collection, if there is one
    #[must_use]
    pub fn builtin(collection: &str) -> Option<Self> {
        match collection {
            INDUSTRIES => Some(Self::industries()),
            SOLUTIONS => Some(Self::solutions()),
            SITE_CONFIG => Some(Self::site_config()),
            _ => None,
        }
    }

    /// Patch clearing every legacy field present on `record`
    ///
    /// Returns `None` when the record is already clean.
    ///
    /// # Errors
    /// `MigrationError::MalformedField` if a nested target exists but is not
    /// an array of objects
    pub fn strip_patch(&self, record: &Record) -> Result<Option<Patch>, MigrationError> {
        let mut patch = Patch::new();

        for field in &self.fields {
            match field {
                LegacyField::Flat(name) => {
                    if has_legacy_value(record, field) {
                        patch = patch.remove(name.clone());
                    }
                }
                LegacyField::NestedArrayKey { array, key } => {
                    let Some(value) = record.get(array) else {
                        continue;
                    };
                    let stripped = strip_elements(value, key)
                        .map_err(|reason| self.malformed(record, field, reason))?;
                    if let Some(items) = stripped {
                        patch = patch.set(array.clone(), Value::Array(items));
                    }
                }
            }
        }

        Ok((!patch.is_empty()).then_some(patch))
    }

    fn malformed(&self, record: &Record, field: &LegacyField, reason: String) -> MigrationError {
        MigrationError::MalformedField {
            collection: self.collection.clone(),
            id: record.id.clone(),
            field: field.label(),
            reason,
        }
    }
}

/// Array with `key` removed from every element, or `None` if no element
/// had it
fn strip_elements(value: &Value, key: &str) -> Result<Option<Vec<Value>>, String> {
    let Value::Array(items) = value else {
        return Err(format!("expected an array, found {}", kind(value)));
    };

    let mut changed = false;
    let mut out = Vec::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        let Value::Object(obj) = item else {
            return Err(format!(
                "element {position} is {}, expected an object",
                kind(item)
            ));
        };
        if obj.contains_key(key) {
            changed = true;
            let kept: Map<String, Value> = obj
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            out.push(Value::Object(kept));
        } else {
            out.push(item.clone());
        }
    }

    Ok(changed.then_some(out))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
