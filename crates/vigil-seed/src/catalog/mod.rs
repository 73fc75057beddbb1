//! Canonical seed data
//!
//! Canonical entries are plain values handed to the reconciler, never
//! module-level state it reads behind the caller's back. Each target comes
//! with computed SEO fields, which are its default refreshable fields.
//!
//! Entries can also come from a JSON or YAML file: a list of objects that
//! each carry the key field.

pub mod communes;
pub mod seo;
pub mod services;
pub mod solutions;

use crate::config::VigilConfig;
use crate::error::CatalogError;
use crate::reconciler::{SeedEntry, SeedPlan};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Built-in seed target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedTarget {
    /// Communes served
    Communes,
    /// Security services
    Services,
    /// Sector solutions
    Solutions,
}

impl SeedTarget {
    /// Every target, in seeding order
    pub const ALL: [SeedTarget; 3] = [Self::Communes, Self::Services, Self::Solutions];

    /// Target collection
    #[inline]
    #[must_use]
    pub fn collection(self) -> &'static str {
        match self {
            Self::Communes => communes::COLLECTION,
            Self::Services => services::COLLECTION,
            Self::Solutions => solutions::COLLECTION,
        }
    }

    /// Canonical entries
    #[must_use]
    pub fn entries(self) -> Vec<SeedEntry> {
        match self {
            Self::Communes => communes::COMMUNES.iter().map(communes::Commune::to_entry).collect(),
            Self::Services => services::SERVICES
                .iter()
                .enumerate()
                .map(|(order, s)| s.to_entry(order))
                .collect(),
            Self::Solutions => solutions::SOLUTIONS
                .iter()
                .enumerate()
                .map(|(order, s)| s.to_entry(order))
                .collect(),
        }
    }

    /// Plan over the canonical entries, shaped by `config`
    #[must_use]
    pub fn plan(self, config: &VigilConfig) -> SeedPlan {
        plan_for(self.collection(), self.entries(), config)
    }
}

impl fmt::Display for SeedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

impl FromStr for SeedTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|target| target.collection() == s)
            .ok_or_else(|| format!("unknown seed target '{s}'"))
    }
}

/// Plan for `collection`, using its configured index, key and refresh policy
#[must_use]
pub fn plan_for(collection: &str, entries: Vec<SeedEntry>, config: &VigilConfig) -> SeedPlan {
    let settings = config.seed_settings(collection);
    SeedPlan::new(collection, entries)
        .with_index(settings.index)
        .with_key_field(settings.key_field)
        .with_refresh(settings.refresh)
}

/// Canonical communes
#[must_use]
pub fn communes() -> Vec<SeedEntry> {
    SeedTarget::Communes.entries()
}

/// Canonical services
#[must_use]
pub fn services() -> Vec<SeedEntry> {
    SeedTarget::Services.entries()
}

/// Canonical solutions
#[must_use]
pub fn solutions() -> Vec<SeedEntry> {
    SeedTarget::Solutions.entries()
}

/// Load entries from a `.json`, `.yaml` or `.yml` file
///
/// # Errors
/// IO and parse failures, or an element without a string `key_field`
pub fn load(path: impl AsRef<Path>, key_field: &str) -> Result<Vec<SeedEntry>, CatalogError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let items: Vec<Value> = match extension.as_str() {
        "json" => serde_json::from_str(&text)?,
        "yaml" | "yml" => serde_yaml::from_str(&text)?,
        other => return Err(CatalogError::UnsupportedFormat(other.to_string())),
    };

    let entries = entries_from_values(items, key_field)?;
    tracing::debug!(path = %path.display(), entries = entries.len(), "seed entries loaded");
    Ok(entries)
}

/// Turn parsed objects into entries keyed by `key_field`
///
/// # Errors
/// An element that is not an object or lacks a string `key_field`
pub fn entries_from_values(
    items: Vec<Value>,
    key_field: &str,
) -> Result<Vec<SeedEntry>, CatalogError> {
    items
        .into_iter()
        .enumerate()
        .map(|(position, item)| {
            let Value::Object(payload) = item else {
                return Err(CatalogError::NotAnObject(position));
            };
            let key = payload
                .get(key_field)
                .and_then(Value::as_str)
                .ok_or_else(|| CatalogError::MissingKey {
                    position,
                    key_field: key_field.to_string(),
                })?
                .to_string();
            Ok(SeedEntry::new(key, payload))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slug::is_valid_slug;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn canonical_keys_are_unique_valid_slugs() {
        for target in SeedTarget::ALL {
            let entries = target.entries();
            assert!(!entries.is_empty(), "{target}");

            let mut seen = HashSet::new();
            for entry in &entries {
                assert!(is_valid_slug(&entry.key), "{target}: {}", entry.key);
                assert!(seen.insert(entry.key.clone()), "{target}: duplicate {}", entry.key);
            }
        }
    }

    #[test]
    fn canonical_plans_validate() {
        let config = VigilConfig::default();
        for target in SeedTarget::ALL {
            assert!(target.plan(&config).validate().is_ok(), "{target}");
        }
    }

    #[test]
    fn entries_carry_seo_fields() {
        for entry in communes() {
            assert!(entry.payload.contains_key(seo::SEO_TITLE));
            assert!(entry.payload.contains_key(seo::SEO_DESCRIPTION));
        }
    }

    #[test]
    fn target_round_trips_through_str() {
        for target in SeedTarget::ALL {
            assert_eq!(target.to_string().parse::<SeedTarget>(), Ok(target));
        }
        assert!("blog_posts".parse::<SeedTarget>().is_err());
    }

    #[test]
    fn load_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("communes.json");
        std::fs::write(&json_path, r#"[{"slug": "a", "name": "A"}, {"slug": "b"}]"#).unwrap();
        let entries = load(&json_path, "slug").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].payload.get("name"), Some(&json!("A")));

        let yaml_path = dir.path().join("communes.yml");
        std::fs::write(&yaml_path, "- slug: c\n  name: C\n").unwrap();
        let entries = load(&yaml_path, "slug").unwrap();
        assert_eq!(entries[0].key, "c");
    }

    #[test]
    fn load_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();

        let txt = dir.path().join("entries.txt");
        std::fs::write(&txt, "[]").unwrap();
        assert!(matches!(load(&txt, "slug"), Err(CatalogError::UnsupportedFormat(_))));

        assert!(matches!(
            entries_from_values(vec![json!({"name": "no slug"})], "slug"),
            Err(CatalogError::MissingKey { position: 0, .. })
        ));
        assert!(matches!(
            entries_from_values(vec![json!("string")], "slug"),
            Err(CatalogError::NotAnObject(0))
        ));
    }
}
