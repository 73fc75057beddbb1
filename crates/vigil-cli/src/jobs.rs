//! Batch jobs run against a snapshot-backed store

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use vigil_seed::catalog::{self, SeedTarget};
use vigil_seed::legacy::SITE_CONFIG;
use vigil_seed::{
    BatchReport, MigrationBatch, SeedReconciler, SeedReport, VigilConfig,
};
use vigil_store::{DocumentStore, InMemoryStore, Record};

/// Result of one job, printed on success
#[derive(Debug)]
pub(crate) enum JobOutput {
    Seed {
        collection: String,
        report: SeedReport,
    },
    Migrate(BatchReport),
    Inspect {
        collection: String,
        records: Vec<Record>,
    },
}

impl JobOutput {
    pub(crate) fn to_json(&self) -> Value {
        match self {
            Self::Seed { collection, report } => json!({ collection.as_str(): report }),
            Self::Migrate(report) => json!(report),
            Self::Inspect {
                collection,
                records,
            } => json!({ "collection": collection, "count": records.len(), "records": records }),
        }
    }

    pub(crate) fn to_text(&self) -> String {
        let mut out = String::new();
        match self {
            Self::Seed { collection, report } => {
                let _ = writeln!(
                    out,
                    "{collection}: inserted {}, skipped {}, total {}",
                    report.inserted, report.skipped, report.total
                );
            }
            Self::Migrate(batch) => {
                for (collection, report) in batch.iter() {
                    let _ = writeln!(
                        out,
                        "{collection}: migrated {} of {}",
                        report.migrated, report.total
                    );
                }
            }
            Self::Inspect {
                collection,
                records,
            } => {
                let _ = writeln!(out, "{collection}: {} documents", records.len());
                for record in records {
                    let _ = writeln!(
                        out,
                        "  {}  {}",
                        record.id,
                        record.slug().unwrap_or("-")
                    );
                }
            }
        }
        out
    }
}

/// Loaded configuration plus the store it points at
pub(crate) struct Workspace {
    config: VigilConfig,
    store: InMemoryStore,
    store_path: PathBuf,
}

impl Workspace {
    /// Load the snapshot and define every configured key index
    pub(crate) fn open(config: VigilConfig, store_override: Option<PathBuf>) -> Result<Self> {
        let store_path = store_override.unwrap_or_else(|| config.store_path.clone());
        let store = InMemoryStore::load(&store_path)
            .with_context(|| format!("loading store snapshot {}", store_path.display()))?;
        for spec in config.index_specs() {
            store.define_index(spec);
        }
        Ok(Self {
            config,
            store,
            store_path,
        })
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &InMemoryStore {
        &self.store
    }

    /// Write the snapshot back
    pub(crate) fn persist(&self) -> Result<()> {
        self.store
            .save(&self.store_path)
            .with_context(|| format!("saving store snapshot {}", self.store_path.display()))
    }

    /// Seed a built-in target, from the catalog or an entry file
    pub(crate) async fn seed(&self, target: SeedTarget, entries: Option<&Path>) -> Result<JobOutput> {
        let plan = match entries {
            None => target.plan(&self.config),
            Some(path) => {
                let key_field = self.config.seed_settings(target.collection()).key_field;
                let entries = catalog::load(path, &key_field)
                    .with_context(|| format!("reading seed entries {}", path.display()))?;
                catalog::plan_for(target.collection(), entries, &self.config)
            }
        };

        let report = SeedReconciler::new(&self.store)
            .reconcile(&plan)
            .await
            .with_context(|| format!("seeding {target}"))?;

        Ok(JobOutput::Seed {
            collection: target.collection().to_string(),
            report,
        })
    }

    /// Run one migration by collection name, or `all`
    pub(crate) async fn migrate(&self, which: &str) -> Result<JobOutput> {
        let batch = if which == "all" {
            self.config.migration_batch()
        } else {
            let collection = normalize_collection(which);
            let Some(set) = self.config.legacy_set(&collection) else {
                bail!("no legacy field set for collection '{collection}'");
            };
            MigrationBatch::new(vec![set])
        };

        let report = batch
            .run(&self.store)
            .await
            .with_context(|| format!("migrating {which}"))?;
        Ok(JobOutput::Migrate(report))
    }

    /// List a collection
    pub(crate) async fn inspect(&self, collection: &str) -> Result<JobOutput> {
        let collection = normalize_collection(collection);
        let records = self.store.collect(&collection).await?;
        Ok(JobOutput::Inspect {
            collection,
            records,
        })
    }
}

/// CLI spelling (`site-config`) to collection name (`site_config`)
fn normalize_collection(name: &str) -> String {
    if name == "site-config" {
        SITE_CONFIG.to_string()
    } else {
        name.to_string()
    }
}
