//! Vigil Seed & Migrations
//!
//! Batch jobs that keep the content collections in shape:
//! - [`SeedReconciler`]: idempotent insert-or-refresh of canonical entries,
//!   matched by natural key through [`UniquenessChecker`]
//! - [`LegacyFieldMigrator`]: clears deprecated fields left by earlier
//!   schema versions
//! - [`MigrationBatch`]: runs the industries, solutions and site-config
//!   migrations in order
//! - [`ContentRepository`]: slug-checked CRUD and soft delete for admin
//!   content
//!
//! Every job processes documents one at a time, in order, and fails on the
//! first error. Nothing is rolled back: both jobs are idempotent, so the fix
//! for a failed run is to run it again.
//!
//! # Example
//!
//! ```rust,ignore
//! use vigil_seed::prelude::*;
//! use vigil_store::{InMemoryStore, IndexSpec};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryStore::new().with_index(IndexSpec::by_field("communes", "slug"));
//! let config = VigilConfig::default();
//!
//! let report = SeedReconciler::new(&store)
//!     .reconcile(&SeedTarget::Communes.plan(&config))
//!     .await?;
//! println!("inserted {} of {}", report.inserted, report.total);
//!
//! let batch = run_all_migrations(&store).await?;
//! println!("migrated {} records", batch.migrated());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod catalog;
pub mod config;
pub mod content;
pub mod error;
pub mod legacy;
pub mod migrator;
pub mod orchestrator;
pub mod reconciler;
pub mod slug;
pub mod uniqueness;

pub use catalog::SeedTarget;
pub use config::{SeedSettings, VigilConfig};
pub use content::ContentRepository;
pub use error::{CatalogError, ConfigError, ContentError, MigrationError, SeedError};
pub use legacy::{has_legacy_value, LegacyField, LegacyFieldSet};
pub use migrator::{LegacyFieldMigrator, MigrationReport};
pub use orchestrator::{run_all_migrations, BatchReport, MigrationBatch};
pub use reconciler::{RefreshPolicy, SeedEntry, SeedPlan, SeedReconciler, SeedReport};
pub use uniqueness::UniquenessChecker;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for seeding and migrations
    pub use crate::{
        run_all_migrations, BatchReport, ContentRepository, LegacyField, LegacyFieldMigrator,
        LegacyFieldSet, MigrationBatch, MigrationReport, RefreshPolicy, SeedEntry, SeedPlan,
        SeedReconciler, SeedReport, SeedTarget, UniquenessChecker, VigilConfig,
    };
}
