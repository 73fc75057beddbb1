//! Vigil Document Store
//!
//! The client-side view of the hosted document store the content backend
//! runs on:
//! - [`DocumentStore`]: async `get` / `first_by_index` / `collect` /
//!   `insert` / `patch` / `delete` over named collections
//! - [`Record`] and [`Patch`]: loosely-shaped documents and partial updates,
//!   where [`FieldUpdate::Remove`] drops a field instead of nulling it
//! - [`InMemoryStore`]: in-process implementation with named indexes and
//!   JSON snapshots, used by tests and operator tooling
//!
//! # Example
//!
//! ```rust,ignore
//! use vigil_store::prelude::*;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), StoreError> {
//! let store = InMemoryStore::new().with_index(IndexSpec::by_field("communes", "slug"));
//! let fields = json!({"slug": "paris"}).as_object().cloned().unwrap();
//! let id = store.insert("communes", fields).await?;
//! store.patch(&id, Patch::new().set("is_active", true)).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod client;
pub mod error;
pub mod index;
pub mod memory;
pub mod record;
pub mod snapshot;

pub use client::DocumentStore;
pub use error::{StoreError, StoreResult};
pub use index::IndexSpec;
pub use memory::InMemoryStore;
pub use record::{DocumentId, FieldUpdate, Fields, Patch, Record};
pub use snapshot::SNAPSHOT_VERSION;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the document store
    pub use crate::{
        DocumentId, DocumentStore, FieldUpdate, Fields, InMemoryStore, IndexSpec, Patch, Record,
        StoreError, StoreResult,
    };
}
