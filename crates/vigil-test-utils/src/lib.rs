//! Testing utilities for the Vigil workspace
//!
//! Shared fixtures and a fault-injecting store wrapper.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use vigil_store::{
    DocumentId, DocumentStore, Fields, InMemoryStore, IndexSpec, Patch, Record, StoreError,
    StoreResult,
};

/// Object literal to field map; non-objects give an empty map
pub fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}

/// Detached record, as a store would return it
pub fn record(collection: &str, body: Value) -> Record {
    Record {
        id: DocumentId::generate(),
        collection: collection.to_string(),
        created_at: chrono::Utc::now(),
        fields: fields(body),
    }
}

/// Store with a `by_slug` index on each collection
pub fn store_with_slug_indexes(collections: &[&str]) -> InMemoryStore {
    let store = InMemoryStore::new();
    for collection in collections {
        store.define_index(IndexSpec::by_field(*collection, "slug"));
    }
    store
}

/// Store operation kinds, for call accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    FirstByIndex,
    Collect,
    Insert,
    Patch,
    Delete,
}

#[derive(Debug, Clone, Copy)]
struct Fault {
    op: Option<StoreOp>,
    nth: usize,
}

/// Wraps a store, records every call and fails a chosen one
///
/// The failing call returns `StoreError::Unavailable` and does not reach the
/// inner store.
#[derive(Debug)]
pub struct FaultyStore<S> {
    inner: S,
    calls: Mutex<Vec<StoreOp>>,
    fault: Mutex<Option<Fault>>,
}

impl<S: DocumentStore> FaultyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            fault: Mutex::new(None),
        }
    }

    /// Fail the `nth` call (1-based) of any kind
    #[must_use]
    pub fn fail_on_call(self, nth: usize) -> Self {
        *self.fault.lock() = Some(Fault { op: None, nth });
        self
    }

    /// Fail the `nth` call (1-based) of kind `op`
    #[must_use]
    pub fn fail_on(self, op: StoreOp, nth: usize) -> Self {
        *self.fault.lock() = Some(Fault { op: Some(op), nth });
        self
    }

    /// Stop injecting faults
    pub fn heal(&self) {
        *self.fault.lock() = None;
    }

    pub fn calls(&self) -> Vec<StoreOp> {
        self.calls.lock().clone()
    }

    pub fn count(&self, op: StoreOp) -> usize {
        self.calls.lock().iter().filter(|c| **c == op).count()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn enter(&self, op: StoreOp) -> StoreResult<()> {
        let mut calls = self.calls.lock();
        calls.push(op);

        let Some(fault) = *self.fault.lock() else {
            return Ok(());
        };
        let seen = match fault.op {
            None => calls.len(),
            Some(kind) if kind == op => calls.iter().filter(|c| **c == kind).count(),
            Some(_) => return Ok(()),
        };
        if seen == fault.nth {
            return Err(StoreError::Unavailable(format!(
                "injected fault on {op:?} call #{seen}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for FaultyStore<S> {
    async fn get(&self, id: &DocumentId) -> StoreResult<Option<Record>> {
        self.enter(StoreOp::Get)?;
        self.inner.get(id).await
    }

    async fn first_by_index(
        &self,
        collection: &str,
        index: &str,
        value: &Value,
    ) -> StoreResult<Option<Record>> {
        self.enter(StoreOp::FirstByIndex)?;
        self.inner.first_by_index(collection, index, value).await
    }

    async fn collect(&self, collection: &str) -> StoreResult<Vec<Record>> {
        self.enter(StoreOp::Collect)?;
        self.inner.collect(collection).await
    }

    async fn insert(&self, collection: &str, fields: Fields) -> StoreResult<DocumentId> {
        self.enter(StoreOp::Insert)?;
        self.inner.insert(collection, fields).await
    }

    async fn patch(&self, id: &DocumentId, patch: Patch) -> StoreResult<()> {
        self.enter(StoreOp::Patch)?;
        self.inner.patch(id, patch).await
    }

    async fn delete(&self, id: &DocumentId) -> StoreResult<()> {
        self.enter(StoreOp::Delete)?;
        self.inner.delete(id).await
    }
}
