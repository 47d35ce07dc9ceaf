// crates/stock-ledger-core/src/runtime/store.rs
// ============================================================================
// Module: Stock Ledger In-Memory Store
// Description: Simple in-memory document store for tests and examples.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::{core, interfaces}, serde_json, std
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of
//! [`DocumentStore`] for tests and local demos. It honors the full store
//! contract: monotonic `created_at` stamping, shallow merges with atomic
//! array append, canonical query semantics, and channel-based subscriptions.
//! It is not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::mpsc;
use std::sync::mpsc::Sender;

use serde_json::Value;

use crate::core::identifiers::DocumentId;
use crate::core::time::Timestamp;
use crate::interfaces::ArrayAppend;
use crate::interfaces::Clock;
use crate::interfaces::Collection;
use crate::interfaces::DocumentStore;
use crate::interfaces::FIELD_CREATED_AT;
use crate::interfaces::FIELD_UPDATED_AT;
use crate::interfaces::FieldMap;
use crate::interfaces::QuerySpec;
use crate::interfaces::StoreError;
use crate::interfaces::StoredDocument;
use crate::interfaces::Subscription;
use crate::runtime::clock::SystemClock;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// One live subscription registration.
struct Subscriber {
    /// Collection the subscription watches.
    collection: Collection,
    /// Query re-run after every mutation of the collection.
    query: QuerySpec,
    /// Channel delivering full result sets.
    sender: Sender<Vec<StoredDocument>>,
}

/// Mutable store state behind the mutex.
#[derive(Default)]
struct StoreInner {
    /// Documents keyed by collection name, then document id.
    collections: BTreeMap<&'static str, BTreeMap<DocumentId, FieldMap>>,
    /// Sequence for store-assigned identifiers.
    next_seq: u64,
    /// Last stamp issued, enforcing per-store monotonic `created_at`.
    last_stamp: i64,
    /// Live subscriptions; disconnected receivers are pruned on notify.
    subscribers: Vec<Subscriber>,
}

/// In-memory document store for tests and examples.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    /// Store state protected by a mutex.
    inner: Arc<Mutex<StoreInner>>,
    /// Time source used for document stamps.
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    /// Creates a store stamping documents from the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    /// Creates a store stamping documents from the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner::default())),
            clock,
        }
    }

    /// Locks the store state.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StoreInner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Store("document store mutex poisoned".to_string()))
    }

    /// Issues the next stamp: wall-clock time, forced strictly forward so
    /// `created_at` stays monotonic per store.
    fn next_stamp(clock: &dyn Clock, inner: &mut StoreInner) -> i64 {
        let now = clock.now().as_unix_millis();
        let stamp = if now > inner.last_stamp { now } else { inner.last_stamp + 1 };
        inner.last_stamp = stamp;
        stamp
    }

    /// Re-runs matching subscriptions for a collection and delivers fresh
    /// result sets. Disconnected receivers are dropped.
    fn notify(inner: &mut StoreInner, collection: Collection) {
        let documents: Vec<StoredDocument> = inner
            .collections
            .get(collection.as_str())
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| StoredDocument {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        inner.subscribers.retain(|subscriber| {
            if subscriber.collection != collection {
                return true;
            }
            let results = subscriber.query.apply(documents.clone());
            subscriber.sender.send(results).is_ok()
        });
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn insert(&self, collection: Collection, fields: FieldMap) -> Result<DocumentId, StoreError> {
        let mut inner = self.lock()?;
        inner.next_seq += 1;
        let id = DocumentId::new(format!("doc-{:06}", inner.next_seq));
        let stamp = Self::next_stamp(self.clock.as_ref(), &mut inner);
        let mut body = fields;
        body.insert(FIELD_CREATED_AT.to_string(), Value::from(stamp));
        body.insert(FIELD_UPDATED_AT.to_string(), Value::from(stamp));
        inner.collections.entry(collection.as_str()).or_default().insert(id.clone(), body);
        Self::notify(&mut inner, collection);
        drop(inner);
        Ok(id)
    }

    fn update(
        &self,
        collection: Collection,
        id: &DocumentId,
        fields: FieldMap,
        append: Option<ArrayAppend>,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let stamp = Self::next_stamp(self.clock.as_ref(), &mut inner);
        let body = inner
            .collections
            .get_mut(collection.as_str())
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound(format!("{collection}/{id}")))?;
        for (field, value) in fields {
            if value.is_null() {
                body.remove(&field);
            } else {
                body.insert(field, value);
            }
        }
        if let Some(instruction) = append {
            let slot = body
                .entry(instruction.field.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            let Value::Array(entries) = slot else {
                return Err(StoreError::Invalid(format!(
                    "field {} is not an array",
                    instruction.field
                )));
            };
            entries.extend(instruction.values);
        }
        body.insert(FIELD_UPDATED_AT.to_string(), Value::from(stamp));
        Self::notify(&mut inner, collection);
        drop(inner);
        Ok(())
    }

    fn delete(&self, collection: Collection, id: &DocumentId) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let removed = inner
            .collections
            .get_mut(collection.as_str())
            .and_then(|docs| docs.remove(id))
            .is_some();
        if removed {
            Self::notify(&mut inner, collection);
        }
        drop(inner);
        Ok(())
    }

    fn get(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.collections.get(collection.as_str()).and_then(|docs| docs.get(id)).map(
            |fields| StoredDocument {
                id: id.clone(),
                fields: fields.clone(),
            },
        ))
    }

    fn query(
        &self,
        collection: Collection,
        query: &QuerySpec,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let inner = self.lock()?;
        let documents: Vec<StoredDocument> = inner
            .collections
            .get(collection.as_str())
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| StoredDocument {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        drop(inner);
        Ok(query.apply(documents))
    }

    fn subscribe(
        &self,
        collection: Collection,
        query: QuerySpec,
    ) -> Result<Subscription, StoreError> {
        let mut inner = self.lock()?;
        let (sender, receiver) = mpsc::channel();
        let documents: Vec<StoredDocument> = inner
            .collections
            .get(collection.as_str())
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| StoredDocument {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let initial = query.apply(documents);
        sender
            .send(initial)
            .map_err(|_| StoreError::Store("subscription receiver dropped".to_string()))?;
        inner.subscribers.push(Subscriber {
            collection,
            query,
            sender,
        });
        drop(inner);
        Ok(receiver)
    }
}

// ============================================================================
// SECTION: Stamp Helper
// ============================================================================

/// Returns a document's stamp field as a timestamp when present and numeric.
#[must_use]
pub fn stamp_field(fields: &FieldMap, field: &str) -> Option<Timestamp> {
    fields.get(field).and_then(Value::as_i64).map(Timestamp::from_unix_millis)
}
