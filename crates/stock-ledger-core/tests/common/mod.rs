// crates/stock-ledger-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared helpers for stock-ledger-core tests.
// Purpose: Provide reusable fixtures and a fault-injecting store wrapper.
// Dependencies: stock-ledger-core, serde_json
// ============================================================================

//! ## Overview
//! Provides a deterministic store/clock fixture, product and draft builders,
//! and a fault-injecting [`DocumentStore`] wrapper for failure-path tests.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    dead_code,
    reason = "Test-only output, panic-based assertions, and per-binary helper use are permitted."
)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use serde_json::Value;
use serde_json::json;
use stock_ledger_core::AddOutcome;
use stock_ledger_core::ArrayAppend;
use stock_ledger_core::Collection;
use stock_ledger_core::DocumentId;
use stock_ledger_core::DocumentStore;
use stock_ledger_core::DraftReport;
use stock_ledger_core::FieldMap;
use stock_ledger_core::FinalizeOutcome;
use stock_ledger_core::HistoryEntry;
use stock_ledger_core::InMemoryDocumentStore;
use stock_ledger_core::ManualClock;
use stock_ledger_core::ProductId;
use stock_ledger_core::ProductRecord;
use stock_ledger_core::QuerySpec;
use stock_ledger_core::ReportFinalizer;
use stock_ledger_core::ReportType;
use stock_ledger_core::SnapshotIndex;
use stock_ledger_core::StoreError;
use stock_ledger_core::StoredDocument;
use stock_ledger_core::Subscription;
use stock_ledger_core::Timestamp;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Fixed test epoch: 2026-01-01T00:00:00Z in unix milliseconds.
pub const T0: i64 = 1_767_225_600_000;

/// Creates an in-memory store driven by a manual clock starting at [`T0`].
pub fn fixture() -> (InMemoryDocumentStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_at(Timestamp::from_unix_millis(T0)));
    let store = InMemoryDocumentStore::with_clock(clock.clone());
    (store, clock)
}

/// Inserts an active product with an empty history and returns its record.
pub fn add_product(
    store: &InMemoryDocumentStore,
    sku: &str,
    description: &str,
) -> ProductRecord {
    let Value::Object(fields) = json!({
        "sku": sku,
        "description": description,
        "status": "active",
        "history": [],
    }) else {
        panic!("product fields must be an object");
    };
    let id = store.insert(Collection::Products, fields).expect("insert product");
    let document = store
        .get(Collection::Products, &id)
        .expect("get product")
        .expect("product present");
    ProductRecord::from_document(document).expect("parse product")
}

/// Builds a draft with one item per `(product, count)` pair, deriving
/// carry-over counts from the store's current snapshot.
pub fn draft_with(
    store: &InMemoryDocumentStore,
    report_type: ReportType,
    entries: &[(&ProductRecord, u64)],
) -> DraftReport {
    let index = SnapshotIndex::new(store);
    let mut draft = DraftReport::new(report_type);
    for (product, count) in entries {
        let item = index.new_item(report_type, product, *count).expect("build item");
        assert!(matches!(draft.add_item(item), AddOutcome::Added));
    }
    draft
}

/// Finalizes a draft against the store.
pub fn finalize_draft(
    store: &InMemoryDocumentStore,
    clock: &ManualClock,
    draft: &DraftReport,
) -> FinalizeOutcome {
    ReportFinalizer::new(store, clock).finalize(draft).expect("finalize draft")
}

/// Reads a product's history entries back from the store.
pub fn product_history(store: &InMemoryDocumentStore, id: &ProductId) -> Vec<HistoryEntry> {
    let document = store
        .get(Collection::Products, &id.to_document_id())
        .expect("get product")
        .expect("product present");
    let record = ProductRecord::from_document(document).expect("parse product");
    record.product.history
}

// ============================================================================
// SECTION: Fault-Injecting Store
// ============================================================================

/// [`DocumentStore`] wrapper injecting failures for specific operations.
pub struct FaultStore {
    /// Store receiving operations that are not configured to fail.
    inner: InMemoryDocumentStore,
    /// When set, every query fails.
    fail_queries: AtomicBool,
    /// Remaining updates before updates start failing, when set.
    updates_before_failure: Mutex<Option<usize>>,
    /// Document identifiers whose deletes fail.
    failing_deletes: Mutex<HashSet<DocumentId>>,
}

impl FaultStore {
    /// Wraps an in-memory store with no failures configured.
    pub fn new(inner: InMemoryDocumentStore) -> Self {
        Self {
            inner,
            fail_queries: AtomicBool::new(false),
            updates_before_failure: Mutex::new(None),
            failing_deletes: Mutex::new(HashSet::new()),
        }
    }

    /// Makes every subsequent query fail.
    pub fn fail_queries(&self) {
        self.fail_queries.store(true, Ordering::SeqCst);
    }

    /// Lets the next `successes` updates through, then fails the rest.
    pub fn fail_updates_after(&self, successes: usize) {
        *self.updates_before_failure.lock().expect("lock") = Some(successes);
    }

    /// Makes deletes of the given document fail.
    pub fn fail_delete_of(&self, id: &DocumentId) {
        self.failing_deletes.lock().expect("lock").insert(id.clone());
    }
}

impl DocumentStore for FaultStore {
    fn insert(
        &self,
        collection: Collection,
        fields: FieldMap,
    ) -> Result<DocumentId, StoreError> {
        self.inner.insert(collection, fields)
    }

    fn update(
        &self,
        collection: Collection,
        id: &DocumentId,
        fields: FieldMap,
        append: Option<ArrayAppend>,
    ) -> Result<(), StoreError> {
        let mut remaining = self.updates_before_failure.lock().expect("lock");
        if let Some(successes) = remaining.as_mut() {
            if *successes == 0 {
                return Err(StoreError::Io("injected update failure".to_string()));
            }
            *successes -= 1;
        }
        drop(remaining);
        self.inner.update(collection, id, fields, append)
    }

    fn delete(&self, collection: Collection, id: &DocumentId) -> Result<(), StoreError> {
        if self.failing_deletes.lock().expect("lock").contains(id) {
            return Err(StoreError::Io("injected delete failure".to_string()));
        }
        self.inner.delete(collection, id)
    }

    fn get(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError> {
        self.inner.get(collection, id)
    }

    fn query(
        &self,
        collection: Collection,
        query: &QuerySpec,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(StoreError::Io("injected query failure".to_string()));
        }
        self.inner.query(collection, query)
    }

    fn subscribe(
        &self,
        collection: Collection,
        query: QuerySpec,
    ) -> Result<Subscription, StoreError> {
        self.inner.subscribe(collection, query)
    }
}
