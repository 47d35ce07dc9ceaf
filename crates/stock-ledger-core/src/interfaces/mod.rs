// crates/stock-ledger-core/src/interfaces/mod.rs
// ============================================================================
// Module: Stock Ledger Interfaces
// Description: Backend-agnostic interfaces for storage, time, and audit.
// Purpose: Define the contract surfaces the reconciliation runtime consumes.
// Dependencies: crate::core, serde, serde_json
// ============================================================================

//! ## Overview
//! Interfaces define how Stock Ledger integrates with its document store and
//! host environment without embedding backend-specific details. The store
//! contract deliberately mirrors what a hosted document database offers:
//! single-document writes, shallow partial merges with atomic array append,
//! equality queries with single-field ordering and limit, and live
//! subscriptions that re-deliver full result sets. Nothing here assumes
//! server-side transactions or joins.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::fmt;
use std::sync::mpsc::Receiver;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::identifiers::DocumentId;
use crate::core::identifiers::ProductId;
use crate::core::identifiers::ReportId;
use crate::core::report::ReportType;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Document field holding the store-assigned creation time.
pub const FIELD_CREATED_AT: &str = "created_at";
/// Document field holding the store-assigned modification time.
pub const FIELD_UPDATED_AT: &str = "updated_at";
/// Document field holding the report type discriminant.
pub const FIELD_REPORT_TYPE: &str = "report_type";
/// Document field holding a product's audit history array.
pub const FIELD_HISTORY: &str = "history";

// ============================================================================
// SECTION: Collections
// ============================================================================

/// Named document collections consumed by the reconciliation core.
///
/// # Invariants
/// - Collection names are stable; stores key documents by them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Product catalog documents.
    Products,
    /// Report documents.
    Reports,
}

impl Collection {
    /// Returns the stable collection name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Reports => "reports",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Documents
// ============================================================================

/// Partial document body keyed by field name.
pub type FieldMap = serde_json::Map<String, Value>;

/// A stored document paired with its store-assigned identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    /// Store-assigned document identifier.
    pub id: DocumentId,
    /// Document body fields.
    pub fields: FieldMap,
}

/// Atomic array-append instruction attached to an update.
///
/// # Invariants
/// - The store appends the values to the named array field in order, creating
///   the array when absent. This is the primitive history writes rely on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayAppend {
    /// Array field to append to.
    pub field: String,
    /// Values appended in order.
    pub values: Vec<Value>,
}

// ============================================================================
// SECTION: Queries
// ============================================================================

/// Equality filter on a single document field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    /// Field the filter applies to.
    pub field: String,
    /// Value the field must equal.
    pub equals: Value,
}

/// Sort direction for ordered queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest value first.
    Ascending,
    /// Largest value first.
    Descending,
}

/// Single-field ordering instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Field to order by.
    pub field: String,
    /// Sort direction.
    pub direction: SortDirection,
}

/// Query over one collection: equality filters, optional single-field
/// ordering, optional limit. This is the full query surface the store
/// collaborator offers; anything richer is filtered client-side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySpec {
    /// Equality filters, all of which must match.
    pub filters: Vec<FieldFilter>,
    /// Optional single-field ordering.
    pub order_by: Option<OrderBy>,
    /// Optional result limit, applied after ordering.
    pub limit: Option<usize>,
}

impl QuerySpec {
    /// Creates an empty query matching every document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality filter.
    #[must_use]
    pub fn with_filter(mut self, field: impl Into<String>, equals: impl Into<Value>) -> Self {
        self.filters.push(FieldFilter {
            field: field.into(),
            equals: equals.into(),
        });
        self
    }

    /// Sets the ordering field and direction.
    #[must_use]
    pub fn ordered_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    /// Sets the result limit.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns whether a document body matches every filter.
    #[must_use]
    pub fn matches(&self, fields: &FieldMap) -> bool {
        self.filters.iter().all(|filter| fields.get(&filter.field) == Some(&filter.equals))
    }

    /// Applies filter, order, and limit semantics to a document set.
    ///
    /// Both store implementations route through this so their observable
    /// query behavior stays identical. Ordering is stable: documents with
    /// equal or missing order fields keep their incoming relative order.
    #[must_use]
    pub fn apply(&self, documents: Vec<StoredDocument>) -> Vec<StoredDocument> {
        let mut matched: Vec<StoredDocument> =
            documents.into_iter().filter(|doc| self.matches(&doc.fields)).collect();
        if let Some(order) = &self.order_by {
            matched.sort_by(|a, b| {
                let ordering = compare_field(a.fields.get(&order.field), b.fields.get(&order.field));
                match order.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        matched
    }
}

/// Compares two optional JSON values with a stable total order.
///
/// Missing fields sort before present ones; values of different JSON kinds
/// sort by kind. Numbers compare numerically, strings lexicographically.
fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(left), Some(right)) => compare_values(left, right),
    }
}

/// Ranks a JSON value by kind for cross-kind comparisons.
const fn value_kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Compares two JSON values with a stable total order.
fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => a.as_f64().unwrap_or(f64::NAN).total_cmp(&b.as_f64().unwrap_or(f64::NAN)),
        },
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => value_kind_rank(left).cmp(&value_kind_rank(right)),
    }
}

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Document store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Read helpers never silently default on these; a failed prior-count
///   lookup must surface rather than corrupt delta baselines.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("document store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails shape checks.
    #[error("document store corruption: {0}")]
    Corrupt(String),
    /// Request data is invalid for the store.
    #[error("document store invalid request: {0}")]
    Invalid(String),
    /// Referenced document does not exist.
    #[error("document not found: {0}")]
    NotFound(String),
    /// Store reported an error.
    #[error("document store error: {0}")]
    Store(String),
}

impl StoreError {
    /// Returns whether the error is a missing-document refusal.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

// ============================================================================
// SECTION: Document Store
// ============================================================================

/// Live subscription delivering full matching result sets.
///
/// The first delivery is the current result set; a fresh set follows every
/// mutation of the subscribed collection. The sender side drops when the
/// store is dropped, closing the channel.
pub type Subscription = Receiver<Vec<StoredDocument>>;

/// Backend-agnostic document store.
///
/// # Invariants
/// - `insert` assigns an opaque identifier and stamps `created_at` and
///   `updated_at`; `created_at` values are monotonic per store.
/// - `update` performs a shallow field merge, applies the optional array
///   append atomically, and re-stamps `updated_at`. A null merge value
///   removes the field from the document.
/// - All operations either complete or fail; there is no partial-result
///   interpretation of a single call.
pub trait DocumentStore {
    /// Inserts a document and returns its store-assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn insert(&self, collection: Collection, fields: FieldMap) -> Result<DocumentId, StoreError>;

    /// Merges partial fields into a document, optionally appending to an
    /// array field in the same write. A null field value removes the field.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the document does not exist and
    /// [`StoreError`] for other write failures.
    fn update(
        &self,
        collection: Collection,
        id: &DocumentId,
        fields: FieldMap,
        append: Option<ArrayAppend>,
    ) -> Result<(), StoreError>;

    /// Deletes a document. Deleting an absent document is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn delete(&self, collection: Collection, id: &DocumentId) -> Result<(), StoreError>;

    /// Fetches a document by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn get(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError>;

    /// Runs an equality query with optional ordering and limit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn query(
        &self,
        collection: Collection,
        query: &QuerySpec,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Subscribes to a query, receiving the current result set immediately
    /// and a fresh full set after every mutation of the collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the subscription cannot be established.
    fn subscribe(&self, collection: Collection, query: QuerySpec)
    -> Result<Subscription, StoreError>;
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Time source supplied by the host.
///
/// The reconciliation engine never reads wall-clock time directly; hosts
/// provide a clock so replays and tests stay deterministic.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

// ============================================================================
// SECTION: Audit Sink
// ============================================================================

/// Purge scope label for audit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PurgeScope {
    /// Report document purge.
    Reports,
    /// Product history purge.
    History,
}

/// Structured audit events emitted by the runtime.
///
/// # Invariants
/// - Events describe effects that already happened; emitting them is
///   best-effort and never fails the underlying operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A report finalize completed, including its history fan-out.
    Finalize {
        /// Finalized report identifier.
        report_id: ReportId,
        /// Report type.
        report_type: ReportType,
        /// Item count written to the report.
        total_items: u64,
        /// History entries appended.
        history_appended: usize,
        /// History appends skipped because the product was gone.
        skipped: usize,
    },
    /// A history append was skipped because its product no longer resolves.
    HistorySkipped {
        /// Report whose fan-out skipped the product.
        report_id: ReportId,
        /// Product that could not be resolved.
        product_id: ProductId,
        /// Skip reason.
        reason: String,
    },
    /// A retention purge run completed.
    Purge {
        /// Which purge ran.
        scope: PurgeScope,
        /// Cutoff age in days.
        cutoff_days: u32,
        /// Documents scanned.
        scanned: usize,
        /// Documents deleted or trimmed.
        purged: usize,
        /// Documents that failed and should be retried by re-running.
        failed: usize,
    },
}

/// Audit sink errors.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Writing the audit record failed.
    #[error("audit write failed: {0}")]
    Write(String),
}

/// Destination for structured audit records.
pub trait AuditSink {
    /// Records one audit event.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] when the record cannot be written.
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError>;
}
