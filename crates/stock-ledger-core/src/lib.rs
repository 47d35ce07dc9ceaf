// crates/stock-ledger-core/src/lib.rs
// ============================================================================
// Module: Stock Ledger Core Library
// Description: Public API surface for the Stock Ledger core.
// Purpose: Expose canonical types, store interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Stock Ledger core implements the reconciliation and versioning engine for
//! physical stock counts: prior-count lookup, duplicate guarding in report
//! drafts, missing-item detection between inventory snapshots, finalize
//! fan-out into per-product audit history, and retention purge. It is
//! backend-agnostic and integrates with a document store through explicit
//! interfaces rather than embedding a particular database.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::ArrayAppend;
pub use interfaces::AuditError;
pub use interfaces::AuditEvent;
pub use interfaces::AuditSink;
pub use interfaces::Clock;
pub use interfaces::Collection;
pub use interfaces::DocumentStore;
pub use interfaces::FIELD_CREATED_AT;
pub use interfaces::FIELD_HISTORY;
pub use interfaces::FIELD_REPORT_TYPE;
pub use interfaces::FIELD_UPDATED_AT;
pub use interfaces::FieldFilter;
pub use interfaces::FieldMap;
pub use interfaces::OrderBy;
pub use interfaces::PurgeScope;
pub use interfaces::QuerySpec;
pub use interfaces::SortDirection;
pub use interfaces::StoreError;
pub use interfaces::StoredDocument;
pub use interfaces::Subscription;
pub use runtime::AddOutcome;
pub use runtime::DraftReport;
pub use runtime::FeedError;
pub use runtime::FinalizeError;
pub use runtime::FinalizeOutcome;
pub use runtime::InMemoryDocumentStore;
pub use runtime::JsonLineAudit;
pub use runtime::ManualClock;
pub use runtime::MissingItem;
pub use runtime::MissingOutcome;
pub use runtime::MissingResolution;
pub use runtime::PurgeError;
pub use runtime::PurgeFailure;
pub use runtime::PurgeOutcome;
pub use runtime::PurgeRequest;
pub use runtime::ReportFeed;
pub use runtime::ReportFinalizer;
pub use runtime::RetentionPurge;
pub use runtime::SkippedAppend;
pub use runtime::SnapshotIndex;
pub use runtime::SystemClock;
pub use runtime::delete_report;
pub use runtime::detect_missing;
pub use runtime::resolve_missing;
