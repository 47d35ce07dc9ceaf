// crates/stock-ledger-core/src/runtime/mod.rs
// ============================================================================
// Module: Stock Ledger Runtime
// Description: Reconciliation engine components and runtime helpers.
// Purpose: Implement drafting, prior-count lookup, missing-item detection,
// finalize fan-out, retention purge, and supporting test utilities.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime is the single canonical execution path for report authoring
//! and retention. Any host surface (CLI, service, UI bridge) must call into
//! these components to preserve the duplicate-guard, carry-over, and
//! history fan-out invariants.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod clock;
pub mod draft;
pub mod feed;
pub mod finalize;
pub mod missing;
pub mod purge;
pub mod snapshot;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::JsonLineAudit;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use draft::AddOutcome;
pub use draft::DraftReport;
pub use feed::FeedError;
pub use feed::ReportFeed;
pub use finalize::FinalizeError;
pub use finalize::FinalizeOutcome;
pub use finalize::ReportFinalizer;
pub use finalize::SkippedAppend;
pub use finalize::delete_report;
pub use missing::MissingItem;
pub use missing::MissingOutcome;
pub use missing::MissingResolution;
pub use missing::detect_missing;
pub use missing::resolve_missing;
pub use purge::PurgeError;
pub use purge::PurgeFailure;
pub use purge::PurgeOutcome;
pub use purge::PurgeRequest;
pub use purge::RetentionPurge;
pub use snapshot::SnapshotIndex;
pub use store::InMemoryDocumentStore;
