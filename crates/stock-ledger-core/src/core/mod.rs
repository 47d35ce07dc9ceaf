// crates/stock-ledger-core/src/core/mod.rs
// ============================================================================
// Module: Stock Ledger Core Types
// Description: Canonical product, report, and history structures.
// Purpose: Provide stable, serializable types for Stock Ledger documents.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Stock Ledger core types define the product catalog view, report documents,
//! report line items, and audit history entries. These types are the
//! canonical source of truth for anything the document store persists.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod identifiers;
pub mod product;
pub mod report;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use identifiers::DocumentId;
pub use identifiers::ProductId;
pub use identifiers::ReportId;
pub use identifiers::Sku;
pub use product::HistoryEntry;
pub use product::Product;
pub use product::ProductRecord;
pub use product::ProductStatus;
pub use report::MAX_NOTES_CHARS;
pub use report::Report;
pub use report::ReportItem;
pub use report::ReportRecord;
pub use report::ReportType;
pub use report::ValidationError;
pub use report::validate_notes;
pub use time::TimeError;
pub use time::Timestamp;
