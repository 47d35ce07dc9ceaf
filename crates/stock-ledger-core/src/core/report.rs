// crates/stock-ledger-core/src/core/report.rs
// ============================================================================
// Module: Stock Ledger Report Types
// Description: Report documents, line items, and validation rules.
// Purpose: Provide the report shape shared by drafting, finalize, and purge.
// Dependencies: crate::core::{identifiers, time}, serde
// ============================================================================

//! ## Overview
//! A report is a discrete, timestamped count of products: an inventory
//! snapshot, a quality-test count, or a delivery receipt. Line items carry
//! denormalized SKU and description snapshots taken at entry time. This is a
//! deliberate design choice, not a missing join: historical reports must
//! reflect the product as it was, not as it is now.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::ProductId;
use crate::core::identifiers::ReportId;
use crate::core::identifiers::Sku;
use crate::core::time::Timestamp;
use crate::interfaces::StoreError;
use crate::interfaces::StoredDocument;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum number of characters allowed in delivery notes.
pub const MAX_NOTES_CHARS: usize = 50;

// ============================================================================
// SECTION: Report Type
// ============================================================================

/// Report type selecting one of three independent counting workflows.
///
/// # Invariants
/// - Immutable after report creation.
/// - Histories of different types are never cross-compared; carry-over counts
///   only consult reports of the same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    /// Full physical inventory count.
    Inventory,
    /// Quality-tested unit count.
    Tested,
    /// Delivery receipt.
    Delivery,
}

impl ReportType {
    /// Returns the stable string form used in stored documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inventory => "inventory",
            Self::Tested => "tested",
            Self::Delivery => "delivery",
        }
    }

    /// Returns the canonical history action label for the type.
    #[must_use]
    pub const fn action_label(self) -> &'static str {
        match self {
            Self::Inventory => "Inventory Count",
            Self::Tested => "Quality Test",
            Self::Delivery => "Delivery Receipt",
        }
    }

    /// Returns whether items of this type carry a previous count.
    ///
    /// Delivery receipts have no notion of "previous"; inventory and tested
    /// counts carry the nearest prior count of the same type.
    #[must_use]
    pub const fn tracks_previous_count(self) -> bool {
        !matches!(self, Self::Delivery)
    }
}

// ============================================================================
// SECTION: Report Item
// ============================================================================

/// One line item of a report, keyed by product identifier.
///
/// # Invariants
/// - `product_id` is unique within one report's items (duplicate guard).
/// - `sku` and `description` are snapshots of the product at entry time.
/// - `previous_count` is fixed when the item is first added to a draft and
///   never recomputed, even if a newer type-matching report exists by the
///   time of finalize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportItem {
    /// Product the count refers to.
    pub product_id: ProductId,
    /// SKU snapshot at entry time.
    pub sku: Sku,
    /// Description snapshot at entry time.
    pub description: String,
    /// Count entered by the operator.
    pub current_count: u64,
    /// Carry-over count from the nearest prior report of the same type.
    /// Present for inventory and tested items, absent for delivery items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_count: Option<u64>,
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Report document body as read from the document store.
///
/// # Invariants
/// - `total_items` equals `items.len()` at every successful write.
/// - `report_type` and `created_at` are immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Counting workflow the report belongs to.
    pub report_type: ReportType,
    /// Line items in entry order.
    pub items: Vec<ReportItem>,
    /// Derived item count, maintained by finalize.
    pub total_items: u64,
    /// Optional operator notes, delivery reports only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Creation time, stamped once by the document store.
    pub created_at: Timestamp,
    /// Last finalize time, stamped by the document store on every write.
    pub updated_at: Timestamp,
}

/// Report document paired with its store identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRecord {
    /// Store-assigned report identifier.
    pub id: ReportId,
    /// Report document body.
    pub report: Report,
}

impl ReportRecord {
    /// Parses a stored document into a report record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] when the document body does not match
    /// the report shape.
    pub fn from_document(document: StoredDocument) -> Result<Self, StoreError> {
        let report =
            serde_json::from_value(serde_json::Value::Object(document.fields)).map_err(|err| {
                StoreError::Corrupt(format!("report {}: {err}", document.id.as_str()))
            })?;
        Ok(Self {
            id: ReportId::from(document.id),
            report,
        })
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validation refusals raised before any write occurs.
///
/// # Invariants
/// - A validation error means no partial write has happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Finalize was requested for a report with no items.
    #[error("report contains no items")]
    EmptyReport,
    /// Two items reference the same product.
    #[error("duplicate product in report: {0}")]
    DuplicateProduct(ProductId),
    /// Notes exceed the character limit.
    #[error("notes exceed {MAX_NOTES_CHARS} characters")]
    NotesTooLong,
    /// Notes were supplied for a non-delivery report.
    #[error("notes are only supported on delivery reports")]
    NotesNotAllowed,
    /// An item index does not exist in the draft.
    #[error("no report item at index {0}")]
    NoSuchItem(usize),
    /// The draft exceeds the configured item limit.
    #[error("report items exceed the configured limit of {0}")]
    TooManyItems(usize),
}

/// Validates notes against the type and length rules.
///
/// # Errors
///
/// Returns [`ValidationError::NotesNotAllowed`] for non-delivery reports and
/// [`ValidationError::NotesTooLong`] when the limit is exceeded.
pub fn validate_notes(report_type: ReportType, notes: &str) -> Result<(), ValidationError> {
    if report_type != ReportType::Delivery {
        return Err(ValidationError::NotesNotAllowed);
    }
    if notes.chars().count() > MAX_NOTES_CHARS {
        return Err(ValidationError::NotesTooLong);
    }
    Ok(())
}
