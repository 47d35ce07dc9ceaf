// crates/stock-ledger-core/src/runtime/missing.rs
// ============================================================================
// Module: Stock Ledger Missing-Item Detector
// Description: Diff between a draft and the prior inventory snapshot.
// Purpose: Surface SKUs that silently disappeared between counting cycles.
// Dependencies: crate::{core, interfaces}, crate::runtime::{draft, snapshot}
// ============================================================================

//! ## Overview
//! The detector applies only to inventory drafts for *new* reports. Edits
//! are assumed to be corrections, not counting cycles, and tested/delivery
//! reports have no disappearance semantics. When the nearest prior inventory
//! report lists a SKU with a positive count that the draft omits, finalize
//! must pause and let the operator zero-fill, skip, or cancel.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;

use crate::core::identifiers::ProductId;
use crate::core::identifiers::Sku;
use crate::core::report::ReportItem;
use crate::core::report::ReportType;
use crate::interfaces::DocumentStore;
use crate::interfaces::StoreError;
use crate::runtime::draft::AddOutcome;
use crate::runtime::draft::DraftReport;
use crate::runtime::snapshot::SnapshotIndex;

// ============================================================================
// SECTION: Missing Items
// ============================================================================

/// A SKU present with a positive count in the prior inventory snapshot but
/// absent from the current draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingItem {
    /// Product the prior item referred to.
    pub product_id: ProductId,
    /// SKU snapshot from the prior report.
    pub sku: Sku,
    /// Description snapshot from the prior report.
    pub description: String,
    /// The prior report's `current_count`, serving as the display baseline.
    pub prior_count: u64,
}

impl MissingItem {
    /// Converts the missing item into a zero-filled draft line item: counted
    /// zero now, with the prior count carried over as the baseline.
    #[must_use]
    pub fn into_zero_filled(self) -> ReportItem {
        ReportItem {
            product_id: self.product_id,
            sku: self.sku,
            description: self.description,
            current_count: 0,
            previous_count: Some(self.prior_count),
        }
    }
}

/// Operator resolution for a non-empty missing set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingResolution {
    /// Append each missing item with a zero count, then proceed.
    ZeroFill,
    /// Proceed without recording the absences this cycle.
    Skip,
    /// Abort finalize; the draft is left unchanged.
    Cancel,
}

/// Result of applying a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum MissingOutcome {
    /// Finalize may proceed.
    Proceed,
    /// Finalize was cancelled; no write has started.
    Cancelled,
}

// ============================================================================
// SECTION: Detection
// ============================================================================

/// Finds SKUs that disappeared since the prior inventory snapshot.
///
/// Returns an empty set for non-inventory drafts, for edits, and when no
/// prior inventory report exists. Items whose prior count was zero are not
/// considered missing.
///
/// # Errors
///
/// Returns [`StoreError`] when the prior-report lookup fails; the check is
/// never silently skipped on store failure.
pub fn detect_missing<S: DocumentStore>(
    index: &SnapshotIndex<'_, S>,
    draft: &DraftReport,
) -> Result<Vec<MissingItem>, StoreError> {
    if draft.report_type() != ReportType::Inventory || draft.is_edit() {
        return Ok(Vec::new());
    }
    let Some(prior) = index.latest_report(ReportType::Inventory)? else {
        return Ok(Vec::new());
    };
    let current_skus: HashSet<&Sku> = draft.items().iter().map(|item| &item.sku).collect();
    Ok(prior
        .report
        .items
        .into_iter()
        .filter(|item| item.current_count > 0 && !current_skus.contains(&item.sku))
        .map(|item| MissingItem {
            product_id: item.product_id,
            sku: item.sku,
            description: item.description,
            prior_count: item.current_count,
        })
        .collect())
}

/// Applies the operator's resolution to the draft.
///
/// Zero-fill appends each missing item with `current_count = 0` and the
/// prior count as `previous_count`; skip leaves the draft as-is; cancel
/// reports that finalize must not start. Applying a resolution to an empty
/// missing set always proceeds.
pub fn resolve_missing(
    draft: &mut DraftReport,
    missing: Vec<MissingItem>,
    resolution: MissingResolution,
) -> MissingOutcome {
    match resolution {
        MissingResolution::Cancel => MissingOutcome::Cancelled,
        MissingResolution::Skip => MissingOutcome::Proceed,
        MissingResolution::ZeroFill => {
            for item in missing {
                // A duplicate here means the operator added the product
                // after detection ran; the existing row wins.
                match draft.add_item(item.into_zero_filled()) {
                    AddOutcome::Added | AddOutcome::Duplicate { .. } | AddOutcome::LimitReached => {}
                }
            }
            MissingOutcome::Proceed
        }
    }
}
