// crates/stock-ledger-core/src/runtime/snapshot.rs
// ============================================================================
// Module: Stock Ledger Snapshot Index
// Description: Prior-report lookup and carry-over count extraction.
// Purpose: Supply previous counts for new draft items and the detector baseline.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The snapshot index is the pure read-side helper behind carry-over counts:
//! given a report type, it finds the single most recent report of that type
//! and extracts a product's prior recorded count. A missing prior report
//! yields zero; a failing store query never does. Silently defaulting to
//! zero on store failure would corrupt delta displays and the missing-item
//! baseline, so errors propagate loudly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::identifiers::ProductId;
use crate::core::product::ProductRecord;
use crate::core::report::ReportItem;
use crate::core::report::ReportRecord;
use crate::core::report::ReportType;
use crate::interfaces::Collection;
use crate::interfaces::DocumentStore;
use crate::interfaces::FIELD_CREATED_AT;
use crate::interfaces::FIELD_REPORT_TYPE;
use crate::interfaces::QuerySpec;
use crate::interfaces::SortDirection;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Snapshot Index
// ============================================================================

/// Read-side index over the report collection.
pub struct SnapshotIndex<'a, S: DocumentStore> {
    /// Document store queried for prior reports.
    store: &'a S,
}

impl<'a, S: DocumentStore> SnapshotIndex<'a, S> {
    /// Creates an index over the given store.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Returns the most recent report of the given type, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails or the stored report does
    /// not parse; never defaults silently.
    pub fn latest_report(
        &self,
        report_type: ReportType,
    ) -> Result<Option<ReportRecord>, StoreError> {
        let query = QuerySpec::new()
            .with_filter(FIELD_REPORT_TYPE, report_type.as_str())
            .ordered_by(FIELD_CREATED_AT, SortDirection::Descending)
            .with_limit(1);
        let mut documents = self.store.query(Collection::Reports, &query)?;
        match documents.pop() {
            Some(document) => Ok(Some(ReportRecord::from_document(document)?)),
            None => Ok(None),
        }
    }

    /// Returns a product's count in the most recent report of the given
    /// type: its `current_count` when present, zero when the product is
    /// absent or no prior report of the type exists.
    ///
    /// This value is computed once per item-add and never re-derived at
    /// finalize.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the underlying lookup fails.
    pub fn previous_count_for(
        &self,
        report_type: ReportType,
        product_id: &ProductId,
    ) -> Result<u64, StoreError> {
        let Some(record) = self.latest_report(report_type)? else {
            return Ok(0);
        };
        Ok(record
            .report
            .items
            .iter()
            .find(|item| item.product_id == *product_id)
            .map_or(0, |item| item.current_count))
    }

    /// Builds a draft line item for a product, snapshotting its SKU and
    /// description and fixing the carry-over count at this moment.
    ///
    /// Delivery items carry no previous count; inventory and tested items
    /// carry the nearest prior count of the same type.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the prior-count lookup fails.
    pub fn new_item(
        &self,
        report_type: ReportType,
        product: &ProductRecord,
        current_count: u64,
    ) -> Result<ReportItem, StoreError> {
        let previous_count = if report_type.tracks_previous_count() {
            Some(self.previous_count_for(report_type, &product.id)?)
        } else {
            None
        };
        Ok(ReportItem {
            product_id: product.id.clone(),
            sku: product.product.sku.clone(),
            description: product.product.description.clone(),
            current_count,
            previous_count,
        })
    }
}
