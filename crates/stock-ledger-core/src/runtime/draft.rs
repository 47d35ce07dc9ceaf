// crates/stock-ledger-core/src/runtime/draft.rs
// ============================================================================
// Module: Stock Ledger Draft Report
// Description: In-progress report owned by one authoring session.
// Purpose: Enforce the duplicate guard and notes rules before finalize.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! A draft is the volatile, unsaved collection of line items one operator is
//! building. It is an owned, mutable, ordered collection scoped to a single
//! session; no shared or global state is involved, and nothing is persisted
//! until finalize. The duplicate guard lives here: re-adding a product is
//! refused and surfaced so the caller must explicitly confirm an overwrite,
//! which replaces only the current count at the existing index.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::identifiers::ProductId;
use crate::core::identifiers::ReportId;
use crate::core::report::ReportItem;
use crate::core::report::ReportRecord;
use crate::core::report::ReportType;
use crate::core::report::ValidationError;
use crate::core::report::validate_notes;

// ============================================================================
// SECTION: Add Outcome
// ============================================================================

/// Result of attempting to add an item to a draft.
///
/// # Invariants
/// - `Duplicate` means the draft is unchanged; the caller must call
///   [`DraftReport::overwrite_count`] to confirm replacing the count.
/// - `LimitReached` means the draft is unchanged and at its item limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum AddOutcome {
    /// Item appended to the draft.
    Added,
    /// The product already exists at the surfaced index.
    Duplicate {
        /// Index of the existing item.
        index: usize,
    },
    /// The configured item limit was reached.
    LimitReached,
}

// ============================================================================
// SECTION: Draft Report
// ============================================================================

/// In-progress report for one authoring session.
#[derive(Debug, Clone)]
pub struct DraftReport {
    /// Counting workflow the draft belongs to.
    report_type: ReportType,
    /// Report being edited, when this draft is a correction rather than a
    /// new counting cycle.
    editing: Option<ReportId>,
    /// Line items in entry order.
    items: Vec<ReportItem>,
    /// Optional operator notes, delivery drafts only.
    notes: Option<String>,
    /// Optional item-count limit supplied by configuration.
    item_limit: Option<usize>,
}

impl DraftReport {
    /// Creates an empty draft for a new report.
    #[must_use]
    pub const fn new(report_type: ReportType) -> Self {
        Self {
            report_type,
            editing: None,
            items: Vec::new(),
            notes: None,
            item_limit: None,
        }
    }

    /// Creates a draft editing an existing report, seeded with its items and
    /// notes. Edits replace items wholesale at finalize; they never merge.
    #[must_use]
    pub fn for_edit(record: &ReportRecord) -> Self {
        Self {
            report_type: record.report.report_type,
            editing: Some(record.id.clone()),
            items: record.report.items.clone(),
            notes: record.report.notes.clone(),
            item_limit: None,
        }
    }

    /// Applies an item-count limit, typically from configuration.
    #[must_use]
    pub const fn with_item_limit(mut self, limit: usize) -> Self {
        self.item_limit = Some(limit);
        self
    }

    /// Returns the draft's report type.
    #[must_use]
    pub const fn report_type(&self) -> ReportType {
        self.report_type
    }

    /// Returns the configured item-count limit, when set.
    #[must_use]
    pub const fn item_limit(&self) -> Option<usize> {
        self.item_limit
    }

    /// Returns whether the draft edits an existing report.
    #[must_use]
    pub const fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    /// Returns the edited report identifier, when editing.
    #[must_use]
    pub const fn edited_report(&self) -> Option<&ReportId> {
        self.editing.as_ref()
    }

    /// Returns the line items in entry order.
    #[must_use]
    pub fn items(&self) -> &[ReportItem] {
        &self.items
    }

    /// Returns the operator notes, when set.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Returns the number of items in the draft.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether the draft has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the index of a product's item, when present.
    #[must_use]
    pub fn position_of(&self, product_id: &ProductId) -> Option<usize> {
        self.items.iter().position(|item| item.product_id == *product_id)
    }

    /// Attempts to append an item, refusing silent duplicates.
    ///
    /// A duplicate add leaves the draft unchanged and surfaces the existing
    /// index; replacing the count requires an explicit
    /// [`DraftReport::overwrite_count`] call.
    pub fn add_item(&mut self, item: ReportItem) -> AddOutcome {
        if let Some(index) = self.position_of(&item.product_id) {
            return AddOutcome::Duplicate { index };
        }
        if let Some(limit) = self.item_limit
            && self.items.len() >= limit
        {
            return AddOutcome::LimitReached;
        }
        self.items.push(item);
        AddOutcome::Added
    }

    /// Confirms an overwrite: replaces only `current_count` at the given
    /// index. SKU, description, and the carry-over count stay untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoSuchItem`] when the index does not exist.
    pub fn overwrite_count(
        &mut self,
        index: usize,
        current_count: u64,
    ) -> Result<(), ValidationError> {
        let item = self.items.get_mut(index).ok_or(ValidationError::NoSuchItem(index))?;
        item.current_count = current_count;
        Ok(())
    }

    /// Removes a product's item unconditionally. Returns whether an item was
    /// removed.
    pub fn remove_item(&mut self, product_id: &ProductId) -> bool {
        match self.position_of(product_id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Sets operator notes after validating the type and length rules.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when notes are not allowed for the draft
    /// type or exceed the character limit.
    pub fn set_notes(&mut self, notes: impl Into<String>) -> Result<(), ValidationError> {
        let notes = notes.into();
        validate_notes(self.report_type, &notes)?;
        self.notes = Some(notes);
        Ok(())
    }

    /// Clears operator notes.
    pub fn clear_notes(&mut self) {
        self.notes = None;
    }
}
