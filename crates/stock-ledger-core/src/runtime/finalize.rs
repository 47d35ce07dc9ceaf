// crates/stock-ledger-core/src/runtime/finalize.rs
// ============================================================================
// Module: Stock Ledger Finalize
// Description: Report persistence and per-product history fan-out.
// Purpose: Commit a draft as a report document and append audit history.
// Dependencies: crate::{core, interfaces}, crate::runtime::draft, serde_json
// ============================================================================

//! ## Overview
//! Finalize is the single commit point where a draft becomes a persisted
//! report and fans out one audit history entry per line item. The report
//! write commits first and is authoritative; the history loop is
//! eventually-consistent with it. A product that no longer resolves is
//! recorded and skipped so one stale reference cannot abandon the whole
//! fan-out, while a store failure surfaces the committed report id and the
//! number of appends already applied so callers can retry the loop alone.
//! Re-finalizing an edit appends fresh entries for every item again; the
//! audit trail is append-only, never deduplicated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::core::identifiers::ProductId;
use crate::core::identifiers::ReportId;
use crate::core::product::HistoryEntry;
use crate::core::report::ReportItem;
use crate::core::report::ReportType;
use crate::core::report::ValidationError;
use crate::core::report::validate_notes;
use crate::interfaces::ArrayAppend;
use crate::interfaces::AuditEvent;
use crate::interfaces::AuditSink;
use crate::interfaces::Clock;
use crate::interfaces::Collection;
use crate::interfaces::DocumentStore;
use crate::interfaces::FIELD_HISTORY;
use crate::interfaces::FIELD_REPORT_TYPE;
use crate::interfaces::FieldMap;
use crate::interfaces::StoreError;
use crate::runtime::draft::DraftReport;

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// A history append skipped because its product no longer resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAppend {
    /// Product that could not be resolved.
    pub product_id: ProductId,
    /// Skip reason, suitable for audit records.
    pub reason: String,
}

/// Result of a successful finalize.
///
/// # Invariants
/// - `total_items` equals the persisted report's item count.
/// - `history_appended + skipped.len()` equals `total_items`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeOutcome {
    /// Identifier of the persisted report.
    pub report_id: ReportId,
    /// Item count written to the report document.
    pub total_items: u64,
    /// History entries appended during the fan-out.
    pub history_appended: usize,
    /// Appends skipped because the product was gone.
    pub skipped: Vec<SkippedAppend>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Finalize errors.
///
/// # Invariants
/// - `Validation` and `Store` mean no report write happened.
/// - `History` means the report write committed; callers retry the fan-out
///   without repeating the report write.
#[derive(Debug, Error)]
pub enum FinalizeError {
    /// Draft validation refused the finalize; nothing was written.
    #[error("report validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// The report write itself failed; nothing was committed.
    #[error("report write failed: {0}")]
    Store(#[from] StoreError),
    /// The report committed but the history fan-out was interrupted.
    #[error(
        "history fan-out interrupted for report {report_id}: {source} \
         ({appended} of {total} appends applied)"
    )]
    History {
        /// Committed report identifier.
        report_id: ReportId,
        /// Appends applied before the interruption.
        appended: usize,
        /// Total appends intended.
        total: usize,
        /// Underlying store failure.
        source: StoreError,
    },
}

// ============================================================================
// SECTION: Finalizer
// ============================================================================

/// Commits drafts into report documents and product history.
pub struct ReportFinalizer<'a, S: DocumentStore> {
    /// Document store receiving the report and history writes.
    store: &'a S,
    /// Time source for history entry dates.
    clock: &'a dyn Clock,
    /// Optional audit destination; failures are swallowed.
    audit: Option<&'a dyn AuditSink>,
}

impl<'a, S: DocumentStore> ReportFinalizer<'a, S> {
    /// Creates a finalizer over the given store and clock.
    #[must_use]
    pub const fn new(store: &'a S, clock: &'a dyn Clock) -> Self {
        Self {
            store,
            clock,
            audit: None,
        }
    }

    /// Attaches an audit sink receiving fan-out and skip records.
    #[must_use]
    pub const fn with_audit(mut self, audit: &'a dyn AuditSink) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Finalizes a draft: validates, persists the report document, then
    /// appends exactly one history entry per line item.
    ///
    /// New drafts insert a report with store-assigned `created_at` and
    /// `updated_at`; edits update `items`, `total_items`, `notes`, and
    /// `updated_at` only, leaving `report_type` and `created_at` untouched.
    ///
    /// # Errors
    ///
    /// Returns [`FinalizeError::Validation`] or [`FinalizeError::Store`]
    /// when nothing was committed, and [`FinalizeError::History`] when the
    /// report committed but the fan-out needs a retry.
    pub fn finalize(&self, draft: &DraftReport) -> Result<FinalizeOutcome, FinalizeError> {
        validate_draft(draft)?;
        let items = draft.items();
        let total_items = items.len() as u64;

        let mut fields = FieldMap::new();
        fields.insert(
            "items".to_string(),
            serde_json::to_value(items).map_err(|err| StoreError::Invalid(err.to_string()))?,
        );
        fields.insert("total_items".to_string(), Value::from(total_items));

        let report_id = match draft.edited_report() {
            Some(id) => {
                // Edits overwrite notes unconditionally; a cleared draft
                // writes null so the merge removes the stale field.
                fields.insert("notes".to_string(), draft.notes().map_or(Value::Null, Value::from));
                self.store.update(Collection::Reports, &id.to_document_id(), fields, None)?;
                id.clone()
            }
            None => {
                if let Some(notes) = draft.notes() {
                    fields.insert("notes".to_string(), Value::from(notes));
                }
                fields.insert(
                    FIELD_REPORT_TYPE.to_string(),
                    Value::from(draft.report_type().as_str()),
                );
                ReportId::from(self.store.insert(Collection::Reports, fields)?)
            }
        };

        let outcome = self.fan_out_history(&report_id, draft.report_type(), items, total_items)?;
        self.record_audit(&AuditEvent::Finalize {
            report_id: outcome.report_id.clone(),
            report_type: draft.report_type(),
            total_items: outcome.total_items,
            history_appended: outcome.history_appended,
            skipped: outcome.skipped.len(),
        });
        Ok(outcome)
    }

    /// Appends one history entry per item, skipping unresolvable products
    /// and surfacing other store failures with retry context.
    fn fan_out_history(
        &self,
        report_id: &ReportId,
        report_type: ReportType,
        items: &[ReportItem],
        total_items: u64,
    ) -> Result<FinalizeOutcome, FinalizeError> {
        let mut appended = 0usize;
        let mut skipped = Vec::new();
        for item in items {
            let entry = self.history_entry(report_id, report_type, item).map_err(|source| {
                FinalizeError::History {
                    report_id: report_id.clone(),
                    appended,
                    total: items.len(),
                    source,
                }
            })?;
            let value = serde_json::to_value(&entry)
                .map_err(|err| StoreError::Invalid(err.to_string()))
                .map_err(|source| FinalizeError::History {
                    report_id: report_id.clone(),
                    appended,
                    total: items.len(),
                    source,
                })?;
            let append = ArrayAppend {
                field: FIELD_HISTORY.to_string(),
                values: vec![value],
            };
            let result = self.store.update(
                Collection::Products,
                &item.product_id.to_document_id(),
                FieldMap::new(),
                Some(append),
            );
            match result {
                Ok(()) => appended += 1,
                Err(err) if err.is_not_found() => {
                    let reason = err.to_string();
                    self.record_audit(&AuditEvent::HistorySkipped {
                        report_id: report_id.clone(),
                        product_id: item.product_id.clone(),
                        reason: reason.clone(),
                    });
                    skipped.push(SkippedAppend {
                        product_id: item.product_id.clone(),
                        reason,
                    });
                }
                Err(source) => {
                    return Err(FinalizeError::History {
                        report_id: report_id.clone(),
                        appended,
                        total: items.len(),
                        source,
                    });
                }
            }
        }
        Ok(FinalizeOutcome {
            report_id: report_id.clone(),
            total_items,
            history_appended: appended,
            skipped,
        })
    }

    /// Builds the history entry for one item, dated at this specific append.
    fn history_entry(
        &self,
        report_id: &ReportId,
        report_type: ReportType,
        item: &ReportItem,
    ) -> Result<HistoryEntry, StoreError> {
        let date = self
            .clock
            .now()
            .to_rfc3339()
            .map_err(|err| StoreError::Invalid(err.to_string()))?;
        Ok(HistoryEntry {
            action: report_type.action_label().to_string(),
            date,
            details: history_details(report_type, item),
            report_id: report_id.clone(),
        })
    }

    /// Emits an audit record, best-effort.
    fn record_audit(&self, event: &AuditEvent) {
        if let Some(audit) = self.audit {
            // Audit is observational; a failed write must not fail the
            // operation it describes.
            let _unused = audit.record(event);
        }
    }
}

// ============================================================================
// SECTION: Helper Functions
// ============================================================================

/// Validates a draft before any write occurs.
fn validate_draft(draft: &DraftReport) -> Result<(), ValidationError> {
    if draft.is_empty() {
        return Err(ValidationError::EmptyReport);
    }
    // Edits seeded via for_edit can exceed a limit applied afterwards, so
    // the limit is re-checked here rather than trusted to add_item alone.
    if let Some(limit) = draft.item_limit()
        && draft.len() > limit
    {
        return Err(ValidationError::TooManyItems(limit));
    }
    let items = draft.items();
    for (index, item) in items.iter().enumerate() {
        if items[..index].iter().any(|earlier| earlier.product_id == item.product_id) {
            return Err(ValidationError::DuplicateProduct(item.product_id.clone()));
        }
    }
    if let Some(notes) = draft.notes() {
        validate_notes(draft.report_type(), notes)?;
    }
    Ok(())
}

/// Builds the human summary for a history entry.
fn history_details(report_type: ReportType, item: &ReportItem) -> String {
    if report_type == ReportType::Delivery {
        return format!("Received {}", item.current_count);
    }
    match item.previous_count {
        Some(previous) => format!("Counted {} (previous {previous})", item.current_count),
        None => format!("Counted {}", item.current_count),
    }
}

/// Deletes a report document explicitly.
///
/// Product history entries referencing the report keep their dangling
/// back-reference; they are a relation, not a foreign key.
///
/// # Errors
///
/// Returns [`StoreError`] when the delete fails.
pub fn delete_report<S: DocumentStore>(store: &S, id: &ReportId) -> Result<(), StoreError> {
    store.delete(Collection::Reports, &id.to_document_id())
}
