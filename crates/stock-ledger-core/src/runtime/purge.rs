// crates/stock-ledger-core/src/runtime/purge.rs
// ============================================================================
// Module: Stock Ledger Retention Purge
// Description: Bulk deletion of old reports and trimming of product history.
// Purpose: Apply an age-cutoff policy as non-atomic, re-runnable batch jobs.
// Dependencies: crate::{core, interfaces}, crate::runtime::store, serde_json
// ============================================================================

//! ## Overview
//! Two independent, stateless batch jobs share a cutoff policy: report purge
//! deletes whole report documents older than the cutoff; history purge trims
//! each product's history to entries on or after the cutoff. Neither is
//! atomic across documents. A failure partway leaves some documents purged
//! and others not, and the prescribed recovery is simply re-running: already
//! purged documents produce no further change. Each job snapshots its scan
//! once at the start and never re-queries mid-run, so a document created
//! mid-purge is never swept by the same run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::core::identifiers::DocumentId;
use crate::core::product::HistoryEntry;
use crate::core::time::Timestamp;
use crate::interfaces::AuditEvent;
use crate::interfaces::AuditSink;
use crate::interfaces::Clock;
use crate::interfaces::Collection;
use crate::interfaces::DocumentStore;
use crate::interfaces::FIELD_CREATED_AT;
use crate::interfaces::FIELD_HISTORY;
use crate::interfaces::FieldMap;
use crate::interfaces::PurgeScope;
use crate::interfaces::QuerySpec;
use crate::interfaces::StoreError;
use crate::runtime::store::stamp_field;

// ============================================================================
// SECTION: Request and Outcome
// ============================================================================

/// Parameters for one purge run.
///
/// # Invariants
/// - `acknowledge_irreversible` must be set by the operator; purges refuse
///   to start without it since deletion cannot be undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeRequest {
    /// Cutoff age in days; documents older than `now - cutoff` are purged.
    pub cutoff_days: u32,
    /// Explicit operator confirmation of irreversibility.
    pub acknowledge_irreversible: bool,
}

impl PurgeRequest {
    /// Creates a confirmed purge request.
    #[must_use]
    pub const fn confirmed(cutoff_days: u32) -> Self {
        Self {
            cutoff_days,
            acknowledge_irreversible: true,
        }
    }
}

/// One document the purge could not process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeFailure {
    /// Document the failure applies to.
    pub document_id: DocumentId,
    /// Failure reason.
    pub reason: String,
}

/// Result of one purge run.
///
/// Partial completion is an expected outcome, not an exception: `failed`
/// lists what to expect from a re-run, which is always safe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeOutcome {
    /// Documents scanned in the snapshot taken at the start.
    pub scanned: usize,
    /// Reports deleted or products trimmed.
    pub purged: usize,
    /// Documents that failed and remain for the next run.
    pub failed: Vec<PurgeFailure>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Purge refusals and scan failures.
#[derive(Debug, Error)]
pub enum PurgeError {
    /// The operator did not acknowledge irreversibility.
    #[error("purge refused: irreversibility not acknowledged")]
    NotAcknowledged,
    /// The initial collection scan failed; nothing was purged.
    #[error("purge scan failed: {0}")]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Retention Purge
// ============================================================================

/// Retention purge over the report and product collections.
pub struct RetentionPurge<'a, S: DocumentStore> {
    /// Document store scanned and mutated.
    store: &'a S,
    /// Time source anchoring the cutoff.
    clock: &'a dyn Clock,
    /// Optional audit destination; failures are swallowed.
    audit: Option<&'a dyn AuditSink>,
}

impl<'a, S: DocumentStore> RetentionPurge<'a, S> {
    /// Creates a purge over the given store and clock.
    #[must_use]
    pub const fn new(store: &'a S, clock: &'a dyn Clock) -> Self {
        Self {
            store,
            clock,
            audit: None,
        }
    }

    /// Attaches an audit sink receiving purge outcome records.
    #[must_use]
    pub const fn with_audit(mut self, audit: &'a dyn AuditSink) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Deletes every report created before the cutoff.
    ///
    /// Product history is not touched: `report_id` back-references are
    /// allowed to dangle. Reports without a parseable `created_at` are
    /// scanned but left alone.
    ///
    /// # Errors
    ///
    /// Returns [`PurgeError::NotAcknowledged`] without the operator
    /// confirmation and [`PurgeError::Store`] when the initial scan fails.
    /// Per-document delete failures land in the outcome instead.
    pub fn purge_reports(&self, request: &PurgeRequest) -> Result<PurgeOutcome, PurgeError> {
        if !request.acknowledge_irreversible {
            return Err(PurgeError::NotAcknowledged);
        }
        let cutoff = self.clock.now().minus_days(request.cutoff_days);
        // One snapshot up front; never re-queried mid-run.
        let documents = self.store.query(Collection::Reports, &QuerySpec::new())?;
        let mut outcome = PurgeOutcome {
            scanned: documents.len(),
            ..PurgeOutcome::default()
        };
        for document in documents {
            let Some(created_at) = stamp_field(&document.fields, FIELD_CREATED_AT) else {
                continue;
            };
            if created_at >= cutoff {
                continue;
            }
            match self.store.delete(Collection::Reports, &document.id) {
                Ok(()) => outcome.purged += 1,
                Err(err) => outcome.failed.push(PurgeFailure {
                    document_id: document.id,
                    reason: err.to_string(),
                }),
            }
        }
        self.record_audit(PurgeScope::Reports, request.cutoff_days, &outcome);
        Ok(outcome)
    }

    /// Trims every product's history to entries dated on or after the
    /// cutoff, replacing the whole array when anything was dropped.
    ///
    /// Entries whose date does not parse are retained: the purge never
    /// deletes what it cannot prove expired.
    ///
    /// # Errors
    ///
    /// Returns [`PurgeError::NotAcknowledged`] without the operator
    /// confirmation and [`PurgeError::Store`] when the initial scan fails.
    /// Per-document write failures land in the outcome instead.
    pub fn purge_history(&self, request: &PurgeRequest) -> Result<PurgeOutcome, PurgeError> {
        if !request.acknowledge_irreversible {
            return Err(PurgeError::NotAcknowledged);
        }
        let cutoff = self.clock.now().minus_days(request.cutoff_days);
        let documents = self.store.query(Collection::Products, &QuerySpec::new())?;
        let mut outcome = PurgeOutcome {
            scanned: documents.len(),
            ..PurgeOutcome::default()
        };
        for document in documents {
            let Some(Value::Array(entries)) = document.fields.get(FIELD_HISTORY) else {
                continue;
            };
            let original_len = entries.len();
            let retained: Vec<Value> =
                entries.iter().filter(|entry| retain_entry(entry, cutoff)).cloned().collect();
            if retained.len() == original_len {
                continue;
            }
            let mut fields = FieldMap::new();
            fields.insert(FIELD_HISTORY.to_string(), Value::Array(retained));
            match self.store.update(Collection::Products, &document.id, fields, None) {
                Ok(()) => outcome.purged += 1,
                Err(err) => outcome.failed.push(PurgeFailure {
                    document_id: document.id,
                    reason: err.to_string(),
                }),
            }
        }
        self.record_audit(PurgeScope::History, request.cutoff_days, &outcome);
        Ok(outcome)
    }

    /// Emits an audit record, best-effort.
    fn record_audit(&self, scope: PurgeScope, cutoff_days: u32, outcome: &PurgeOutcome) {
        if let Some(audit) = self.audit {
            let _unused = audit.record(&AuditEvent::Purge {
                scope,
                cutoff_days,
                scanned: outcome.scanned,
                purged: outcome.purged,
                failed: outcome.failed.len(),
            });
        }
    }
}

// ============================================================================
// SECTION: Helper Functions
// ============================================================================

/// Returns whether a history entry survives the cutoff. Entries that do not
/// parse as [`HistoryEntry`] or carry an unparseable date are retained.
fn retain_entry(entry: &Value, cutoff: Timestamp) -> bool {
    let Ok(parsed) = serde_json::from_value::<HistoryEntry>(entry.clone()) else {
        return true;
    };
    match Timestamp::parse_rfc3339(&parsed.date) {
        Ok(date) => date >= cutoff,
        Err(_) => true,
    }
}
