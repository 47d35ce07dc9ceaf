// crates/stock-ledger-core/src/runtime/feed.rs
// ============================================================================
// Module: Stock Ledger Report Feed
// Description: Typed live view over the report collection.
// Purpose: Deliver newest-first report lists on every collection change.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The feed wraps the store's subscription primitive into a typed,
//! UI-agnostic surface: a channel delivering the full, newest-first report
//! list immediately and again after every mutation of the collection.
//! Hosts poll or block on it; no framework lifecycle is involved.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::mpsc::RecvError;
use std::sync::mpsc::TryRecvError;

use thiserror::Error;

use crate::core::report::ReportRecord;
use crate::core::report::ReportType;
use crate::interfaces::Collection;
use crate::interfaces::DocumentStore;
use crate::interfaces::FIELD_CREATED_AT;
use crate::interfaces::FIELD_REPORT_TYPE;
use crate::interfaces::QuerySpec;
use crate::interfaces::SortDirection;
use crate::interfaces::StoreError;
use crate::interfaces::StoredDocument;
use crate::interfaces::Subscription;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Report feed errors.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The store side of the subscription was dropped.
    #[error("report feed closed")]
    Closed,
    /// A delivered document did not parse as a report.
    #[error("report feed corruption: {0}")]
    Corrupt(String),
}

// ============================================================================
// SECTION: Report Feed
// ============================================================================

/// Live, newest-first view of the report collection.
pub struct ReportFeed {
    /// Underlying store subscription.
    subscription: Subscription,
}

impl ReportFeed {
    /// Subscribes to all reports, optionally filtered to one type, ordered
    /// newest-first by creation time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the subscription cannot be established.
    pub fn subscribe<S: DocumentStore>(
        store: &S,
        report_type: Option<ReportType>,
    ) -> Result<Self, StoreError> {
        let mut query =
            QuerySpec::new().ordered_by(FIELD_CREATED_AT, SortDirection::Descending);
        if let Some(filter) = report_type {
            query = query.with_filter(FIELD_REPORT_TYPE, filter.as_str());
        }
        Ok(Self {
            subscription: store.subscribe(Collection::Reports, query)?,
        })
    }

    /// Blocks until the next full result set arrives.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Closed`] when the store was dropped and
    /// [`FeedError::Corrupt`] when a document does not parse.
    pub fn recv(&self) -> Result<Vec<ReportRecord>, FeedError> {
        let documents = self.subscription.recv().map_err(|RecvError| FeedError::Closed)?;
        parse_documents(documents)
    }

    /// Returns the next full result set when one is pending.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Closed`] when the store was dropped and
    /// [`FeedError::Corrupt`] when a document does not parse.
    pub fn try_recv(&self) -> Result<Option<Vec<ReportRecord>>, FeedError> {
        match self.subscription.try_recv() {
            Ok(documents) => parse_documents(documents).map(Some),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(FeedError::Closed),
        }
    }
}

// ============================================================================
// SECTION: Helper Functions
// ============================================================================

/// Parses a delivered document set into report records.
fn parse_documents(documents: Vec<StoredDocument>) -> Result<Vec<ReportRecord>, FeedError> {
    documents
        .into_iter()
        .map(|document| {
            ReportRecord::from_document(document).map_err(|err| FeedError::Corrupt(err.to_string()))
        })
        .collect()
}
