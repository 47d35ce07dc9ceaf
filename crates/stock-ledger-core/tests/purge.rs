// crates/stock-ledger-core/tests/purge.rs
// ============================================================================
// Module: Retention Purge Tests
// Description: Tests for report purge and product history trimming.
// Purpose: Validate cutoff comparisons, re-run safety, and partial failure.
// Dependencies: stock-ledger-core, serde_json
// ============================================================================

//! ## Overview
//! Ensures both purge jobs refuse to run unacknowledged, apply a strict
//! older-than cutoff, tolerate per-document failures by collecting them for
//! the next run, and never delete entries they cannot prove expired.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use serde_json::Value;
use serde_json::json;
use stock_ledger_core::ArrayAppend;
use stock_ledger_core::Collection;
use stock_ledger_core::DocumentStore;
use stock_ledger_core::FIELD_HISTORY;
use stock_ledger_core::FieldMap;
use stock_ledger_core::InMemoryDocumentStore;
use stock_ledger_core::ManualClock;
use stock_ledger_core::PurgeError;
use stock_ledger_core::PurgeRequest;
use stock_ledger_core::QuerySpec;
use stock_ledger_core::ReportId;
use stock_ledger_core::ReportType;
use stock_ledger_core::RetentionPurge;
use stock_ledger_core::Timestamp;

mod common;

/// Finalizes a one-item inventory report at the given age in days before
/// [`common::T0`]. Store stamps are monotonic, so callers must build aged
/// reports oldest-first and reset the clock to [`common::T0`] afterwards.
fn report_aged_days(store: &InMemoryDocumentStore, clock: &ManualClock, age_days: u32) -> ReportId {
    clock.set(Timestamp::from_unix_millis(common::T0).minus_days(age_days));
    let product = common::add_product(store, &format!("SKU-{age_days}"), "aged product");
    let draft = common::draft_with(store, ReportType::Inventory, &[(&product, 1)]);
    common::finalize_draft(store, clock, &draft).report_id
}

#[test]
fn purges_refuse_to_run_without_acknowledgement() {
    let (store, clock) = common::fixture();
    let purge = RetentionPurge::new(&store, clock.as_ref());
    let request = PurgeRequest {
        cutoff_days: 30,
        acknowledge_irreversible: false,
    };

    assert!(matches!(
        purge.purge_reports(&request).expect_err("unacknowledged"),
        PurgeError::NotAcknowledged
    ));
    assert!(matches!(
        purge.purge_history(&request).expect_err("unacknowledged"),
        PurgeError::NotAcknowledged
    ));
}

#[test]
fn report_purge_deletes_strictly_older_reports_only() {
    let (store, clock) = common::fixture();
    let ancient = report_aged_days(&store, &clock, 100);
    let old = report_aged_days(&store, &clock, 40);
    let recent = report_aged_days(&store, &clock, 10);
    clock.set(Timestamp::from_unix_millis(common::T0));

    let purge = RetentionPurge::new(&store, clock.as_ref());
    let outcome = purge.purge_reports(&PurgeRequest::confirmed(30)).expect("purge");
    assert_eq!(outcome.scanned, 3);
    assert_eq!(outcome.purged, 2);
    assert!(outcome.failed.is_empty());

    assert!(store
        .get(Collection::Reports, &recent.to_document_id())
        .expect("get")
        .is_some());
    for gone in [&old, &ancient] {
        assert!(store
            .get(Collection::Reports, &gone.to_document_id())
            .expect("get")
            .is_none());
    }
}

#[test]
fn report_created_exactly_at_the_cutoff_is_retained() {
    let (store, clock) = common::fixture();
    clock.set(Timestamp::from_unix_millis(common::T0).minus_days(30));
    let Value::Object(fields) = json!({
        "report_type": "inventory",
        "items": [],
        "total_items": 0,
    }) else {
        panic!("report fields must be an object");
    };
    let id = store.insert(Collection::Reports, fields).expect("insert report");
    let boundary = ReportId::from(id);
    clock.set(Timestamp::from_unix_millis(common::T0));

    let purge = RetentionPurge::new(&store, clock.as_ref());
    let outcome = purge.purge_reports(&PurgeRequest::confirmed(30)).expect("purge");
    assert_eq!(outcome.purged, 0);
    assert!(store
        .get(Collection::Reports, &boundary.to_document_id())
        .expect("get")
        .is_some());
}

#[test]
fn re_running_a_completed_purge_changes_nothing() {
    let (store, clock) = common::fixture();
    report_aged_days(&store, &clock, 40);
    clock.set(Timestamp::from_unix_millis(common::T0));

    let purge = RetentionPurge::new(&store, clock.as_ref());
    let first = purge.purge_reports(&PurgeRequest::confirmed(30)).expect("purge");
    assert_eq!(first.purged, 1);

    let second = purge.purge_reports(&PurgeRequest::confirmed(30)).expect("purge");
    assert_eq!(second.scanned, 0);
    assert_eq!(second.purged, 0);
}

#[test]
fn delete_failures_are_collected_and_retried_by_re_running() {
    let (store, clock) = common::fixture();
    let old = report_aged_days(&store, &clock, 50);
    let stubborn = report_aged_days(&store, &clock, 40);
    clock.set(Timestamp::from_unix_millis(common::T0));

    let faulty = common::FaultStore::new(store.clone());
    faulty.fail_delete_of(&stubborn.to_document_id());

    let purge = RetentionPurge::new(&faulty, clock.as_ref());
    let outcome = purge.purge_reports(&PurgeRequest::confirmed(30)).expect("purge");
    assert_eq!(outcome.scanned, 2);
    assert_eq!(outcome.purged, 1);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].document_id, stubborn.to_document_id());
    assert!(store
        .get(Collection::Reports, &old.to_document_id())
        .expect("get")
        .is_none());

    // The prescribed recovery is re-running against a healthy store.
    let retry = RetentionPurge::new(&store, clock.as_ref())
        .purge_reports(&PurgeRequest::confirmed(30))
        .expect("retry");
    assert_eq!(retry.purged, 1);
    assert!(retry.failed.is_empty());
}

#[test]
fn history_purge_trims_entries_older_than_the_cutoff() {
    let (store, clock) = common::fixture();
    let product = common::add_product(&store, "SKU-A", "alpha");

    clock.set(Timestamp::from_unix_millis(common::T0).minus_days(100));
    let old = common::draft_with(&store, ReportType::Inventory, &[(&product, 5)]);
    common::finalize_draft(&store, &clock, &old);

    clock.set(Timestamp::from_unix_millis(common::T0).minus_days(10));
    let recent = common::draft_with(&store, ReportType::Inventory, &[(&product, 7)]);
    common::finalize_draft(&store, &clock, &recent);

    clock.set(Timestamp::from_unix_millis(common::T0));
    let purge = RetentionPurge::new(&store, clock.as_ref());
    let outcome = purge.purge_history(&PurgeRequest::confirmed(30)).expect("purge");
    assert_eq!(outcome.purged, 1);

    let history = common::product_history(&store, &product.id);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].details, "Counted 7 (previous 5)");
}

#[test]
fn products_with_nothing_to_trim_are_scanned_but_untouched() {
    let (store, clock) = common::fixture();
    let product = common::add_product(&store, "SKU-A", "alpha");
    let draft = common::draft_with(&store, ReportType::Inventory, &[(&product, 5)]);
    common::finalize_draft(&store, &clock, &draft);

    let purge = RetentionPurge::new(&store, clock.as_ref());
    let outcome = purge.purge_history(&PurgeRequest::confirmed(30)).expect("purge");
    assert_eq!(outcome.scanned, 1);
    assert_eq!(outcome.purged, 0);
    assert_eq!(common::product_history(&store, &product.id).len(), 1);
}

#[test]
fn entries_with_unparseable_dates_are_never_trimmed() {
    let (store, clock) = common::fixture();
    let product = common::add_product(&store, "SKU-A", "alpha");

    clock.set(Timestamp::from_unix_millis(common::T0).minus_days(100));
    let draft = common::draft_with(&store, ReportType::Inventory, &[(&product, 5)]);
    common::finalize_draft(&store, &clock, &draft);

    // A hand-migrated entry whose date never parsed.
    store
        .update(
            Collection::Products,
            &product.id.to_document_id(),
            FieldMap::new(),
            Some(ArrayAppend {
                field: FIELD_HISTORY.to_string(),
                values: vec![json!({
                    "action": "Inventory Count",
                    "date": "last tuesday",
                    "details": "Counted 9",
                    "report_id": "legacy",
                })],
            }),
        )
        .expect("append legacy entry");

    clock.set(Timestamp::from_unix_millis(common::T0));
    let purge = RetentionPurge::new(&store, clock.as_ref());
    let outcome = purge.purge_history(&PurgeRequest::confirmed(30)).expect("purge");
    assert_eq!(outcome.purged, 1);

    let history = common::product_history(&store, &product.id);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].date, "last tuesday");
}

#[test]
fn purge_scan_failure_aborts_before_any_delete() {
    let (store, clock) = common::fixture();
    report_aged_days(&store, &clock, 40);
    clock.set(Timestamp::from_unix_millis(common::T0));

    let faulty = common::FaultStore::new(store.clone());
    faulty.fail_queries();

    let purge = RetentionPurge::new(&faulty, clock.as_ref());
    let err = purge.purge_reports(&PurgeRequest::confirmed(30)).expect_err("scan fails");
    assert!(matches!(err, PurgeError::Store(_)));
    assert_eq!(
        store.query(Collection::Reports, &QuerySpec::new()).expect("query").len(),
        1
    );
}
