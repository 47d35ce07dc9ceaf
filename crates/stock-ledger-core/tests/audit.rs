// crates/stock-ledger-core/tests/audit.rs
// ============================================================================
// Module: Audit Sink Tests
// Description: Tests for the JSON-line audit sink and runtime audit records.
// Purpose: Validate the one-record-per-line format and emitted event fields.
// Dependencies: stock-ledger-core, serde_json
// ============================================================================

//! ## Overview
//! Ensures the JSON-line sink writes one parseable record per line and that
//! finalize and purge emit tagged events describing what actually happened.

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
use stock_ledger_core::JsonLineAudit;
use stock_ledger_core::PurgeRequest;
use stock_ledger_core::ReportFinalizer;
use stock_ledger_core::ReportType;
use stock_ledger_core::RetentionPurge;

mod common;

fn recorded_lines(audit: JsonLineAudit<Vec<u8>>) -> Vec<Value> {
    let bytes = audit.into_inner().expect("take writer");
    let text = String::from_utf8(bytes).expect("utf8 audit log");
    text.lines()
        .map(|line| serde_json::from_str(line).expect("parseable audit line"))
        .collect()
}

#[test]
fn finalize_emits_a_tagged_record_per_run() {
    let (store, clock) = common::fixture();
    let product = common::add_product(&store, "SKU-A", "alpha");
    let draft = common::draft_with(&store, ReportType::Inventory, &[(&product, 5)]);

    let audit = JsonLineAudit::new(Vec::new());
    let outcome = ReportFinalizer::new(&store, clock.as_ref())
        .with_audit(&audit)
        .finalize(&draft)
        .expect("finalize");

    let lines = recorded_lines(audit);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].get("event"), Some(&Value::from("finalize")));
    assert_eq!(
        lines[0].get("report_id"),
        Some(&Value::from(outcome.report_id.as_str()))
    );
    assert_eq!(lines[0].get("total_items"), Some(&Value::from(1)));
    assert_eq!(lines[0].get("history_appended"), Some(&Value::from(1)));
    assert_eq!(lines[0].get("skipped"), Some(&Value::from(0)));
}

#[test]
fn skipped_history_appends_are_recorded_individually() {
    let (store, clock) = common::fixture();
    let product = common::add_product(&store, "SKU-A", "alpha");
    let mut draft = common::draft_with(&store, ReportType::Inventory, &[(&product, 5)]);
    assert!(matches!(
        draft.add_item(stock_ledger_core::ReportItem {
            product_id: stock_ledger_core::ProductId::from("vanished"),
            sku: stock_ledger_core::Sku::from("SKU-GONE"),
            description: "deleted product".to_string(),
            current_count: 4,
            previous_count: Some(0),
        }),
        stock_ledger_core::AddOutcome::Added
    ));

    let audit = JsonLineAudit::new(Vec::new());
    ReportFinalizer::new(&store, clock.as_ref())
        .with_audit(&audit)
        .finalize(&draft)
        .expect("finalize");

    let lines = recorded_lines(audit);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].get("event"), Some(&Value::from("history_skipped")));
    assert_eq!(lines[0].get("product_id"), Some(&Value::from("vanished")));
    assert_eq!(lines[1].get("event"), Some(&Value::from("finalize")));
    assert_eq!(lines[1].get("skipped"), Some(&Value::from(1)));
}

#[test]
fn purge_runs_emit_scope_and_counts() {
    let (store, clock) = common::fixture();
    let product = common::add_product(&store, "SKU-A", "alpha");
    let draft = common::draft_with(&store, ReportType::Inventory, &[(&product, 5)]);
    common::finalize_draft(&store, &clock, &draft);
    clock.advance_days(60);

    let audit = JsonLineAudit::new(Vec::new());
    RetentionPurge::new(&store, clock.as_ref())
        .with_audit(&audit)
        .purge_reports(&PurgeRequest::confirmed(30))
        .expect("purge");

    let lines = recorded_lines(audit);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].get("event"), Some(&Value::from("purge")));
    assert_eq!(lines[0].get("scope"), Some(&Value::from("reports")));
    assert_eq!(lines[0].get("cutoff_days"), Some(&Value::from(30)));
    assert_eq!(lines[0].get("scanned"), Some(&Value::from(1)));
    assert_eq!(lines[0].get("purged"), Some(&Value::from(1)));
    assert_eq!(lines[0].get("failed"), Some(&Value::from(0)));
}
