// crates/stock-ledger-core/tests/snapshot.rs
// ============================================================================
// Module: Snapshot Index Tests
// Description: Tests for prior-report lookup and carry-over counts.
// Purpose: Validate zero defaults, same-type scoping, and loud store failures.
// Dependencies: stock-ledger-core
// ============================================================================

//! ## Overview
//! Ensures carry-over counts come from the single most recent report of the
//! same type, default to zero only for genuinely absent priors, and surface
//! store failures instead of silently reporting zero.

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

use stock_ledger_core::ReportType;
use stock_ledger_core::SnapshotIndex;

mod common;

#[test]
fn previous_count_is_zero_without_any_prior_report() {
    let (store, _clock) = common::fixture();
    let product = common::add_product(&store, "SKU-1", "widget");

    let index = SnapshotIndex::new(&store);
    let count = index
        .previous_count_for(ReportType::Inventory, &product.id)
        .expect("lookup");
    assert_eq!(count, 0);
}

#[test]
fn previous_count_is_zero_when_product_missing_from_prior_report() {
    let (store, clock) = common::fixture();
    let counted = common::add_product(&store, "SKU-1", "widget");
    let uncounted = common::add_product(&store, "SKU-2", "gadget");

    let draft = common::draft_with(&store, ReportType::Inventory, &[(&counted, 5)]);
    common::finalize_draft(&store, &clock, &draft);

    let index = SnapshotIndex::new(&store);
    let count = index
        .previous_count_for(ReportType::Inventory, &uncounted.id)
        .expect("lookup");
    assert_eq!(count, 0);
}

#[test]
fn previous_count_comes_from_the_single_most_recent_report() {
    let (store, clock) = common::fixture();
    let product = common::add_product(&store, "SKU-1", "widget");

    let first = common::draft_with(&store, ReportType::Inventory, &[(&product, 5)]);
    common::finalize_draft(&store, &clock, &first);
    clock.advance_days(1);
    let second = common::draft_with(&store, ReportType::Inventory, &[(&product, 9)]);
    common::finalize_draft(&store, &clock, &second);

    let index = SnapshotIndex::new(&store);
    let count = index
        .previous_count_for(ReportType::Inventory, &product.id)
        .expect("lookup");
    assert_eq!(count, 9);
}

#[test]
fn reports_of_other_types_never_contribute() {
    let (store, clock) = common::fixture();
    let product = common::add_product(&store, "SKU-1", "widget");

    let tested = common::draft_with(&store, ReportType::Tested, &[(&product, 4)]);
    common::finalize_draft(&store, &clock, &tested);

    let index = SnapshotIndex::new(&store);
    let count = index
        .previous_count_for(ReportType::Inventory, &product.id)
        .expect("lookup");
    assert_eq!(count, 0);
}

#[test]
fn new_inventory_item_snapshots_sku_description_and_prior_count() {
    let (store, clock) = common::fixture();
    let product = common::add_product(&store, "SKU-1", "widget");

    let first = common::draft_with(&store, ReportType::Inventory, &[(&product, 5)]);
    common::finalize_draft(&store, &clock, &first);

    let index = SnapshotIndex::new(&store);
    let item = index
        .new_item(ReportType::Inventory, &product, 7)
        .expect("build item");
    assert_eq!(item.sku.as_str(), "SKU-1");
    assert_eq!(item.description, "widget");
    assert_eq!(item.current_count, 7);
    assert_eq!(item.previous_count, Some(5));
}

#[test]
fn delivery_items_carry_no_previous_count() {
    let (store, clock) = common::fixture();
    let product = common::add_product(&store, "SKU-1", "widget");

    let delivery = common::draft_with(&store, ReportType::Delivery, &[(&product, 5)]);
    common::finalize_draft(&store, &clock, &delivery);

    let index = SnapshotIndex::new(&store);
    let item = index
        .new_item(ReportType::Delivery, &product, 3)
        .expect("build item");
    assert_eq!(item.previous_count, None);
}

#[test]
fn store_failure_propagates_instead_of_defaulting_to_zero() {
    let (store, _clock) = common::fixture();
    let product = common::add_product(&store, "SKU-1", "widget");

    let faulty = common::FaultStore::new(store);
    faulty.fail_queries();

    let index = SnapshotIndex::new(&faulty);
    let err = index
        .previous_count_for(ReportType::Inventory, &product.id)
        .expect_err("query failure must surface");
    assert!(err.to_string().contains("injected query failure"), "unexpected error: {err}");
}
