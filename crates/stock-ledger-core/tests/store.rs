// crates/stock-ledger-core/tests/store.rs
// ============================================================================
// Module: In-Memory Store Tests
// Description: Contract tests for the in-memory document store.
// Purpose: Validate stamping, merge/append writes, queries, and subscriptions.
// Dependencies: stock-ledger-core, serde_json
// ============================================================================

//! ## Overview
//! Exercises the store contract the runtime depends on: monotonic
//! `created_at` stamping, shallow merges with atomic array append, canonical
//! query semantics, and full-result-set subscription delivery.

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
use stock_ledger_core::DocumentId;
use stock_ledger_core::DocumentStore;
use stock_ledger_core::FIELD_CREATED_AT;
use stock_ledger_core::FIELD_UPDATED_AT;
use stock_ledger_core::FieldMap;
use stock_ledger_core::QuerySpec;
use stock_ledger_core::SortDirection;
use stock_ledger_core::StoreError;

mod common;

fn fields(value: Value) -> FieldMap {
    let Value::Object(map) = value else {
        panic!("fields must be an object");
    };
    map
}

fn stamp(store: &stock_ledger_core::InMemoryDocumentStore, id: &DocumentId, field: &str) -> i64 {
    let document = store
        .get(Collection::Reports, id)
        .expect("get document")
        .expect("document present");
    document.fields.get(field).and_then(Value::as_i64).expect("numeric stamp")
}

#[test]
fn insert_stamps_created_and_updated_identically() {
    let (store, _clock) = common::fixture();
    let id = store
        .insert(Collection::Reports, fields(json!({"report_type": "inventory"})))
        .expect("insert");
    assert_eq!(stamp(&store, &id, FIELD_CREATED_AT), common::T0);
    assert_eq!(stamp(&store, &id, FIELD_UPDATED_AT), common::T0);
}

#[test]
fn created_at_stays_monotonic_when_the_clock_stalls() {
    let (store, _clock) = common::fixture();
    let first = store.insert(Collection::Reports, FieldMap::new()).expect("insert");
    let second = store.insert(Collection::Reports, FieldMap::new()).expect("insert");
    let third = store.insert(Collection::Reports, FieldMap::new()).expect("insert");

    let stamps = [
        stamp(&store, &first, FIELD_CREATED_AT),
        stamp(&store, &second, FIELD_CREATED_AT),
        stamp(&store, &third, FIELD_CREATED_AT),
    ];
    assert!(stamps[0] < stamps[1] && stamps[1] < stamps[2], "stamps: {stamps:?}");
}

#[test]
fn update_merges_fields_and_restamps_updated_at_only() {
    let (store, clock) = common::fixture();
    let id = store
        .insert(Collection::Reports, fields(json!({"report_type": "inventory", "total_items": 1})))
        .expect("insert");
    let created = stamp(&store, &id, FIELD_CREATED_AT);

    clock.advance_millis(5_000);
    store
        .update(Collection::Reports, &id, fields(json!({"total_items": 2})), None)
        .expect("update");

    let document = store
        .get(Collection::Reports, &id)
        .expect("get")
        .expect("present");
    assert_eq!(document.fields.get("total_items"), Some(&json!(2)));
    assert_eq!(document.fields.get("report_type"), Some(&json!("inventory")));
    assert_eq!(stamp(&store, &id, FIELD_CREATED_AT), created);
    assert!(stamp(&store, &id, FIELD_UPDATED_AT) > created);
}

#[test]
fn update_with_null_removes_the_field() {
    let (store, _clock) = common::fixture();
    let id = store
        .insert(
            Collection::Reports,
            fields(json!({"report_type": "delivery", "notes": "two pallets"})),
        )
        .expect("insert");

    store
        .update(Collection::Reports, &id, fields(json!({"notes": null})), None)
        .expect("update");

    let document = store
        .get(Collection::Reports, &id)
        .expect("get")
        .expect("present");
    assert_eq!(document.fields.get("notes"), None);
    assert_eq!(document.fields.get("report_type"), Some(&json!("delivery")));
}

#[test]
fn update_of_missing_document_is_not_found() {
    let (store, _clock) = common::fixture();
    let err = store
        .update(Collection::Reports, &DocumentId::new("nope"), FieldMap::new(), None)
        .expect_err("missing document");
    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[test]
fn array_append_creates_the_array_and_extends_in_order() {
    let (store, _clock) = common::fixture();
    let id = store.insert(Collection::Reports, FieldMap::new()).expect("insert");

    for value in ["first", "second"] {
        store
            .update(
                Collection::Reports,
                &id,
                FieldMap::new(),
                Some(ArrayAppend {
                    field: "log".to_string(),
                    values: vec![json!(value)],
                }),
            )
            .expect("append");
    }

    let document = store.get(Collection::Reports, &id).expect("get").expect("present");
    assert_eq!(document.fields.get("log"), Some(&json!(["first", "second"])));
}

#[test]
fn array_append_to_non_array_field_is_invalid() {
    let (store, _clock) = common::fixture();
    let id = store
        .insert(Collection::Reports, fields(json!({"log": "not an array"})))
        .expect("insert");

    let err = store
        .update(
            Collection::Reports,
            &id,
            FieldMap::new(),
            Some(ArrayAppend {
                field: "log".to_string(),
                values: vec![json!("entry")],
            }),
        )
        .expect_err("append to scalar");
    assert!(matches!(err, StoreError::Invalid(_)), "unexpected error: {err}");
}

#[test]
fn delete_of_absent_document_is_a_noop() {
    let (store, _clock) = common::fixture();
    store.delete(Collection::Reports, &DocumentId::new("nope")).expect("noop delete");
}

#[test]
fn query_applies_filter_order_and_limit() {
    let (store, clock) = common::fixture();
    for (report_type, total) in [("inventory", 1), ("delivery", 2), ("inventory", 3)] {
        clock.advance_millis(1_000);
        store
            .insert(
                Collection::Reports,
                fields(json!({"report_type": report_type, "total_items": total})),
            )
            .expect("insert");
    }

    let query = QuerySpec::new()
        .with_filter("report_type", "inventory")
        .ordered_by(FIELD_CREATED_AT, SortDirection::Descending)
        .with_limit(1);
    let results = store.query(Collection::Reports, &query).expect("query");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].fields.get("total_items"), Some(&json!(3)));
}

#[test]
fn ordering_places_documents_missing_the_field_first() {
    let (store, _clock) = common::fixture();
    store
        .insert(Collection::Reports, fields(json!({"rank": 2})))
        .expect("insert");
    store.insert(Collection::Reports, FieldMap::new()).expect("insert");
    store
        .insert(Collection::Reports, fields(json!({"rank": 1})))
        .expect("insert");

    let query = QuerySpec::new().ordered_by("rank", SortDirection::Ascending);
    let results = store.query(Collection::Reports, &query).expect("query");
    let ranks: Vec<Option<i64>> =
        results.iter().map(|doc| doc.fields.get("rank").and_then(Value::as_i64)).collect();
    assert_eq!(ranks, vec![None, Some(1), Some(2)]);
}

#[test]
fn subscription_delivers_initial_set_then_fresh_sets_on_mutation() {
    let (store, _clock) = common::fixture();
    store.insert(Collection::Reports, FieldMap::new()).expect("insert");

    let subscription = store
        .subscribe(Collection::Reports, QuerySpec::new())
        .expect("subscribe");
    let initial = subscription.recv().expect("initial set");
    assert_eq!(initial.len(), 1);

    let second = store.insert(Collection::Reports, FieldMap::new()).expect("insert");
    let after_insert = subscription.recv().expect("set after insert");
    assert_eq!(after_insert.len(), 2);

    store.delete(Collection::Reports, &second).expect("delete");
    let after_delete = subscription.recv().expect("set after delete");
    assert_eq!(after_delete.len(), 1);
}

#[test]
fn subscription_is_scoped_to_its_collection() {
    let (store, _clock) = common::fixture();
    let subscription = store
        .subscribe(Collection::Reports, QuerySpec::new())
        .expect("subscribe");
    let initial = subscription.recv().expect("initial set");
    assert!(initial.is_empty());

    store.insert(Collection::Products, FieldMap::new()).expect("insert product");
    assert!(subscription.try_recv().is_err(), "product write must not notify report feed");
}
