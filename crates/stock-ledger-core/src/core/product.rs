// crates/stock-ledger-core/src/core/product.rs
// ============================================================================
// Module: Stock Ledger Product Types
// Description: Product catalog view and append-only audit history entries.
// Purpose: Provide the product shape the reconciliation engine reads and appends to.
// Dependencies: crate::core::{identifiers, time}, serde
// ============================================================================

//! ## Overview
//! Products are owned by the catalog collaborator. The reconciliation engine
//! reads them for SKU/description snapshots and mutates them in exactly one
//! way: appending [`HistoryEntry`] records and bumping `updated_at`. History
//! is append-only and insertion order is chronological order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ProductId;
use crate::core::identifiers::ReportId;
use crate::core::identifiers::Sku;
use crate::core::time::Timestamp;
use crate::interfaces::StoreError;
use crate::interfaces::StoredDocument;

// ============================================================================
// SECTION: Product Status
// ============================================================================

/// Product lifecycle status managed by the catalog collaborator.
///
/// # Invariants
/// - Variants are stable for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Product is active and counted.
    Active,
    /// Product is retired from counting.
    Inactive,
}

// ============================================================================
// SECTION: History
// ============================================================================

/// Immutable audit history entry appended to a product.
///
/// # Invariants
/// - Entries are never rewritten once appended; the retention purge may trim
///   whole entries but never edits them.
/// - `report_id` is a non-owning back-reference; deleting the report leaves
///   it dangling by design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Label identifying the operation that produced the entry.
    pub action: String,
    /// RFC 3339 timestamp assigned at append time. May lag the owning
    /// report's `created_at` since writes are sequential, not simultaneous.
    pub date: String,
    /// Human summary of the count and its delta context.
    pub details: String,
    /// Back-reference to the report that produced the entry.
    pub report_id: ReportId,
}

// ============================================================================
// SECTION: Product
// ============================================================================

/// Product document body as read from the document store.
///
/// # Invariants
/// - `sku` is unique across the catalog at write time (enforced by the
///   catalog collaborator) and stable once referenced by a report.
/// - `history` insertion order is chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Human-assigned stock keeping unit code.
    pub sku: Sku,
    /// Optional barcode string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ean: Option<String>,
    /// Product description snapshot source.
    pub description: String,
    /// Optional model designation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Lifecycle status.
    pub status: ProductStatus,
    /// Append-only audit history.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// Last modification time, stamped by the document store.
    pub updated_at: Timestamp,
}

/// Product document paired with its store identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    /// Store-assigned product identifier.
    pub id: ProductId,
    /// Product document body.
    pub product: Product,
}

impl ProductRecord {
    /// Parses a stored document into a product record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] when the document body does not match
    /// the product shape.
    pub fn from_document(document: StoredDocument) -> Result<Self, StoreError> {
        let product =
            serde_json::from_value(serde_json::Value::Object(document.fields)).map_err(|err| {
                StoreError::Corrupt(format!("product {}: {err}", document.id.as_str()))
            })?;
        Ok(Self {
            id: ProductId::from(document.id),
            product,
        })
    }
}
