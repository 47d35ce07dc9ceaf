// crates/stock-ledger-core/src/core/identifiers.rs
// ============================================================================
// Module: Stock Ledger Identifiers
// Description: Canonical opaque identifiers for documents, products, and reports.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the canonical string-based identifiers used throughout
//! Stock Ledger. Identifiers are opaque and serialize as strings; the document
//! store assigns them on insert. Validation is handled at runtime boundaries
//! rather than within these simple wrappers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Opaque document identifier assigned by the document store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a new document identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identifier and returns the underlying string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Product identifier referencing a catalog document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the identifier as a store document identifier.
    #[must_use]
    pub fn to_document_id(&self) -> DocumentId {
        DocumentId::new(self.0.clone())
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<DocumentId> for ProductId {
    fn from(value: DocumentId) -> Self {
        Self(value.into_inner())
    }
}

/// Report identifier referencing a report document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    /// Creates a new report identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the identifier as a store document identifier.
    #[must_use]
    pub fn to_document_id(&self) -> DocumentId {
        DocumentId::new(self.0.clone())
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ReportId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ReportId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<DocumentId> for ReportId {
    fn from(value: DocumentId) -> Self {
        Self(value.into_inner())
    }
}

/// Human-assigned stock keeping unit code.
///
/// # Invariants
/// - Uniqueness across the catalog is enforced by the catalog collaborator,
///   not here; the reconciliation engine only requires the code to be stable
///   once referenced by a report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    /// Creates a new SKU code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Sku {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Sku {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
