// crates/stock-ledger-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Document Store
// Description: Durable DocumentStore backend using SQLite WAL.
// Purpose: Provide production-grade persistence for Stock Ledger documents.
// Dependencies: stock-ledger-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`stock_ledger_core::DocumentStore`]
//! implementation. Documents persist as JSON bodies in a single table;
//! monotonic `created_at` stamping survives process restarts through a
//! persisted counter, so prior-report ordering stays correct across reopens.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_DOCUMENT_BYTES;
pub use store::SqliteDocumentStore;
pub use store::SqliteJournalMode;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteSyncMode;
