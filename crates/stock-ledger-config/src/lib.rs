// crates/stock-ledger-config/src/lib.rs
// ============================================================================
// Module: Stock Ledger Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for stock-ledger.toml semantics.
// Dependencies: stock-ledger-core, stock-ledger-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `stock-ledger-config` defines the canonical configuration model for the
//! stock ledger. Loading is strict and fail-closed: unknown keys are
//! rejected, limits are bounded, and a store backend that cannot satisfy
//! its own requirements refuses to validate.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
