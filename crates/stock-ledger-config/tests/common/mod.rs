// crates/stock-ledger-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for stock-ledger-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::path::PathBuf;

use stock_ledger_config::StockLedgerConfig;
use stock_ledger_config::StoreBackend;

/// Parses a TOML string into a `StockLedgerConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<StockLedgerConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a minimal config with all defaults applied.
pub fn minimal_config() -> Result<StockLedgerConfig, toml::de::Error> {
    config_from_toml("")
}

/// Returns a minimal config switched to the sqlite backend at the given path.
pub fn sqlite_config(path: &str) -> Result<StockLedgerConfig, toml::de::Error> {
    let mut config = minimal_config()?;
    config.store.backend = StoreBackend::Sqlite;
    config.store.path = Some(PathBuf::from(path));
    Ok(config)
}
