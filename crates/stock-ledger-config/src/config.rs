// crates/stock-ledger-config/src/config.rs
// ============================================================================
// Module: Stock Ledger Configuration
// Description: Configuration loading and validation for the stock ledger.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: stock-ledger-core, stock-ledger-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Unknown keys are rejected at parse time and every section validates its
//! own invariants. Missing or invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::Deserialize;
use stock_ledger_core::MAX_NOTES_CHARS;
use stock_ledger_store_sqlite::SqliteJournalMode;
use stock_ledger_store_sqlite::SqliteStoreConfig;
use stock_ledger_store_sqlite::SqliteSyncMode;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "stock-ledger.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "STOCK_LEDGER_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default store busy timeout in milliseconds.
pub(crate) const DEFAULT_STORE_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Minimum allowed store busy timeout in milliseconds.
pub(crate) const MIN_STORE_BUSY_TIMEOUT_MS: u64 = 100;
/// Maximum allowed store busy timeout in milliseconds.
pub(crate) const MAX_STORE_BUSY_TIMEOUT_MS: u64 = 60_000;
/// Default retention cutoff in days for reports and history.
pub(crate) const DEFAULT_RETENTION_CUTOFF_DAYS: u32 = 90;
/// Minimum allowed retention cutoff in days.
pub(crate) const MIN_RETENTION_CUTOFF_DAYS: u32 = 1;
/// Maximum allowed retention cutoff in days (ten years).
pub(crate) const MAX_RETENTION_CUTOFF_DAYS: u32 = 3_650;
/// Default maximum number of items in a single report.
pub(crate) const DEFAULT_MAX_ITEMS_PER_REPORT: usize = 500;
/// Maximum allowed value for `limits.max_items_per_report`.
pub(crate) const MAX_MAX_ITEMS_PER_REPORT: usize = 10_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Stock ledger configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StockLedgerConfig {
    /// Document store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Retention purge configuration.
    #[serde(default)]
    pub retention: RetentionConfig,
    /// Report size limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Optional config source metadata (not serialized).
    #[serde(skip)]
    pub source_modified_at: Option<SystemTime>,
}

impl StockLedgerConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit path, then the `STOCK_LEDGER_CONFIG`
    /// environment variable, then `stock-ledger.toml` in the working
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.source_modified_at = fs::metadata(&resolved).and_then(|meta| meta.modified()).ok();
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        self.retention.validate()?;
        self.limits.validate()?;
        Ok(())
    }
}

/// Document store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub backend: StoreBackend,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: None,
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteJournalMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.busy_timeout_ms < MIN_STORE_BUSY_TIMEOUT_MS
            || self.busy_timeout_ms > MAX_STORE_BUSY_TIMEOUT_MS
        {
            return Err(ConfigError::Invalid(format!(
                "store.busy_timeout_ms must be between {MIN_STORE_BUSY_TIMEOUT_MS} and \
                 {MAX_STORE_BUSY_TIMEOUT_MS}"
            )));
        }
        match self.backend {
            StoreBackend::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid(
                        "memory store must not set path".to_string(),
                    ));
                }
                Ok(())
            }
            StoreBackend::Sqlite => {
                let path = self
                    .path
                    .as_ref()
                    .ok_or_else(|| ConfigError::Invalid("sqlite store requires path".to_string()))?;
                validate_store_path(path)?;
                Ok(())
            }
        }
    }

    /// Builds the sqlite store configuration when the sqlite backend is
    /// selected. Returns `None` for the memory backend.
    #[must_use]
    pub fn sqlite_config(&self) -> Option<SqliteStoreConfig> {
        match self.backend {
            StoreBackend::Memory => None,
            StoreBackend::Sqlite => self.path.as_ref().map(|path| {
                let mut config = SqliteStoreConfig::new(path.clone());
                config.busy_timeout_ms = self.busy_timeout_ms;
                config.journal_mode = self.journal_mode;
                config.sync_mode = self.sync_mode;
                config
            }),
        }
    }
}

/// Document store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Use the in-memory store.
    #[default]
    Memory,
    /// Use the `SQLite`-backed durable store.
    Sqlite,
}

/// Retention purge configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetentionConfig {
    /// Reports older than this many days are purged.
    #[serde(default = "default_retention_cutoff_days")]
    pub report_cutoff_days: u32,
    /// History entries older than this many days are trimmed.
    #[serde(default = "default_retention_cutoff_days")]
    pub history_cutoff_days: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            report_cutoff_days: default_retention_cutoff_days(),
            history_cutoff_days: default_retention_cutoff_days(),
        }
    }
}

impl RetentionConfig {
    /// Validates retention configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_cutoff_days("retention.report_cutoff_days", self.report_cutoff_days)?;
        validate_cutoff_days("retention.history_cutoff_days", self.history_cutoff_days)?;
        Ok(())
    }
}

/// Report size limit configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum number of items accepted in a single report.
    #[serde(default = "default_max_items_per_report")]
    pub max_items_per_report: usize,
    /// Maximum notes length in characters. Fixed by the report model.
    #[serde(default = "default_max_notes_chars")]
    pub max_notes_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_items_per_report: default_max_items_per_report(),
            max_notes_chars: default_max_notes_chars(),
        }
    }
}

impl LimitsConfig {
    /// Validates limit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_items_per_report == 0 || self.max_items_per_report > MAX_MAX_ITEMS_PER_REPORT {
            return Err(ConfigError::Invalid(format!(
                "limits.max_items_per_report must be between 1 and {MAX_MAX_ITEMS_PER_REPORT}"
            )));
        }
        if self.max_notes_chars != MAX_NOTES_CHARS {
            return Err(ConfigError::Invalid(format!(
                "limits.max_notes_chars is fixed at {MAX_NOTES_CHARS}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default store busy timeout in milliseconds.
const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_STORE_BUSY_TIMEOUT_MS
}

/// Default retention cutoff in days.
const fn default_retention_cutoff_days() -> u32 {
    DEFAULT_RETENTION_CUTOFF_DAYS
}

/// Default maximum items per report.
const fn default_max_items_per_report() -> usize {
    DEFAULT_MAX_ITEMS_PER_REPORT
}

/// Default maximum notes length in characters.
const fn default_max_notes_chars() -> usize {
    MAX_NOTES_CHARS
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates the sqlite store path against length limits.
fn validate_store_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid("store.path must be non-empty".to_string()));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("store.path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("store.path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a retention cutoff value against the allowed range.
fn validate_cutoff_days(field: &str, value: u32) -> Result<(), ConfigError> {
    if value < MIN_RETENTION_CUTOFF_DAYS || value > MAX_RETENTION_CUTOFF_DAYS {
        return Err(ConfigError::Invalid(format!(
            "{field} must be between {MIN_RETENTION_CUTOFF_DAYS} and {MAX_RETENTION_CUTOFF_DAYS}"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::*;

    #[test]
    fn validate_path_accepts_short_relative_path() {
        validate_path(Path::new("stock-ledger.toml")).expect("path should validate");
    }

    #[test]
    fn validate_path_rejects_oversized_component() {
        let long = "x".repeat(MAX_PATH_COMPONENT_LENGTH + 1);
        let result = validate_path(Path::new(&long));
        assert!(result.is_err());
    }

    #[test]
    fn validate_store_path_rejects_blank() {
        let result = validate_store_path(Path::new("  "));
        assert!(result.is_err());
    }

    #[test]
    fn validate_cutoff_days_covers_full_range() {
        validate_cutoff_days("retention.report_cutoff_days", MIN_RETENTION_CUTOFF_DAYS)
            .expect("minimum should validate");
        validate_cutoff_days("retention.report_cutoff_days", MAX_RETENTION_CUTOFF_DAYS)
            .expect("maximum should validate");
        assert!(validate_cutoff_days("retention.report_cutoff_days", 0).is_err());
        assert!(
            validate_cutoff_days("retention.report_cutoff_days", MAX_RETENTION_CUTOFF_DAYS + 1)
                .is_err()
        );
    }
}
