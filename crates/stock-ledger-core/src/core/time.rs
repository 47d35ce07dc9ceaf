// crates/stock-ledger-core/src/core/time.rs
// ============================================================================
// Module: Stock Ledger Time Model
// Description: Canonical timestamp representation for documents and history.
// Purpose: Provide explicit, comparable time values with RFC 3339 string forms.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Stock Ledger timestamps are unix-millisecond values embedded in documents.
//! The engine never reads wall-clock time directly; a [`crate::interfaces::Clock`]
//! supplies "now" so tests stay deterministic. History entries persist their
//! timestamp as an RFC 3339 string, matching the wire format the retention
//! purge parses back.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Milliseconds in one day, used for cutoff arithmetic.
const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1_000;

/// Nanoseconds in one millisecond.
const NANOS_PER_MILLI: i128 = 1_000_000;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Canonical timestamp as unix epoch milliseconds.
///
/// # Invariants
/// - Values are explicitly provided by callers or stamped by the document
///   store; the engine never reads wall-clock time directly.
/// - Ordering follows the underlying millisecond value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(&self) -> i64 {
        self.0
    }

    /// Returns the timestamp moved back by the given number of days.
    #[must_use]
    pub fn minus_days(self, days: u32) -> Self {
        Self(self.0 - i64::from(days) * MILLIS_PER_DAY)
    }

    /// Formats the timestamp as an RFC 3339 string.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError`] when the value falls outside the representable
    /// calendar range.
    pub fn to_rfc3339(&self) -> Result<String, TimeError> {
        let nanos = i128::from(self.0) * NANOS_PER_MILLI;
        let datetime = OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .map_err(|err| TimeError::OutOfRange(err.to_string()))?;
        datetime.format(&Rfc3339).map_err(|err| TimeError::Format(err.to_string()))
    }

    /// Parses an RFC 3339 string into a timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError`] when the string is not valid RFC 3339 or the
    /// value does not fit in unix milliseconds.
    pub fn parse_rfc3339(value: &str) -> Result<Self, TimeError> {
        let datetime = OffsetDateTime::parse(value, &Rfc3339)
            .map_err(|err| TimeError::Parse(err.to_string()))?;
        let millis = datetime.unix_timestamp_nanos() / NANOS_PER_MILLI;
        let millis =
            i64::try_from(millis).map_err(|err| TimeError::OutOfRange(err.to_string()))?;
        Ok(Self(millis))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Timestamp conversion errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum TimeError {
    /// Value falls outside the representable range.
    #[error("timestamp out of range: {0}")]
    OutOfRange(String),
    /// RFC 3339 formatting failed.
    #[error("timestamp format error: {0}")]
    Format(String),
    /// RFC 3339 parsing failed.
    #[error("timestamp parse error: {0}")]
    Parse(String),
}
