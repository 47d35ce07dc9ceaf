// crates/stock-ledger-core/src/runtime/clock.rs
// ============================================================================
// Module: Stock Ledger Clocks
// Description: Wall-clock and manually driven Clock implementations.
// Purpose: Supply "now" to the runtime without reading time inside the engine.
// Dependencies: crate::{core, interfaces}, std
// ============================================================================

//! ## Overview
//! [`SystemClock`] reads the host wall clock for production use.
//! [`ManualClock`] is a deterministic clock for tests and replays; it only
//! moves when told to.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use crate::core::time::Timestamp;
use crate::interfaces::Clock;

// ============================================================================
// SECTION: System Clock
// ============================================================================

/// Wall-clock time source.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX));
        Timestamp::from_unix_millis(millis)
    }
}

// ============================================================================
// SECTION: Manual Clock
// ============================================================================

/// Manually driven time source for tests and deterministic replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    /// Current time in unix milliseconds.
    millis: AtomicI64,
}

impl ManualClock {
    /// Creates a manual clock starting at the given time.
    #[must_use]
    pub fn starting_at(now: Timestamp) -> Self {
        Self {
            millis: AtomicI64::new(now.as_unix_millis()),
        }
    }

    /// Sets the current time.
    pub fn set(&self, now: Timestamp) {
        self.millis.store(now.as_unix_millis(), Ordering::SeqCst);
    }

    /// Advances the clock by the given number of milliseconds.
    pub fn advance_millis(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }

    /// Advances the clock by the given number of days.
    pub fn advance_days(&self, days: u32) {
        self.advance_millis(i64::from(days) * 24 * 60 * 60 * 1_000);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_unix_millis(self.millis.load(Ordering::SeqCst))
    }
}
