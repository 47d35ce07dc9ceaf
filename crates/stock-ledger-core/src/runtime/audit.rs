// crates/stock-ledger-core/src/runtime/audit.rs
// ============================================================================
// Module: Stock Ledger JSON-Line Audit
// Description: Audit sink writing one JSON record per line.
// Purpose: Persist finalize and purge records without external log deps.
// Dependencies: crate::interfaces, serde_json, std
// ============================================================================

//! ## Overview
//! `JsonLineAudit` serializes each [`AuditEvent`] as a single JSON line to
//! any writer. It is deliberately dependency-light so deployments can point
//! it at a file, a pipe, or a collector without redesign.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;

use crate::interfaces::AuditError;
use crate::interfaces::AuditEvent;
use crate::interfaces::AuditSink;

// ============================================================================
// SECTION: JSON-Line Audit
// ============================================================================

/// Audit sink writing one JSON record per line.
pub struct JsonLineAudit<W: Write + Send> {
    /// Output writer for audit records.
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLineAudit<W> {
    /// Creates an audit sink over the given writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the sink and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] when the writer mutex is poisoned.
    pub fn into_inner(self) -> Result<W, AuditError> {
        self.writer
            .into_inner()
            .map_err(|_| AuditError::Write("audit writer mutex poisoned".to_string()))
    }
}

impl<W: Write + Send> AuditSink for JsonLineAudit<W> {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let mut guard = self
            .writer
            .lock()
            .map_err(|_| AuditError::Write("audit writer mutex poisoned".to_string()))?;
        serde_json::to_writer(&mut *guard, event)
            .map_err(|err| AuditError::Write(err.to_string()))?;
        guard.write_all(b"\n").map_err(|err| AuditError::Write(err.to_string()))?;
        drop(guard);
        Ok(())
    }
}
