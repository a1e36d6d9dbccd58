//! Persistence seam for ledger changes.

use thiserror::Error;

use crate::StockKey;

/// Error reported by a [`StockSink`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("stock sink failed: {message}")]
pub struct StockSinkError {
    /// Description of the failure.
    pub message: String,
}

impl StockSinkError {
    /// Error carrying `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Receives the new quantity of every ledger entry changed by an accepted
/// event.
///
/// Calls happen after the engine lock is released, one batch at a time, and
/// a key never receives an older quantity after a newer one. Writes are
/// best effort: the engine logs failures and keeps its in-memory state.
pub trait StockSink: Send + Sync {
    /// Record that `key` now holds `qty`.
    ///
    /// # Errors
    ///
    /// Returns [`StockSinkError`] when the write could not be made.
    fn upsert(&self, key: &StockKey, qty: f64) -> Result<(), StockSinkError>;
}

/// Sink that discards every write.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStockSink;

impl StockSink for NullStockSink {
    fn upsert(&self, _key: &StockKey, _qty: f64) -> Result<(), StockSinkError> {
        Ok(())
    }
}
