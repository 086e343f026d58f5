//! Error types for `StockCore`.
//!
//! The taxonomy is deliberately small and kind-tagged so callers can
//! distinguish "fix your input and don't retry" from "transient, retry
//! later" without string-parsing a message:
//!
//! - **`AppendError`**: synchronous input rejection at the write boundary,
//!   plus storage failures surfaced during a write.
//! - **`LedgerError`**: storage-layer failures, propagated unchanged. The
//!   engine never retries internally — retry semantics for a write differ
//!   from a read, and only the caller knows its own idempotency context.
//! - **`SummaryError`**: invalid reporting windows.
//!
//! Degenerate aggregation (division by zero quantity) and empty result sets
//! are never errors anywhere in the engine.

use thiserror::Error;

/// Result type for ledger storage operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors raised when appending an event to the ledger.
///
/// The first two variants are permanent rejections: retrying with the same
/// input will fail again. `Storage` is the transient category.
#[derive(Debug, Error)]
pub enum AppendError {
    /// The event's `quantity_delta` was zero.
    ///
    /// A zero-delta event carries no information; the ledger refuses to
    /// record it.
    #[error("quantity_delta must be non-zero")]
    ZeroDelta,

    /// The event carried a negative unit price.
    ///
    /// `UnitPrice` construction already rejects negatives; this variant
    /// covers inputs arriving through deserialization or FFI paths that
    /// bypass the smart constructor.
    #[error("unit_price_at_event must be non-negative")]
    InvalidPrice,

    /// The underlying store failed; the event was not recorded.
    #[error("storage failure during append: {0}")]
    Storage(#[from] LedgerError),
}

impl AppendError {
    /// Whether retrying the same append can ever succeed.
    ///
    /// Input rejections are permanent; only storage failures are candidates
    /// for a caller-side retry.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Errors surfaced by the storage collaborator.
///
/// These pass through the ledger and stream reader unchanged so the caller
/// sees a distinct "unavailable" condition rather than a wrapped string.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The store could not be reached or refused the operation.
    #[error("ledger storage unavailable: {0}")]
    Unavailable(String),

    /// An I/O error occurred in the storage layer.
    #[error("ledger I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by windowed reporting operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    /// The reporting window start is after its end.
    #[error("invalid window: from {from} is after to {to}")]
    InvalidWindow {
        /// Requested window start.
        from: chrono::NaiveDate,
        /// Requested window end.
        to: chrono::NaiveDate,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_rejections_are_not_retryable() {
        assert!(!AppendError::ZeroDelta.is_retryable());
        assert!(!AppendError::InvalidPrice.is_retryable());
    }

    #[test]
    fn storage_failures_are_retryable() {
        let err = AppendError::Storage(LedgerError::Unavailable("down".to_string()));
        assert!(err.is_retryable());
    }

    #[test]
    fn ledger_error_converts_into_append_error() {
        let ledger_err = LedgerError::Unavailable("connection refused".to_string());
        let append_err: AppendError = ledger_err.into();
        assert!(matches!(append_err, AppendError::Storage(_)));
    }

    #[test]
    fn error_messages_carry_context() {
        let err = LedgerError::Unavailable("timeout".to_string());
        assert!(err.to_string().contains("timeout"));

        let window = SummaryError::InvalidWindow {
            from: chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            to: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        assert!(window.to_string().contains("2024-02-01"));
    }
}
