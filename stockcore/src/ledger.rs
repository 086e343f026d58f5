//! The append-only stock ledger port.
//!
//! This module defines the [`StockLedger`] trait that serves as the port
//! interface for durable, append-only stores of stock events. The trait is
//! backend-independent: a relational table with an insert-only access
//! pattern, a log-structured store, or an in-memory vector all satisfy it,
//! as long as they preserve the event fields and ordering guarantees.
//!
//! There is deliberately no `update` and no `delete` anywhere in this
//! contract. Any correction must be modeled as a new compensating event with
//! an [`Adjustment`](crate::event::StockChangeReason::Adjustment) reason.

use async_trait::async_trait;

use crate::errors::{AppendError, LedgerResult};
use crate::event::{StockEvent, StockEventInput};
use crate::types::{EventId, ItemId, Timestamp};

/// Validates an event input against the append contract.
///
/// Implementations call this before recording anything, so every backend
/// rejects the same inputs: zero deltas and (for values smuggled past the
/// `UnitPrice` constructor) negative prices.
pub fn validate_input(input: &StockEventInput) -> Result<(), AppendError> {
    if input.quantity_delta == 0 {
        return Err(AppendError::ZeroDelta);
    }
    if input.unit_price_at_event.value().is_sign_negative() {
        return Err(AppendError::InvalidPrice);
    }
    Ok(())
}

/// A durable, append-only store of stock events.
///
/// # Visibility
///
/// A successful `append` must be durably visible to all subsequent reads —
/// no partial visibility. The store is the sole arbiter of write ordering;
/// the engine holds no locks of its own. Reads started before a concurrent
/// append may or may not observe the new event; since the ledger never
/// retracts data, eventual visibility is sufficient.
///
/// # Ordering
///
/// `scan` returns events in ascending `(timestamp, event_id)` order. The
/// `event_id` tie-break reflects insertion order (ids are UUIDv7, assigned
/// at append time), which keeps replay deterministic even when callers
/// supply identical timestamps.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Appends one event to the ledger and returns its assigned id.
    ///
    /// # Errors
    ///
    /// * [`AppendError::ZeroDelta`] — `quantity_delta == 0`; permanent.
    /// * [`AppendError::InvalidPrice`] — negative unit price; permanent.
    /// * [`AppendError::Storage`] — the store failed; the event was not
    ///   recorded and the caller may retry under its own policy.
    async fn append(&self, input: StockEventInput) -> Result<EventId, AppendError>;

    /// Returns all events for one item at or before `cutoff`, in replay
    /// order.
    ///
    /// An item with no history yields an empty vector, not an error.
    async fn scan(&self, item_id: &ItemId, cutoff: Timestamp) -> LedgerResult<Vec<StockEvent>>;

    /// Returns every event in the ledger, in replay order.
    ///
    /// This is the audit/search access path used by the query filter
    /// engine, which applies its own predicates on top.
    async fn scan_all(&self) -> LedgerResult<Vec<StockEvent>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::StockChangeReason;
    use crate::types::{Actor, UnitPrice};
    use rust_decimal_macros::dec;

    fn input(delta: i64) -> StockEventInput {
        StockEventInput {
            item_id: ItemId::try_new("item-1").unwrap(),
            supplier_id: None,
            timestamp: Timestamp::now(),
            quantity_delta: delta,
            unit_price_at_event: UnitPrice::try_new(dec!(1.50)).unwrap(),
            reason: StockChangeReason::Restock,
            actor: Actor::try_new("tester").unwrap(),
        }
    }

    #[test]
    fn zero_delta_is_rejected() {
        let result = validate_input(&input(0));
        assert!(matches!(result, Err(AppendError::ZeroDelta)));
    }

    #[test]
    fn non_zero_deltas_pass_validation() {
        assert!(validate_input(&input(5)).is_ok());
        assert!(validate_input(&input(-5)).is_ok());
    }
}
