//! Time-ordered event stream reads for replay.
//!
//! The [`EventStreamReader`] produces, for one item, the finite ordered
//! sequence of events the WAC calculator folds over. Reads are pure
//! functions of ledger state at call time: restartable, abandonable
//! mid-iteration, and free of locks or partial writes.

use crate::errors::LedgerResult;
use crate::event::StockEvent;
use crate::ledger::StockLedger;
use crate::types::{ItemId, Timestamp};

/// Reads per-item event streams from a ledger.
///
/// Borrowing the ledger keeps the reader itself stateless; constructing one
/// is free and every call sees the ledger as it is at that moment.
#[derive(Debug, Clone, Copy)]
pub struct EventStreamReader<'a, L: StockLedger + ?Sized> {
    ledger: &'a L,
}

impl<'a, L: StockLedger + ?Sized> EventStreamReader<'a, L> {
    /// Creates a reader over the given ledger.
    pub const fn new(ledger: &'a L) -> Self {
        Self { ledger }
    }

    /// Returns the item's events at or before `cutoff`, in replay order.
    ///
    /// Ordering is ascending timestamp with ties broken by ascending
    /// `event_id` (insertion order). When `supplier_filter` is present it is
    /// matched case-insensitively against the denormalized supplier id on
    /// each event — not a live join, so historical reads stay stable.
    ///
    /// An empty result is a normal outcome: "no history" is not an error.
    ///
    /// # Errors
    ///
    /// Propagates storage failures from the ledger unchanged.
    pub async fn read(
        &self,
        item_id: &ItemId,
        cutoff: Timestamp,
        supplier_filter: Option<&str>,
    ) -> LedgerResult<Vec<StockEvent>> {
        let mut events = self.ledger.scan(item_id, cutoff).await?;

        if let Some(supplier) = supplier_filter {
            events.retain(|event| {
                event
                    .supplier_id
                    .as_ref()
                    .is_some_and(|id| id.matches_ignore_case(supplier))
            });
        }

        // Replay order: ascending timestamp, ties by ascending event id.
        events.sort_by_key(StockEvent::replay_key);

        Ok(events)
    }
}
