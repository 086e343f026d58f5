//! In-memory ledger adapter for the `StockCore` valuation engine
//!
//! This crate provides an in-memory implementation of the `StockLedger`
//! trait from the stockcore crate, useful for testing and development
//! scenarios where persistence is not required. It honors the full port
//! contract: append-only, read-after-write visibility, and replay ordering
//! by `(timestamp, event_id)`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::significant_drop_tightening)]

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use stockcore::errors::{AppendError, LedgerResult};
use stockcore::event::{StockEvent, StockEventInput};
use stockcore::ledger::{validate_input, StockLedger};
use stockcore::types::{EventId, ItemId, Timestamp};

/// Thread-safe in-memory stock ledger.
///
/// Events live in a single append-only vector behind an `RwLock`; appends
/// take the write lock, reads take the read lock and clone what they need,
/// so readers never observe a partially written event. Clones of the ledger
/// share the same storage.
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    events: Arc<RwLock<Vec<StockEvent>>>,
}

impl InMemoryLedger {
    /// Creates a new empty in-memory ledger.
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Number of events recorded so far.
    pub fn len(&self) -> usize {
        self.events.read().expect("RwLock poisoned").len()
    }

    /// Whether the ledger holds no events.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StockLedger for InMemoryLedger {
    async fn append(&self, input: StockEventInput) -> Result<EventId, AppendError> {
        validate_input(&input)?;

        let mut events = self.events.write().expect("RwLock poisoned");

        // Id assignment happens under the write lock so ascending ids match
        // insertion order.
        let event_id = EventId::new();
        let event = StockEvent::from_input(event_id, input);

        tracing::debug!(
            %event_id,
            item = %event.item_id,
            delta = event.quantity_delta,
            reason = %event.reason,
            "appended stock event"
        );

        events.push(event);

        Ok(event_id)
    }

    async fn scan(&self, item_id: &ItemId, cutoff: Timestamp) -> LedgerResult<Vec<StockEvent>> {
        let events = self.events.read().expect("RwLock poisoned");

        let mut matching: Vec<StockEvent> = events
            .iter()
            .filter(|event| &event.item_id == item_id && event.timestamp <= cutoff)
            .cloned()
            .collect();

        matching.sort_by_key(StockEvent::replay_key);

        Ok(matching)
    }

    async fn scan_all(&self) -> LedgerResult<Vec<StockEvent>> {
        let events = self.events.read().expect("RwLock poisoned");

        let mut all = events.clone();
        all.sort_by_key(StockEvent::replay_key);

        Ok(all)
    }
}
