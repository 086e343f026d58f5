//! The stock event model: the only entity ever written to the ledger.
//!
//! A [`StockEventInput`] is what callers hand to `append`; a [`StockEvent`]
//! is the stored, immutable record with its ledger-assigned [`EventId`].
//! Stored events are created exactly once and live forever; every reader
//! treats them as read-only.

use serde::{Deserialize, Serialize};

use crate::types::{Actor, EventId, ItemId, SupplierId, Timestamp, UnitPrice};

/// Classification of a stock change.
///
/// The reason is a closed sum type rather than a string so that the
/// cost-contributing distinction in the WAC calculator is exhaustive and
/// checked at compile time. Corrections are modeled as new events with an
/// [`Adjustment`](Self::Adjustment) reason, never as edits to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockChangeReason {
    /// Initial quantity entered when an item first enters the inventory.
    InitialStock,
    /// New stock purchased from a supplier.
    Restock,
    /// Stock sold to a customer (outbound).
    Sale,
    /// Stock returned by a customer (inbound) or to a supplier (outbound).
    Return,
    /// Stock damaged, destroyed or expired.
    Damage,
    /// Manual correction, e.g. a discrepancy fix.
    Adjustment,
    /// Stock transferred in from another location.
    TransferIn,
    /// Stock transferred out to another location.
    TransferOut,
    /// Reconciliation after a physical stock count.
    CountReconciliation,
}

impl StockChangeReason {
    /// Whether events with this reason contribute to the WAC cost basis.
    ///
    /// Only purchases (initial stock, restock) blend their unit price into
    /// the weighted average. Every other reason moves quantity at the current
    /// WAC, leaving the average itself unchanged.
    pub const fn is_cost_contributing(self) -> bool {
        matches!(self, Self::InitialStock | Self::Restock)
    }
}

impl std::fmt::Display for StockChangeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::InitialStock => "INITIAL_STOCK",
            Self::Restock => "RESTOCK",
            Self::Sale => "SALE",
            Self::Return => "RETURN",
            Self::Damage => "DAMAGE",
            Self::Adjustment => "ADJUSTMENT",
            Self::TransferIn => "TRANSFER_IN",
            Self::TransferOut => "TRANSFER_OUT",
            Self::CountReconciliation => "COUNT_RECONCILIATION",
        };
        f.write_str(label)
    }
}

/// A stock change submitted for appending to the ledger.
///
/// Carries everything except the [`EventId`], which the ledger assigns at
/// append time. The supplier id and unit price are denormalized here: they
/// capture the state of the world at the moment of the change, so historical
/// valuation never depends on current catalog data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEventInput {
    /// The inventory item affected.
    pub item_id: ItemId,
    /// Supplier associated with the item at event time.
    pub supplier_id: Option<SupplierId>,
    /// When the change occurred.
    pub timestamp: Timestamp,
    /// Signed quantity change; positive = inbound, negative = outbound.
    /// Never zero — a zero-delta event carries no information and is
    /// rejected at append time.
    pub quantity_delta: i64,
    /// Unit price in effect at the moment of this specific change.
    pub unit_price_at_event: UnitPrice,
    /// Classification of the change.
    pub reason: StockChangeReason,
    /// Who or what triggered the change (audit only).
    pub actor: Actor,
}

/// An immutable stock event as stored in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEvent {
    /// Unique identifier assigned at append time, never reused.
    pub event_id: EventId,
    /// The inventory item affected.
    pub item_id: ItemId,
    /// Supplier associated with the item at event time (denormalized).
    pub supplier_id: Option<SupplierId>,
    /// When the change occurred. Ties are broken by ascending `event_id`.
    pub timestamp: Timestamp,
    /// Signed quantity change; positive = inbound, negative = outbound.
    pub quantity_delta: i64,
    /// Unit price in effect at the moment of this change (denormalized).
    pub unit_price_at_event: UnitPrice,
    /// Classification of the change.
    pub reason: StockChangeReason,
    /// Who or what triggered the change.
    pub actor: Actor,
}

impl StockEvent {
    /// Creates a stored event from an accepted input and its assigned id.
    pub fn from_input(event_id: EventId, input: StockEventInput) -> Self {
        Self {
            event_id,
            item_id: input.item_id,
            supplier_id: input.supplier_id,
            timestamp: input.timestamp,
            quantity_delta: input.quantity_delta,
            unit_price_at_event: input.unit_price_at_event,
            reason: input.reason,
            actor: input.actor,
        }
    }

    /// The replay sort key: ascending timestamp, ties broken by ascending
    /// `event_id` (insertion order) to keep replay deterministic.
    pub fn replay_key(&self) -> (Timestamp, EventId) {
        (self.timestamp, self.event_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_input() -> StockEventInput {
        StockEventInput {
            item_id: ItemId::try_new("item-1").unwrap(),
            supplier_id: Some(SupplierId::try_new("acme").unwrap()),
            timestamp: Timestamp::now(),
            quantity_delta: 10,
            unit_price_at_event: UnitPrice::try_new(dec!(2.00)).unwrap(),
            reason: StockChangeReason::Restock,
            actor: Actor::try_new("tester").unwrap(),
        }
    }

    #[test]
    fn only_purchases_contribute_to_cost() {
        assert!(StockChangeReason::InitialStock.is_cost_contributing());
        assert!(StockChangeReason::Restock.is_cost_contributing());

        for reason in [
            StockChangeReason::Sale,
            StockChangeReason::Return,
            StockChangeReason::Damage,
            StockChangeReason::Adjustment,
            StockChangeReason::TransferIn,
            StockChangeReason::TransferOut,
            StockChangeReason::CountReconciliation,
        ] {
            assert!(!reason.is_cost_contributing(), "{reason} must not contribute");
        }
    }

    #[test]
    fn from_input_preserves_all_fields() {
        let input = sample_input();
        let event_id = EventId::new();
        let event = StockEvent::from_input(event_id, input.clone());

        assert_eq!(event.event_id, event_id);
        assert_eq!(event.item_id, input.item_id);
        assert_eq!(event.supplier_id, input.supplier_id);
        assert_eq!(event.timestamp, input.timestamp);
        assert_eq!(event.quantity_delta, input.quantity_delta);
        assert_eq!(event.unit_price_at_event, input.unit_price_at_event);
        assert_eq!(event.reason, input.reason);
        assert_eq!(event.actor, input.actor);
    }

    #[test]
    fn replay_key_orders_by_timestamp_then_id() {
        let shared = Timestamp::now();
        let mut first = StockEvent::from_input(EventId::new(), sample_input());
        let mut second = StockEvent::from_input(EventId::new(), sample_input());

        first.timestamp = shared;
        second.timestamp = shared;

        assert!(first.replay_key() < second.replay_key());
    }

    #[test]
    fn reason_serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&StockChangeReason::InitialStock).unwrap();
        assert_eq!(json, "\"INITIAL_STOCK\"");

        let parsed: StockChangeReason = serde_json::from_str("\"COUNT_RECONCILIATION\"").unwrap();
        assert_eq!(parsed, StockChangeReason::CountReconciliation);
    }

    #[test]
    fn stock_event_roundtrip_serialization() {
        let event = StockEvent::from_input(EventId::new(), sample_input());
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: StockEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deserialized);
    }
}
