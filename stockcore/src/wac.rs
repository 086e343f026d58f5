//! The weighted-average-cost (WAC) cost-flow calculator.
//!
//! This module folds an ordered per-item event stream into running
//! `(quantity, cost_basis)` state. The fold is purely functional — the
//! accumulator is threaded explicitly through [`WacState::apply`], events
//! are never modified, and there is no hidden state — so replay is
//! deterministic and trivially parallelizable across items.
//!
//! # Cost-flow rule
//!
//! Purchases (cost-contributing reasons) blend their unit price into the
//! cost basis. Every other movement is costed at the *current* weighted
//! average of everything in stock, not at its original purchase price:
//! units leaving inventory carry the average cost out with them, and the
//! average itself stays put.
//!
//! # Numeric semantics
//!
//! All price and cost arithmetic uses exact [`Decimal`] values. Running
//! totals retain full precision across the whole fold; rounding to currency
//! precision (2 digits, half-up) happens only when a WAC value is externally
//! reported, so rounding error never compounds across events.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::event::StockEvent;
use crate::types::{EventId, Timestamp};

/// Number of fractional digits in externally reported monetary values.
pub(crate) const REPORT_SCALE: u32 = 2;

/// Running inventory state for a single item under WAC.
///
/// The zero state (`quantity 0`, `cost_basis 0`) is the well-defined result
/// of replaying an empty stream — never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WacState {
    /// Units currently on hand. May be driven negative by the ledger's
    /// deltas; the calculator replays exactly what exists and leaves
    /// non-negativity to the writer's business rules.
    pub quantity: i64,
    /// Total monetary value of the units on hand, at full precision.
    pub cost_basis: Decimal,
}

impl WacState {
    /// The empty state: nothing on hand, nothing valued.
    pub const fn zero() -> Self {
        Self {
            quantity: 0,
            cost_basis: Decimal::ZERO,
        }
    }

    /// The current weighted average unit cost, at full precision.
    ///
    /// Defined as zero when quantity is zero — end-of-life of stock is a
    /// routine state, not a division error.
    pub fn wac(&self) -> Decimal {
        if self.quantity == 0 {
            Decimal::ZERO
        } else {
            self.cost_basis / Decimal::from(self.quantity)
        }
    }

    /// The WAC rounded to currency precision (2 digits, half-up).
    ///
    /// Use this at reporting boundaries only; folds continue from the
    /// full-precision state.
    pub fn reported_wac(&self) -> Decimal {
        self.wac()
            .round_dp_with_strategy(REPORT_SCALE, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Applies one event, returning the next state.
    ///
    /// Cost-contributing reasons add `delta × unit_price` to the basis;
    /// all other reasons move quantity at the current WAC. The sign of the
    /// movement is taken purely from `quantity_delta`'s literal sign, never
    /// inferred from the reason.
    #[must_use]
    pub fn apply(self, event: &StockEvent) -> Self {
        let delta = Decimal::from(event.quantity_delta);
        let cost_delta = if event.reason.is_cost_contributing() {
            delta * event.unit_price_at_event.value()
        } else {
            delta * self.wac()
        };

        Self {
            quantity: self.quantity + event.quantity_delta,
            cost_basis: self.cost_basis + cost_delta,
        }
    }
}

/// The state resulting from one event during an incremental replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationPoint {
    /// The event that produced this state.
    pub event_id: EventId,
    /// The event's instant.
    pub timestamp: Timestamp,
    /// Inventory state immediately after the event.
    pub state: WacState,
}

impl ValuationPoint {
    /// Quantity on hand after the event.
    pub const fn quantity_after(&self) -> i64 {
        self.state.quantity
    }

    /// Cost basis after the event, at full precision.
    pub const fn cost_basis_after(&self) -> Decimal {
        self.state.cost_basis
    }

    /// WAC after the event, at full precision.
    pub fn wac_after(&self) -> Decimal {
        self.state.wac()
    }

    /// Total value of stock on hand after the event (`quantity × wac`).
    pub fn value_after(&self) -> Decimal {
        Decimal::from(self.state.quantity) * self.state.wac()
    }
}

/// Replays a finite ordered event stream to its terminal state.
///
/// This is the point-in-time valuation mode: a pure performance shortcut
/// over [`replay_series`] that produces an identical final state. The input
/// must already be in replay order (ascending timestamp, ties by event id),
/// as produced by the stream reader.
pub fn replay<'a>(events: impl IntoIterator<Item = &'a StockEvent>) -> WacState {
    events
        .into_iter()
        .fold(WacState::zero(), |state, event| state.apply(event))
}

/// Replays a finite ordered event stream, yielding the state after every
/// event.
///
/// This is the time-series mode used by the period aggregator. The final
/// point's state always equals [`replay`] of the same stream; an empty
/// stream yields an empty series.
pub fn replay_series<'a>(events: impl IntoIterator<Item = &'a StockEvent>) -> Vec<ValuationPoint> {
    let mut state = WacState::zero();
    events
        .into_iter()
        .map(|event| {
            state = state.apply(event);
            ValuationPoint {
                event_id: event.event_id,
                timestamp: event.timestamp,
                state,
            }
        })
        .collect()
}
