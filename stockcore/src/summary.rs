//! Windowed financial summaries under WAC.
//!
//! Replays the full event history to produce, for a date window, the classic
//! inventory accounting buckets: opening inventory, purchases, customer
//! returns, cost of goods sold, write-offs, net adjustments, and ending
//! inventory. Events before the window establish the per-item baseline;
//! events inside it are categorized by `(reason, sign of delta)`; the ending
//! position is whatever the fold left behind.
//!
//! The financial equation
//!
//! ```text
//! opening + purchases + returns_in + adjustments − cogs − write_offs = ending
//! ```
//!
//! holds exactly, because every bucket is fed by the same cost deltas the
//! WAC fold itself produces and the ending value is accumulated from those
//! identical sums — there is no separate reconciliation step. (Summing the
//! per-item cost bases instead can differ in the last of `Decimal`'s 28
//! significant digits when non-terminating WAC divisions are added in a
//! different grouping.)

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::SummaryError;
use crate::event::{StockChangeReason, StockEvent};
use crate::types::ItemId;
use crate::wac::WacState;

/// WAC-based financial summary for a date window.
///
/// Quantities are unit counts; `cogs` and `write_offs` are stored as
/// positive magnitudes, `purchases` and `adjustments` as signed nets (a
/// purchase reversal shows up as negative purchases, matching its effect on
/// the cost basis). All monetary values are full-precision decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialSummary {
    /// Inclusive window start.
    pub from: NaiveDate,
    /// Inclusive window end.
    pub to: NaiveDate,
    /// Units on hand across all items at window start.
    pub opening_qty: i64,
    /// Cost basis across all items at window start.
    pub opening_value: Decimal,
    /// Net purchased units within the window (cost-contributing reasons).
    pub purchases_qty: i64,
    /// Net purchase cost within the window.
    pub purchases_cost: Decimal,
    /// Units returned by customers within the window.
    pub returns_in_qty: i64,
    /// Value of customer returns, costed at the WAC in effect.
    pub returns_in_cost: Decimal,
    /// Units sold within the window.
    pub cogs_qty: i64,
    /// Cost of goods sold, costed at the WAC in effect per sale.
    pub cogs_cost: Decimal,
    /// Units written off (damage) within the window.
    pub write_off_qty: i64,
    /// Write-off cost at the WAC in effect.
    pub write_off_cost: Decimal,
    /// Net units of all other movements (transfers, corrections, counts).
    pub adjustments_qty: i64,
    /// Net cost effect of those movements at the WAC in effect.
    pub adjustments_cost: Decimal,
    /// Units on hand across all items at window end.
    pub ending_qty: i64,
    /// Inventory value at window end, carried from the same running sums as
    /// the category buckets so the financial equation balances exactly.
    pub ending_value: Decimal,
}

fn position_totals(state: &HashMap<ItemId, WacState>) -> (i64, Decimal) {
    state.values().fold(
        (0, Decimal::ZERO),
        |(quantity, value), item_state| {
            (
                quantity + item_state.quantity,
                value + item_state.cost_basis,
            )
        },
    )
}

/// Produces a WAC financial summary for the inclusive window `[from, to]`.
///
/// `events` is the full history up to at least the window end (events after
/// the window are ignored); per-item ordering is re-established internally,
/// so any stable ledger scan is an acceptable input. Supplier scoping, when
/// wanted, is applied by filtering `events` before the call, exactly as with
/// the other report operations.
///
/// # Errors
///
/// [`SummaryError::InvalidWindow`] when `from > to`. Empty histories and
/// empty windows are normal inputs producing all-zero summaries.
pub fn financial_summary(
    events: &[StockEvent],
    from: NaiveDate,
    to: NaiveDate,
) -> Result<FinancialSummary, SummaryError> {
    if from > to {
        return Err(SummaryError::InvalidWindow { from, to });
    }

    let mut ordered: Vec<&StockEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.replay_key());

    let mut state: HashMap<ItemId, WacState> = HashMap::new();

    // Baseline: replay everything strictly before the window.
    let mut in_window: Vec<&StockEvent> = Vec::new();
    for event in ordered {
        let date = event.timestamp.as_datetime().date_naive();
        if date < from {
            let entry = state.entry(event.item_id.clone()).or_default();
            *entry = entry.apply(event);
        } else if date <= to {
            in_window.push(event);
        }
    }

    let (opening_qty, opening_value) = position_totals(&state);

    let mut summary = FinancialSummary {
        from,
        to,
        opening_qty,
        opening_value,
        purchases_qty: 0,
        purchases_cost: Decimal::ZERO,
        returns_in_qty: 0,
        returns_in_cost: Decimal::ZERO,
        cogs_qty: 0,
        cogs_cost: Decimal::ZERO,
        write_off_qty: 0,
        write_off_cost: Decimal::ZERO,
        adjustments_qty: 0,
        adjustments_cost: Decimal::ZERO,
        ending_qty: 0,
        ending_value: Decimal::ZERO,
    };

    for event in in_window {
        let entry = state.entry(event.item_id.clone()).or_default();
        let before = *entry;
        let after = before.apply(event);
        // The exact cost this event moved, as the fold saw it.
        let cost_delta = after.cost_basis - before.cost_basis;
        *entry = after;

        let delta = event.quantity_delta;
        match (event.reason, delta > 0) {
            (StockChangeReason::InitialStock | StockChangeReason::Restock, _) => {
                summary.purchases_qty += delta;
                summary.purchases_cost += cost_delta;
            }
            (StockChangeReason::Return, true) => {
                summary.returns_in_qty += delta;
                summary.returns_in_cost += cost_delta;
            }
            (StockChangeReason::Sale, false) => {
                summary.cogs_qty += -delta;
                summary.cogs_cost += -cost_delta;
            }
            (StockChangeReason::Damage, false) => {
                summary.write_off_qty += -delta;
                summary.write_off_cost += -cost_delta;
            }
            _ => {
                summary.adjustments_qty += delta;
                summary.adjustments_cost += cost_delta;
            }
        }
    }

    let (ending_qty, _) = position_totals(&state);
    summary.ending_qty = ending_qty;
    // The ending value telescopes out of the category sums themselves, so
    // the financial equation balances at full precision.
    summary.ending_value = summary.opening_value
        + summary.purchases_cost
        + summary.returns_in_cost
        + summary.adjustments_cost
        - summary.cogs_cost
        - summary.write_off_cost;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Actor, EventId, Timestamp, UnitPrice};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event_on(
        item: &str,
        day: NaiveDate,
        delta: i64,
        price: Decimal,
        reason: StockChangeReason,
    ) -> StockEvent {
        let timestamp = Timestamp::new(
            Utc.with_ymd_and_hms(
                chrono::Datelike::year(&day),
                chrono::Datelike::month(&day),
                chrono::Datelike::day(&day),
                12,
                0,
                0,
            )
            .unwrap(),
        );
        StockEvent {
            event_id: EventId::new(),
            item_id: ItemId::try_new(item).unwrap(),
            supplier_id: None,
            timestamp,
            quantity_delta: delta,
            unit_price_at_event: UnitPrice::try_new(price).unwrap(),
            reason,
            actor: Actor::try_new("tester").unwrap(),
        }
    }

    #[test]
    fn rejects_inverted_window() {
        let result = financial_summary(&[], date(2024, 2, 1), date(2024, 1, 1));
        assert!(matches!(result, Err(SummaryError::InvalidWindow { .. })));
    }

    #[test]
    fn empty_history_yields_all_zero_summary() {
        let summary = financial_summary(&[], date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert_eq!(summary.opening_qty, 0);
        assert_eq!(summary.opening_value, Decimal::ZERO);
        assert_eq!(summary.ending_qty, 0);
        assert_eq!(summary.ending_value, Decimal::ZERO);
    }

    #[test]
    fn opening_position_comes_from_pre_window_replay() {
        let events = vec![
            event_on("a", date(2023, 12, 10), 10, dec!(2.00), StockChangeReason::Restock),
            event_on("a", date(2023, 12, 20), -4, dec!(0.00), StockChangeReason::Sale),
            event_on("a", date(2024, 1, 5), 6, dec!(3.00), StockChangeReason::Restock),
        ];

        let summary = financial_summary(&events, date(2024, 1, 1), date(2024, 1, 31)).unwrap();

        assert_eq!(summary.opening_qty, 6);
        assert_eq!(summary.opening_value, dec!(12.00));
        assert_eq!(summary.purchases_qty, 6);
        assert_eq!(summary.purchases_cost, dec!(18.00));
        assert_eq!(summary.ending_qty, 12);
        assert_eq!(summary.ending_value, dec!(30.00));
    }

    #[test]
    fn events_after_window_are_ignored() {
        let events = vec![
            event_on("a", date(2024, 1, 5), 10, dec!(2.00), StockChangeReason::Restock),
            event_on("a", date(2024, 3, 1), -10, dec!(0.00), StockChangeReason::Sale),
        ];

        let summary = financial_summary(&events, date(2024, 1, 1), date(2024, 1, 31)).unwrap();

        assert_eq!(summary.ending_qty, 10);
        assert_eq!(summary.cogs_qty, 0);
    }

    #[test]
    fn buckets_categorize_by_reason_and_sign() {
        let events = vec![
            event_on("a", date(2024, 1, 2), 20, dec!(5.00), StockChangeReason::Restock),
            event_on("a", date(2024, 1, 10), -6, dec!(0.00), StockChangeReason::Sale),
            event_on("a", date(2024, 1, 12), 2, dec!(9.00), StockChangeReason::Return),
            event_on("a", date(2024, 1, 15), -3, dec!(0.00), StockChangeReason::Damage),
            event_on("a", date(2024, 1, 20), -1, dec!(0.00), StockChangeReason::TransferOut),
        ];

        let summary = financial_summary(&events, date(2024, 1, 1), date(2024, 1, 31)).unwrap();

        assert_eq!(summary.purchases_qty, 20);
        assert_eq!(summary.purchases_cost, dec!(100.00));
        // All non-purchase movements are costed at WAC 5.00, not at their
        // stamped prices.
        assert_eq!(summary.cogs_qty, 6);
        assert_eq!(summary.cogs_cost, dec!(30.00));
        assert_eq!(summary.returns_in_qty, 2);
        assert_eq!(summary.returns_in_cost, dec!(10.00));
        assert_eq!(summary.write_off_qty, 3);
        assert_eq!(summary.write_off_cost, dec!(15.00));
        assert_eq!(summary.adjustments_qty, -1);
        assert_eq!(summary.adjustments_cost, dec!(-5.00));

        assert_eq!(summary.ending_qty, 12);
        assert_eq!(summary.ending_value, dec!(60.00));
    }

    #[test]
    fn outbound_return_counts_as_adjustment() {
        let events = vec![
            event_on("a", date(2024, 1, 2), 10, dec!(4.00), StockChangeReason::Restock),
            event_on("a", date(2024, 1, 9), -2, dec!(0.00), StockChangeReason::Return),
        ];

        let summary = financial_summary(&events, date(2024, 1, 1), date(2024, 1, 31)).unwrap();

        assert_eq!(summary.returns_in_qty, 0);
        assert_eq!(summary.adjustments_qty, -2);
        assert_eq!(summary.adjustments_cost, dec!(-8.00));
    }

    #[test]
    fn equation_balances_with_non_terminating_wac_divisions() {
        // Cost-contributing negative deltas decouple basis from quantity, so
        // the running WAC becomes a repeating decimal (10.00 over 3 units)
        // and every subsequent movement carries a 28-digit cost delta.
        let mut events = vec![
            event_on("a", date(2024, 2, 2), 5, dec!(2.00), StockChangeReason::Restock),
            event_on("a", date(2024, 2, 2), -2, dec!(0.00), StockChangeReason::InitialStock),
        ];
        for day in 3..=20 {
            events.push(event_on("a", date(2024, 2, day), -1, dec!(0.00), StockChangeReason::Sale));
            events.push(event_on("a", date(2024, 2, day), 1, dec!(0.00), StockChangeReason::Return));
            events.push(event_on("b", date(2024, 2, day), -1, dec!(0.00), StockChangeReason::Damage));
            events.push(event_on("b", date(2024, 2, day), 1, dec!(0.00), StockChangeReason::Adjustment));
        }

        let summary = financial_summary(&events, date(2024, 2, 1), date(2024, 2, 29)).unwrap();

        let lhs = summary.opening_value
            + summary.purchases_cost
            + summary.returns_in_cost
            + summary.adjustments_cost
            - summary.cogs_cost
            - summary.write_off_cost;
        assert_eq!(lhs, summary.ending_value);
    }

    fn arb_reason() -> impl Strategy<Value = StockChangeReason> {
        prop_oneof![
            Just(StockChangeReason::InitialStock),
            Just(StockChangeReason::Restock),
            Just(StockChangeReason::Sale),
            Just(StockChangeReason::Return),
            Just(StockChangeReason::Damage),
            Just(StockChangeReason::Adjustment),
            Just(StockChangeReason::TransferIn),
            Just(StockChangeReason::TransferOut),
            Just(StockChangeReason::CountReconciliation),
        ]
    }

    fn arb_event() -> impl Strategy<Value = StockEvent> {
        (
            prop_oneof![Just("a"), Just("b"), Just("c")],
            0u32..120,
            prop_oneof![-50i64..0, 1i64..=50],
            0u32..=10_000,
            arb_reason(),
        )
            .prop_map(|(item, day_offset, delta, cents, reason)| {
                let day = date(2024, 1, 1) + chrono::Duration::days(i64::from(day_offset));
                event_on(item, day, delta, Decimal::new(i64::from(cents), 2), reason)
            })
    }

    proptest! {
        /// The financial equation holds exactly for arbitrary histories.
        #[test]
        fn financial_equation_balances(events in prop::collection::vec(arb_event(), 0..60)) {
            let summary = financial_summary(&events, date(2024, 2, 1), date(2024, 3, 31)).unwrap();

            let lhs = summary.opening_value
                + summary.purchases_cost
                + summary.returns_in_cost
                + summary.adjustments_cost
                - summary.cogs_cost
                - summary.write_off_cost;
            prop_assert_eq!(lhs, summary.ending_value);

            let qty_lhs = summary.opening_qty
                + summary.purchases_qty
                + summary.returns_in_qty
                + summary.adjustments_qty
                - summary.cogs_qty
                - summary.write_off_qty;
            prop_assert_eq!(qty_lhs, summary.ending_qty);
        }
    }
}
