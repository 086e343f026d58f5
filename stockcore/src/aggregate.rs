//! Calendar bucketing of valuation time series.
//!
//! The period aggregator turns the WAC calculator's incremental output into
//! daily or monthly snapshots. For each item and bucket only the *last*
//! event's resulting state counts — the snapshot answers "what was on hand
//! at the end of this period" without reconstructing full inventory per
//! bucket. Buckets with no events carry the previous bucket's state forward:
//! no activity is not the same as zero inventory.
//!
//! Bucket keys are computed by a single truncation function in core, so no
//! storage backend's date functions are ever a correctness dependency.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::SummaryError;
use crate::event::StockEvent;
use crate::types::{ItemId, Timestamp};
use crate::wac::{replay_series, ValuationPoint, WacState, REPORT_SCALE};

/// Calendar bucket width for time-series reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    /// One bucket per calendar day.
    Day,
    /// One bucket per calendar month.
    Month,
}

/// Truncates a timestamp to its bucket key.
///
/// Day buckets are keyed by their date; month buckets by the first day of
/// the month. Keys are UTC dates.
pub fn bucket_key(timestamp: Timestamp, granularity: Granularity) -> NaiveDate {
    truncate_date(timestamp.as_datetime().date_naive(), granularity)
}

fn truncate_date(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => date,
        Granularity::Month => date
            .with_day(1)
            .expect("the first of a month is always a valid date"),
    }
}

fn next_bucket(bucket: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => bucket.succ_opt().expect("date overflow"),
        Granularity::Month => bucket
            .checked_add_months(Months::new(1))
            .expect("date overflow"),
    }
}

/// One item's end-of-bucket inventory state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSnapshot {
    /// The bucket key (day, or first day of month).
    pub bucket: NaiveDate,
    /// Inventory state at the end of the bucket.
    pub state: WacState,
}

/// Total valuation across items for one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketValuation {
    /// The bucket key.
    pub bucket: NaiveDate,
    /// `Σ quantity_after × wac_after` across all items active in the bucket,
    /// at full precision.
    pub total_value: Decimal,
}

fn supplier_matches(event: &StockEvent, supplier_filter: Option<&str>) -> bool {
    supplier_filter.map_or(true, |supplier| {
        event
            .supplier_id
            .as_ref()
            .is_some_and(|id| id.matches_ignore_case(supplier))
    })
}

/// Inbound/outbound quantity totals for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyMovement {
    /// First day of the month.
    pub month: NaiveDate,
    /// Sum of positive quantity deltas.
    pub stock_in: i64,
    /// Sum of absolute negative quantity deltas.
    pub stock_out: i64,
}

/// Buckets one item's incremental replay output into calendar snapshots.
///
/// Later points in the same bucket supersede earlier ones. Gaps between
/// active buckets are filled by carrying the previous state forward; when
/// `extend_to` is given (any date — it is truncated to a bucket key), the
/// final state is also carried out to that bucket so reports cover the whole
/// requested window.
///
/// The input must be in replay order, as produced by
/// [`replay_series`](crate::wac::replay_series). An empty series yields no
/// snapshots.
pub fn bucket_series(
    points: &[ValuationPoint],
    granularity: Granularity,
    extend_to: Option<NaiveDate>,
) -> Vec<BucketSnapshot> {
    let mut snapshots: Vec<BucketSnapshot> = Vec::new();
    for point in points {
        let bucket = bucket_key(point.timestamp, granularity);
        match snapshots.last_mut() {
            Some(last) if last.bucket == bucket => last.state = point.state,
            _ => snapshots.push(BucketSnapshot {
                bucket,
                state: point.state,
            }),
        }
    }

    let mut filled: Vec<BucketSnapshot> = Vec::with_capacity(snapshots.len());
    for snapshot in snapshots {
        if let Some(prev) = filled.last().copied() {
            let mut cursor = next_bucket(prev.bucket, granularity);
            while cursor < snapshot.bucket {
                filled.push(BucketSnapshot {
                    bucket: cursor,
                    state: prev.state,
                });
                cursor = next_bucket(cursor, granularity);
            }
        }
        filled.push(snapshot);
    }

    if let Some(end) = extend_to {
        let end = truncate_date(end, granularity);
        while let Some(prev) = filled.last().copied() {
            if prev.bucket >= end {
                break;
            }
            filled.push(BucketSnapshot {
                bucket: next_bucket(prev.bucket, granularity),
                state: prev.state,
            });
        }
    }

    filled
}

/// Computes cross-item total valuation per bucket.
///
/// Events are grouped per item, replayed independently, bucketed, and the
/// per-bucket values (`quantity × wac`) summed. Each item contributes from
/// its first active bucket onward, carried forward through quiet periods up
/// to the latest bucket any item touched (or `window_end`, if later).
///
/// `supplier_filter`, when present, is matched case-insensitively against
/// each event's denormalized supplier id before replay.
pub fn valuation_over_time(
    events: &[StockEvent],
    granularity: Granularity,
    supplier_filter: Option<&str>,
    window_end: Option<NaiveDate>,
) -> Vec<BucketValuation> {
    let mut by_item: BTreeMap<ItemId, Vec<&StockEvent>> = BTreeMap::new();
    for event in events {
        if !supplier_matches(event, supplier_filter) {
            continue;
        }
        by_item.entry(event.item_id.clone()).or_default().push(event);
    }

    let mut series_by_item: BTreeMap<ItemId, Vec<ValuationPoint>> = BTreeMap::new();
    for (item, mut item_events) in by_item {
        item_events.sort_by_key(|e| e.replay_key());
        series_by_item.insert(item, replay_series(item_events.into_iter()));
    }

    // All items extend to the same horizon so per-bucket sums are complete.
    let last_active = series_by_item
        .values()
        .filter_map(|series| series.last().map(|point| bucket_key(point.timestamp, granularity)))
        .max();
    let horizon = last_active
        .map(|last| window_end.map_or(last, |end| last.max(truncate_date(end, granularity))));

    let mut totals: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for series in series_by_item.values() {
        for snapshot in bucket_series(series, granularity, horizon) {
            *totals.entry(snapshot.bucket).or_insert(Decimal::ZERO) +=
                Decimal::from(snapshot.state.quantity) * snapshot.state.wac();
        }
    }

    totals
        .into_iter()
        .map(|(bucket, total_value)| BucketValuation {
            bucket,
            total_value,
        })
        .collect()
}

/// Sums inbound and outbound quantities per calendar month.
///
/// Only months with activity appear. `supplier_filter` matches the
/// denormalized supplier id case-insensitively; `from`/`to` bound the window
/// by event date (inclusive).
pub fn monthly_stock_movement(
    events: &[StockEvent],
    supplier_filter: Option<&str>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<MonthlyMovement> {
    let mut months: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();

    for event in events {
        let date = event.timestamp.as_datetime().date_naive();
        if from.is_some_and(|f| date < f) || to.is_some_and(|t| date > t) {
            continue;
        }
        if !supplier_matches(event, supplier_filter) {
            continue;
        }

        let month = truncate_date(date, Granularity::Month);
        let entry = months.entry(month).or_insert((0, 0));
        // Saturating: `abs()` alone panics on i64::MIN, which is a legal
        // delta under the append contract.
        if event.quantity_delta > 0 {
            entry.0 = entry.0.saturating_add(event.quantity_delta);
        } else {
            entry.1 = entry.1.saturating_add(event.quantity_delta.saturating_abs());
        }
    }

    months
        .into_iter()
        .map(|(month, (stock_in, stock_out))| MonthlyMovement {
            month,
            stock_in,
            stock_out,
        })
        .collect()
}

/// Average recorded unit price for one day of an item's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// The day (UTC).
    pub day: NaiveDate,
    /// Mean of `unit_price_at_event` across that day's events, rounded to
    /// currency precision (2 digits, half-up).
    pub average_price: Decimal,
}

/// How often an item's stock changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateFrequency {
    /// The item.
    pub item_id: ItemId,
    /// Number of ledger events recorded for the item.
    pub event_count: u64,
}

/// Daily average of the recorded unit price for one item over an inclusive
/// date window.
///
/// Every event counts, whatever its reason: the trend reports what prices
/// were stamped on the ledger, not the cost-flow state. Days without events
/// are absent (no carry-forward — there is nothing to average).
/// `supplier_filter` matches the denormalized supplier id case-insensitively.
///
/// # Errors
///
/// [`SummaryError::InvalidWindow`] when `from > to`.
pub fn price_trend(
    events: &[StockEvent],
    item_id: &ItemId,
    supplier_filter: Option<&str>,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<PricePoint>, SummaryError> {
    if from > to {
        return Err(SummaryError::InvalidWindow { from, to });
    }

    let mut days: BTreeMap<NaiveDate, (Decimal, u64)> = BTreeMap::new();
    for event in events {
        if &event.item_id != item_id {
            continue;
        }
        let date = event.timestamp.as_datetime().date_naive();
        if date < from || date > to {
            continue;
        }
        if !supplier_matches(event, supplier_filter) {
            continue;
        }
        let entry = days.entry(date).or_insert((Decimal::ZERO, 0));
        entry.0 += event.unit_price_at_event.value();
        entry.1 += 1;
    }

    Ok(days
        .into_iter()
        .map(|(day, (total, count))| PricePoint {
            day,
            average_price: (total / Decimal::from(count))
                .round_dp_with_strategy(REPORT_SCALE, RoundingStrategy::MidpointAwayFromZero),
        })
        .collect())
}

/// Counts ledger events per item, most active first.
///
/// Ties are broken by ascending item id so the order is deterministic.
/// `supplier_filter` matches the denormalized supplier id case-insensitively.
/// Items with no events simply do not appear.
pub fn item_update_frequency(
    events: &[StockEvent],
    supplier_filter: Option<&str>,
) -> Vec<UpdateFrequency> {
    let mut counts: BTreeMap<ItemId, u64> = BTreeMap::new();
    for event in events {
        if !supplier_matches(event, supplier_filter) {
            continue;
        }
        *counts.entry(event.item_id.clone()).or_insert(0) += 1;
    }

    let mut frequencies: Vec<UpdateFrequency> = counts
        .into_iter()
        .map(|(item_id, event_count)| UpdateFrequency {
            item_id,
            event_count,
        })
        .collect();
    frequencies.sort_by(|a, b| {
        b.event_count
            .cmp(&a.event_count)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    frequencies
}
