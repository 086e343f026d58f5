//! Multi-criteria, null-tolerant search over the ledger.
//!
//! The filter is a plain data structure: a set of independently-optional
//! typed fields combined by logical AND. Every filter value is treated as
//! data and compared with ordinary Rust operations — nothing is ever
//! concatenated into query text, so adversarial filter input cannot inject
//! anything regardless of the storage backend.
//!
//! This is the audit/search read path; it scans the ledger directly and
//! never touches the cost-flow calculator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::LedgerResult;
use crate::event::StockEvent;
use crate::ledger::StockLedger;
use crate::types::{ItemId, Timestamp};

/// Read-only item name lookup, provided by an external catalog collaborator.
///
/// The engine never owns catalog data; it only needs a name to evaluate
/// `item_name_contains`. Items the catalog does not know simply never match
/// a name filter.
pub trait ItemCatalog: Send + Sync {
    /// Returns the display name for an item, if the catalog knows it.
    fn item_name(&self, item_id: &ItemId) -> Option<String>;
}

impl ItemCatalog for HashMap<ItemId, String> {
    fn item_name(&self, item_id: &ItemId) -> Option<String> {
        self.get(item_id).cloned()
    }
}

/// An empty catalog: no item has a name.
///
/// Useful when searching without name criteria.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCatalog;

impl ItemCatalog for NoCatalog {
    fn item_name(&self, _item_id: &ItemId) -> Option<String> {
        None
    }
}

/// Search criteria over the ledger.
///
/// Any unset field is a no-op (matches everything); all set fields combine
/// with logical AND. String comparisons are case-insensitive. Blank filter
/// strings are normalized away at construction, mirroring how unset and
/// blank behave identically in the query API this serves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEventFilter {
    /// Inclusive lower bound on event timestamp.
    pub date_from: Option<Timestamp>,
    /// Inclusive upper bound on event timestamp.
    pub date_to: Option<Timestamp>,
    /// Case-insensitive substring match against the item's catalog name.
    pub item_name_contains: Option<String>,
    /// Case-insensitive equality against the event's denormalized supplier.
    pub supplier_id_equals: Option<String>,
    /// Case-insensitive equality against the event's actor.
    pub actor_equals: Option<String>,
    /// Inclusive lower bound on `quantity_delta`.
    pub min_quantity_delta: Option<i64>,
    /// Inclusive upper bound on `quantity_delta`.
    pub max_quantity_delta: Option<i64>,
}

fn normalize(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

impl StockEventFilter {
    /// Creates a filter that matches every event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the inclusive lower timestamp bound.
    #[must_use]
    pub const fn with_date_from(mut self, from: Timestamp) -> Self {
        self.date_from = Some(from);
        self
    }

    /// Sets the inclusive upper timestamp bound.
    #[must_use]
    pub const fn with_date_to(mut self, to: Timestamp) -> Self {
        self.date_to = Some(to);
        self
    }

    /// Sets the item name substring criterion. Blank input clears it.
    #[must_use]
    pub fn with_item_name_contains(mut self, fragment: &str) -> Self {
        self.item_name_contains = normalize(fragment);
        self
    }

    /// Sets the supplier equality criterion. Blank input clears it.
    #[must_use]
    pub fn with_supplier_id_equals(mut self, supplier: &str) -> Self {
        self.supplier_id_equals = normalize(supplier);
        self
    }

    /// Sets the actor equality criterion. Blank input clears it.
    #[must_use]
    pub fn with_actor_equals(mut self, actor: &str) -> Self {
        self.actor_equals = normalize(actor);
        self
    }

    /// Sets the inclusive lower bound on quantity delta.
    #[must_use]
    pub const fn with_min_quantity_delta(mut self, min: i64) -> Self {
        self.min_quantity_delta = Some(min);
        self
    }

    /// Sets the inclusive upper bound on quantity delta.
    #[must_use]
    pub const fn with_max_quantity_delta(mut self, max: i64) -> Self {
        self.max_quantity_delta = Some(max);
        self
    }

    /// Evaluates all set criteria against one event (logical AND).
    pub fn matches(&self, event: &StockEvent, catalog: &impl ItemCatalog) -> bool {
        if self.date_from.is_some_and(|from| event.timestamp < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| event.timestamp > to) {
            return false;
        }
        if let Some(fragment) = &self.item_name_contains {
            let Some(name) = catalog.item_name(&event.item_id) else {
                return false;
            };
            // Lowercased here, not only in the wither: the fields are public
            // and deserializable, so arbitrary-case fragments must still
            // match case-insensitively.
            if !name.to_lowercase().contains(&fragment.to_lowercase()) {
                return false;
            }
        }
        if let Some(supplier) = &self.supplier_id_equals {
            let matched = event
                .supplier_id
                .as_ref()
                .is_some_and(|id| id.matches_ignore_case(supplier));
            if !matched {
                return false;
            }
        }
        if let Some(actor) = &self.actor_equals {
            if !event.actor.matches_ignore_case(actor) {
                return false;
            }
        }
        if self
            .min_quantity_delta
            .is_some_and(|min| event.quantity_delta < min)
        {
            return false;
        }
        if self
            .max_quantity_delta
            .is_some_and(|max| event.quantity_delta > max)
        {
            return false;
        }
        true
    }
}

/// Searches the ledger for events matching the filter, in replay order.
///
/// The empty filter returns every event in the ledger exactly once. Empty
/// results are normal, not errors.
///
/// # Errors
///
/// Propagates storage failures from the ledger unchanged.
pub async fn search(
    ledger: &(impl StockLedger + ?Sized),
    catalog: &impl ItemCatalog,
    filter: &StockEventFilter,
) -> LedgerResult<Vec<StockEvent>> {
    let events = ledger.scan_all().await?;
    let total = events.len();

    let matched: Vec<StockEvent> = events
        .into_iter()
        .filter(|event| filter.matches(event, catalog))
        .collect();

    tracing::debug!(total, matched = matched.len(), "ledger search");

    Ok(matched)
}
