//! `StockCore` - Inventory valuation engine
//!
//! An append-only ledger of stock-change events plus a cost-flow calculator
//! that derives, for any item/supplier/time-window, the quantity on hand and
//! its monetary value under Weighted Average Cost (WAC) accounting.
//!
//! Writes go only into the ledger; reads flow ledger → stream reader → WAC
//! calculator → period aggregator, while the query filter engine reads the
//! ledger directly for audit and search.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregate;
pub mod errors;
pub mod event;
pub mod filter;
pub mod ledger;
pub mod stream;
pub mod summary;
pub mod types;
pub mod wac;

pub use aggregate::{
    bucket_key, bucket_series, item_update_frequency, monthly_stock_movement, price_trend,
    valuation_over_time,
};
pub use aggregate::{
    BucketSnapshot, BucketValuation, Granularity, MonthlyMovement, PricePoint, UpdateFrequency,
};
pub use errors::{AppendError, LedgerError, LedgerResult, SummaryError};
pub use event::{StockChangeReason, StockEvent, StockEventInput};
pub use filter::{search, ItemCatalog, NoCatalog, StockEventFilter};
pub use ledger::StockLedger;
pub use stream::EventStreamReader;
pub use summary::{financial_summary, FinancialSummary};
pub use types::{Actor, EventId, ItemId, SupplierId, Timestamp, UnitPrice};
pub use wac::{replay, replay_series, ValuationPoint, WacState};
