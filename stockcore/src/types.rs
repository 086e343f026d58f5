//! Core domain types for the `StockCore` valuation engine.
//!
//! This module defines the fundamental identifier and value types used
//! throughout the engine. All types use smart constructors to ensure
//! validity at construction time, following the "parse, don't validate"
//! principle: once a value exists, no further checking is needed anywhere
//! downstream.

use chrono::{DateTime, Utc};
use nutype::nutype;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies an inventory item.
///
/// `ItemId` values are guaranteed to be non-empty and at most 255 characters.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 255),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct ItemId(String);

/// Identifies a supplier.
///
/// The supplier id carried on each stock event is denormalized: it is copied
/// at append time and never looked up live, so historical reports stay
/// stable even if an item's supplier assignment changes later.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 255),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct SupplierId(String);

impl SupplierId {
    /// Case-insensitive equality against a raw filter string.
    ///
    /// Supplier filters are matched against the denormalized id on each
    /// event, never via a live join.
    pub fn matches_ignore_case(&self, other: &str) -> bool {
        self.as_ref().eq_ignore_ascii_case(other.trim())
    }
}

/// Identity of who or what triggered a stock event.
///
/// Supplied by an external authentication collaborator and treated as an
/// opaque string; it participates in audit queries, never in valuation math.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 255),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct Actor(String);

impl Actor {
    /// Case-insensitive equality against a raw filter string.
    pub fn matches_ignore_case(&self, other: &str) -> bool {
        self.as_ref().eq_ignore_ascii_case(other.trim())
    }
}

/// A globally unique stock event identifier using UUIDv7 format.
///
/// `EventId` values are guaranteed to be UUIDv7, which provides:
/// - Time-based, monotonic sort order for events appended in sequence
/// - Globally unique identification
///
/// Ascending `EventId` therefore reflects insertion order, which is the
/// tie-break key when two events carry identical timestamps.
#[nutype(
    validate(predicate = |id: &Uuid| id.get_version() == Some(uuid::Version::SortRand)),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new `EventId` with the current timestamp.
    ///
    /// This is a convenience method that generates a new `UUIDv7`.
    pub fn new() -> Self {
        // This will always succeed as Uuid::now_v7() always returns a valid v7 UUID
        Self::try_new(Uuid::now_v7()).expect("Uuid::now_v7() should always return a valid v7 UUID")
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

/// An exact, non-negative decimal unit price.
///
/// No binary floating point is permitted anywhere in the valuation pipeline;
/// `UnitPrice` wraps [`rust_decimal::Decimal`] and rejects negative values at
/// construction time.
#[nutype(
    validate(predicate = |p: &Decimal| !p.is_sign_negative()),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct UnitPrice(Decimal);

impl UnitPrice {
    /// A price of exactly zero.
    ///
    /// Zero-priced events are legal (e.g. donated or found stock); the price
    /// constraint is only non-negativity.
    pub fn zero() -> Self {
        Self::try_new(Decimal::ZERO).expect("zero is a valid unit price")
    }

    /// Returns the underlying decimal value.
    pub fn value(&self) -> Decimal {
        *self.as_ref()
    }
}

/// The instant at which a stock event occurred.
///
/// This wrapper ensures consistent timestamp handling throughout the engine
/// and keeps the chrono dependency at the edges of the public API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a new timestamp from a UTC `DateTime`.
    pub const fn new(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Creates a timestamp representing the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the underlying `DateTime`.
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Converts the timestamp into the underlying `DateTime`.
    pub const fn into_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::new(datetime)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(timestamp: Timestamp) -> Self {
        timestamp.into_datetime()
    }
}

impl AsRef<DateTime<Utc>> for Timestamp {
    fn as_ref(&self) -> &DateTime<Utc> {
        self.as_datetime()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
