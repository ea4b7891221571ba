use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::SeatClass;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Station {
    pub id: String,
    pub name: String,
}

/// Base fare per seat for each cabin class, in minor currency units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassPrices {
    pub business: i64,
    #[serde(default)]
    pub premium_economy: Option<i64>,
    pub economy: i64,
}

/// Per-passenger markups charged when a protection product is selected.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeePolicy {
    #[serde(default)]
    pub cancellation_fee: i64,
    #[serde(default)]
    pub reschedule_fee: i64,
}

/// One directional segment of the trip as resolved from the catalog.
///
/// A leg is never patched in place; a re-fetch produces a new value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Leg {
    pub service_id: String,
    pub origin: Station,
    pub destination: Station,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    pub prices: ClassPrices,
    pub policy: FeePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seat {
    /// Seat number as the booking service knows it, e.g. `12A` or `B-3C`.
    pub number: String,
    pub row: u32,
    pub column: String,
    pub class: SeatClass,
    /// Booked on the server side. Occupied seats are never selectable.
    pub occupied: bool,
    pub price: i64,
}
