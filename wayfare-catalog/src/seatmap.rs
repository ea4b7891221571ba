use std::collections::{BTreeMap, BTreeSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wayfare_core::catalog::LegDetails;
use wayfare_core::{Leg, Seat, SeatClass};
use crate::pricing::class_price;

/// Grid dimensions for rendering one class of a leg.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatLayout {
    pub rows: u32,
    pub columns: Vec<String>,
}

/// Seats of a single class on a single leg, keyed by seat number.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SeatCatalog {
    pub class: Option<SeatClass>,
    pub layout: SeatLayout,
    pub seats: BTreeMap<String, Seat>,
}

impl SeatCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn get(&self, seat_number: &str) -> Option<&Seat> {
        self.seats.get(seat_number)
    }

    pub fn seat_at(&self, row: u32, column: &str) -> Option<&Seat> {
        self.seats.values().find(|s| s.row == row && s.column == column)
    }

    pub fn available_count(&self) -> usize {
        self.seats.values().filter(|s| !s.occupied).count()
    }
}

/// A fully resolved leg with its class-filtered seat catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegCatalog {
    pub leg: Leg,
    pub seats: SeatCatalog,
}

/// Split `[<prefix>-]<row><column>` into row and column. `12A` -> (12, "A").
pub fn parse_seat_number(number: &str) -> Option<(u32, String)> {
    let core = number.rsplit('-').next()?.trim();
    let digits_end = core.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let row = core[..digits_end].parse().ok()?;
    let column = &core[digits_end..];
    if !column.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some((row, column.to_ascii_uppercase()))
}

/// Reshape a catalog response into a leg plus the seats of the requested class.
///
/// An unrecognised `class_type` yields an empty seat catalog instead of an error.
pub fn normalize(details: LegDetails, class_type: &str) -> LegCatalog {
    let leg = Leg {
        service_id: details.service_id.clone(),
        origin: details.route.origin,
        destination: details.route.destination,
        departure: details.schedule.departure,
        arrival: details.schedule.arrival,
        prices: details.class_prices,
        policy: details.policy,
    };

    let Some(class) = SeatClass::parse(class_type) else {
        warn!("Unrecognised class '{}' for service {}, showing no seats", class_type, leg.service_id);
        return LegCatalog { leg, seats: SeatCatalog::empty() };
    };

    let fallback_price = class_price(&leg.prices, class);
    let mut seats = BTreeMap::new();
    let mut columns = BTreeSet::new();
    let mut rows = 0;

    for wire in details.seat_inventory {
        if SeatClass::from_wire(&wire.class) != Some(class) {
            continue;
        }
        let Some((row, column)) = parse_seat_number(&wire.seat_number) else {
            warn!("Skipping unparsable seat number '{}' on {}", wire.seat_number, leg.service_id);
            continue;
        };
        rows = rows.max(row);
        columns.insert(column.clone());
        seats.insert(
            wire.seat_number.clone(),
            Seat {
                number: wire.seat_number,
                row,
                column,
                class,
                occupied: wire.booked,
                price: wire.price.unwrap_or(fallback_price),
            },
        );
    }

    debug!("Normalized {} {} seats for {}", seats.len(), class, leg.service_id);

    LegCatalog {
        leg,
        seats: SeatCatalog {
            class: Some(class),
            layout: SeatLayout { rows, columns: columns.into_iter().collect() },
            seats,
        },
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};
    use wayfare_core::catalog::{LegDetails, WireRoute, WireSchedule, WireSeat};
    use wayfare_core::{ClassPrices, FeePolicy, Station};

    pub fn wire_seat(number: &str, class: &str, booked: bool) -> WireSeat {
        WireSeat { seat_number: number.to_string(), class: class.to_string(), booked, price: None }
    }

    pub fn details(service_id: &str, seats: Vec<WireSeat>) -> LegDetails {
        LegDetails {
            service_id: service_id.to_string(),
            route: WireRoute {
                origin: Station { id: "KTM".into(), name: "Kathmandu".into() },
                destination: Station { id: "PKR".into(), name: "Pokhara".into() },
            },
            schedule: WireSchedule {
                departure: Utc.with_ymd_and_hms(2026, 11, 2, 6, 30, 0).unwrap(),
                arrival: Utc.with_ymd_and_hms(2026, 11, 2, 7, 5, 0).unwrap(),
            },
            seat_inventory: seats,
            class_prices: ClassPrices { business: 5000, premium_economy: None, economy: 1000 },
            policy: FeePolicy { cancellation_fee: 100, reschedule_fee: 150 },
        }
    }
}
