use serde::{Deserialize, Serialize};
use tracing::warn;
use wayfare_core::{ClassPrices, Leg, ProtectionFlags, SeatClass};

/// Price breakdown shown on the seat screen and on every later screen that
/// redisplays the total. Always produced by [`quote`]; never stored on its own.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FareQuote {
    pub passenger_count: usize,
    pub onward_fare: i64,
    pub return_fare: Option<i64>,
    pub onward_total: i64,
    pub return_total: i64,
    pub cancellation_protection: i64,
    pub reschedule_protection: i64,
    pub total: i64,
}

/// Per-seat base price for `class`.
///
/// A missing premium-economy price falls back to the economy price.
pub fn class_price(prices: &ClassPrices, class: SeatClass) -> i64 {
    match class {
        SeatClass::Business => prices.business,
        SeatClass::Premium => prices.premium_economy.unwrap_or_else(|| {
            warn!("No premium economy price, charging economy fare {}", prices.economy);
            prices.economy
        }),
        SeatClass::Economy => prices.economy,
    }
}

/// Compute the fare for a trip. `legs[0]` is the onward leg, `legs[1]` the optional return leg.
pub fn quote(
    legs: &[Leg],
    class: SeatClass,
    passenger_count: usize,
    protection: ProtectionFlags,
) -> FareQuote {
    let pax = passenger_count as i64;
    let trip_legs = &legs[..legs.len().min(2)];

    let onward_fare = trip_legs.first().map(|l| class_price(&l.prices, class)).unwrap_or(0);
    let return_fare = trip_legs.get(1).map(|l| class_price(&l.prices, class));

    let onward_total = onward_fare * pax;
    let return_total = return_fare.unwrap_or(0) * pax;

    let cancellation_protection = if protection.cancellation {
        trip_legs.iter().map(|l| l.policy.cancellation_fee * pax).sum()
    } else {
        0
    };
    let reschedule_protection = if protection.reschedule {
        trip_legs.iter().map(|l| l.policy.reschedule_fee * pax).sum()
    } else {
        0
    };

    FareQuote {
        passenger_count,
        onward_fare,
        return_fare,
        onward_total,
        return_total,
        cancellation_protection,
        reschedule_protection,
        total: onward_total + return_total + cancellation_protection + reschedule_protection,
    }
}
