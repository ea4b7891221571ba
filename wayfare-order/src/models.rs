use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wayfare_core::booking::{BookingRecord, BookingServiceError};
use wayfare_shared::SagaEvent;

/// A leg the booking service confirmed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegBooking {
    pub leg_index: usize,
    pub service_id: String,
    pub record: BookingRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompensationStatus {
    /// The booking was cancelled after a later leg failed.
    Compensated,
    /// The cancel call failed; the booking is still live on the server.
    CompensationFailed { reason: String },
    /// Compensation is disabled; the booking was kept.
    LeftConfirmed,
}

/// An already-confirmed leg of a saga that failed later on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfirmedLeg {
    pub booking: LegBooking,
    pub compensation: CompensationStatus,
}

#[derive(Debug, Clone)]
pub struct SagaSuccess {
    pub saga_id: Uuid,
    pub bookings: Vec<LegBooking>,
    pub journal: Vec<SagaEvent>,
}

impl SagaSuccess {
    pub fn booking_ids(&self) -> Vec<String> {
        self.bookings.iter().map(|b| b.record.booking_id.clone()).collect()
    }

    /// Sum of the server-reported totals, not the locally estimated quote.
    pub fn total_amount(&self) -> i64 {
        self.bookings.iter().map(|b| b.record.total_amount).sum()
    }
}

#[derive(Debug, Clone)]
pub struct SagaFailure {
    pub saga_id: Uuid,
    pub failed_leg: usize,
    pub error: BookingServiceError,
    pub confirmed: Vec<ConfirmedLeg>,
    pub journal: Vec<SagaEvent>,
}

impl SagaFailure {
    /// Legs whose bookings still exist on the server.
    pub fn live_bookings(&self) -> Vec<&LegBooking> {
        self.confirmed
            .iter()
            .filter(|c| c.compensation != CompensationStatus::Compensated)
            .map(|c| &c.booking)
            .collect()
    }

    /// Message for the traveller: which leg failed and what happened to earlier legs.
    pub fn summary(&self) -> String {
        let mut message = format!("Booking leg {} failed: {}.", self.failed_leg + 1, self.error);
        for leg in &self.confirmed {
            let id = &leg.booking.record.booking_id;
            let n = leg.booking.leg_index + 1;
            let line = match &leg.compensation {
                CompensationStatus::Compensated => {
                    format!(" Leg {} (booking {}) had been booked and was cancelled.", n, id)
                }
                CompensationStatus::CompensationFailed { reason } => format!(
                    " Leg {} (booking {}) is still booked; cancelling it failed: {}.",
                    n, id, reason
                ),
                CompensationStatus::LeftConfirmed => {
                    format!(" Leg {} (booking {}) remains booked.", n, id)
                }
            };
            message.push_str(&line);
        }
        message
    }
}

#[derive(Debug, Clone)]
pub enum SagaOutcome {
    Completed(SagaSuccess),
    Failed(SagaFailure),
}

impl SagaOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SagaOutcome::Completed(_))
    }

    pub fn journal(&self) -> &[SagaEvent] {
        match self {
            SagaOutcome::Completed(s) => &s.journal,
            SagaOutcome::Failed(f) => &f.journal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfare_core::booking::BookingStatus;

    fn booking(leg_index: usize, id: &str, total: i64) -> LegBooking {
        LegBooking {
            leg_index,
            service_id: format!("svc-{}", leg_index),
            record: BookingRecord {
                booking_id: id.to_string(),
                assigned_seats: vec!["1A".to_string()],
                total_amount: total,
                status: BookingStatus::Confirmed,
            },
        }
    }

    #[test]
    fn test_success_totals_use_server_amounts() {
        let success = SagaSuccess {
            saga_id: Uuid::new_v4(),
            bookings: vec![booking(0, "BK-1", 2100), booking(1, "BK-2", 2450)],
            journal: vec![],
        };
        assert_eq!(success.booking_ids(), vec!["BK-1", "BK-2"]);
        assert_eq!(success.total_amount(), 4550);
    }

    #[test]
    fn test_failure_summary_names_failed_and_confirmed_legs() {
        let failure = SagaFailure {
            saga_id: Uuid::new_v4(),
            failed_leg: 1,
            error: BookingServiceError::SeatUnavailable { seats: vec!["4C".into()] },
            confirmed: vec![ConfirmedLeg {
                booking: booking(0, "BK-1", 2000),
                compensation: CompensationStatus::CompensationFailed { reason: "timeout".into() },
            }],
            journal: vec![],
        };
        let summary = failure.summary();
        assert!(summary.starts_with("Booking leg 2 failed: Seats no longer available: 4C."));
        assert!(summary.contains("Leg 1 (booking BK-1) is still booked"));
        assert_eq!(failure.live_bookings().len(), 1);
    }
}
