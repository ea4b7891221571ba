use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;
use wayfare_core::booking::{BookingRecord, BookingService, BookingServiceError, CreateBookingRequest, PassengerSeat};
use wayfare_core::{CancelSignal, Interrupted, TripContext};
use wayfare_shared::models::{SagaEvent, SagaEventKind};
use wayfare_shared::Masked;
use crate::assignment::AssignmentSnapshot;
use crate::models::{CompensationStatus, ConfirmedLeg, LegBooking, SagaFailure, SagaOutcome, SagaSuccess};

#[derive(Debug, Clone, Copy)]
pub struct SagaPolicy {
    /// Upper bound for each create or cancel call.
    pub step_timeout: Duration,
    /// Cancel already-confirmed legs when a later leg fails.
    pub compensate_on_failure: bool,
}

impl Default for SagaPolicy {
    fn default() -> Self {
        Self {
            step_timeout: Duration::from_secs(30),
            compensate_on_failure: true,
        }
    }
}

/// Failures detected before any remote call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SagaError {
    #[error("Sign in to complete the booking")]
    MissingToken,

    #[error("Passenger {} has no seat on leg {}", .passenger_index + 1, .leg_index + 1)]
    IncompleteAssignment {
        leg_index: usize,
        passenger_index: usize,
        missing: Vec<(usize, usize)>,
    },

    #[error("Seat plan covers {plan} legs but the trip has {trip}")]
    PlanMismatch { plan: usize, trip: usize },

    #[error("Seat class '{0}' is not offered")]
    UnknownClass(String),
}

/// Turns a frozen seat plan into one booking per leg, one leg at a time.
pub struct BookingSaga {
    service: Arc<dyn BookingService>,
    policy: SagaPolicy,
}

impl BookingSaga {
    pub fn new(service: Arc<dyn BookingService>, policy: SagaPolicy) -> Self {
        Self { service, policy }
    }

    /// Build the per-leg requests, failing if any passenger lacks a seat on any leg.
    pub fn build_requests(
        trip: &TripContext,
        plan: &AssignmentSnapshot,
    ) -> Result<Vec<CreateBookingRequest>, SagaError> {
        if plan.leg_count() != trip.legs.len() {
            return Err(SagaError::PlanMismatch { plan: plan.leg_count(), trip: trip.legs.len() });
        }

        let missing: Vec<(usize, usize)> = (0..trip.legs.len())
            .flat_map(|leg| (0..trip.passenger_count()).map(move |pax| (leg, pax)))
            .filter(|(leg, pax)| plan.seat(*leg, *pax).map_or(true, str::is_empty))
            .collect();
        if let Some(&(leg_index, passenger_index)) = missing.first() {
            return Err(SagaError::IncompleteAssignment { leg_index, passenger_index, missing });
        }
        let class_type = trip
            .seat_class()
            .ok_or_else(|| SagaError::UnknownClass(trip.class_type.clone()))?;

        let requests = trip
            .legs
            .iter()
            .enumerate()
            .map(|(leg_index, service_id)| {
                let (origin_id, destination_id) = trip.stations_for_leg(leg_index);
                let passengers = trip
                    .passengers
                    .iter()
                    .enumerate()
                    .map(|(pax, passenger)| PassengerSeat {
                        passenger: passenger.clone(),
                        seat_number: plan.seat(leg_index, pax).unwrap_or_default().to_string(),
                    })
                    .collect();
                CreateBookingRequest {
                    service_id: service_id.clone(),
                    passengers,
                    class_type,
                    origin_id: origin_id.to_string(),
                    destination_id: destination_id.to_string(),
                    protection: trip.protection,
                    contact: trip.contact.clone(),
                }
            })
            .collect();
        Ok(requests)
    }

    /// Submit every leg in order.
    ///
    /// Preconditions are checked before the first call. A failing leg stops the saga;
    /// legs confirmed before it are compensated per the policy and reported in the
    /// failure outcome.
    pub async fn run(
        &self,
        token: Option<Masked<String>>,
        trip: &TripContext,
        plan: &AssignmentSnapshot,
        cancel: &CancelSignal,
    ) -> Result<SagaOutcome, SagaError> {
        let token = token.ok_or(SagaError::MissingToken)?;
        let requests = Self::build_requests(trip, plan)?;

        let saga_id = Uuid::new_v4();
        let mut journal = Vec::new();
        let mut bookings: Vec<LegBooking> = Vec::new();

        info!("Saga {} submitting {} legs", saga_id, requests.len());

        for (leg_index, request) in requests.iter().enumerate() {
            journal.push(SagaEvent::leg(
                saga_id,
                leg_index,
                SagaEventKind::LegRequested { service_id: request.service_id.clone() },
            ));

            match self.create(&token, request, cancel).await {
                Ok(record) => {
                    info!("Saga {} leg {} confirmed as {}", saga_id, leg_index + 1, record.booking_id);
                    journal.push(SagaEvent::leg(
                        saga_id,
                        leg_index,
                        SagaEventKind::LegConfirmed {
                            booking_id: record.booking_id.clone(),
                            total_amount: record.total_amount,
                        },
                    ));
                    bookings.push(LegBooking {
                        leg_index,
                        service_id: request.service_id.clone(),
                        record,
                    });
                }
                Err(err) => {
                    error!("Saga {} leg {} failed: {}", saga_id, leg_index + 1, err);
                    journal.push(SagaEvent::leg(
                        saga_id,
                        leg_index,
                        SagaEventKind::LegFailed { reason: err.to_string() },
                    ));
                    let confirmed = self.compensate(saga_id, &token, bookings, &mut journal).await;
                    return Ok(SagaOutcome::Failed(SagaFailure {
                        saga_id,
                        failed_leg: leg_index,
                        error: err,
                        confirmed,
                        journal,
                    }));
                }
            }
        }

        let mut success = SagaSuccess { saga_id, bookings, journal };
        let (booking_ids, total_amount) = (success.booking_ids(), success.total_amount());
        success.journal.push(SagaEvent::saga(
            saga_id,
            SagaEventKind::SagaCompleted { booking_ids, total_amount },
        ));
        info!("Saga {} completed, total {}", saga_id, total_amount);
        Ok(SagaOutcome::Completed(success))
    }

    async fn create(
        &self,
        token: &Masked<String>,
        request: &CreateBookingRequest,
        cancel: &CancelSignal,
    ) -> Result<BookingRecord, BookingServiceError> {
        cancel
            .bounded(self.policy.step_timeout, self.service.create_booking(token, request))
            .await
            .map_err(interrupted_to_service_error)?
    }

    /// Undo confirmed legs, newest first.
    ///
    /// Runs without the caller's cancel signal so a cancelled saga can still clean up;
    /// each call is still bounded by the step timeout.
    async fn compensate(
        &self,
        saga_id: Uuid,
        token: &Masked<String>,
        bookings: Vec<LegBooking>,
        journal: &mut Vec<SagaEvent>,
    ) -> Vec<ConfirmedLeg> {
        if !self.policy.compensate_on_failure {
            if !bookings.is_empty() {
                warn!("Saga {} leaving {} confirmed legs in place", saga_id, bookings.len());
            }
            return bookings
                .into_iter()
                .map(|booking| ConfirmedLeg { booking, compensation: CompensationStatus::LeftConfirmed })
                .collect();
        }

        let cleanup = CancelSignal::never();
        let mut confirmed = Vec::with_capacity(bookings.len());
        for booking in bookings.into_iter().rev() {
            let booking_id = booking.record.booking_id.clone();
            let result = cleanup
                .bounded(self.policy.step_timeout, self.service.cancel_booking(token, &booking_id))
                .await
                .map_err(interrupted_to_service_error)
                .and_then(|r| r);

            let compensation = match result {
                Ok(()) => {
                    info!("Saga {} cancelled booking {}", saga_id, booking_id);
                    journal.push(SagaEvent::leg(
                        saga_id,
                        booking.leg_index,
                        SagaEventKind::LegCompensated { booking_id },
                    ));
                    CompensationStatus::Compensated
                }
                Err(e) => {
                    error!("Saga {} could not cancel booking {}: {}", saga_id, booking_id, e);
                    journal.push(SagaEvent::leg(
                        saga_id,
                        booking.leg_index,
                        SagaEventKind::CompensationFailed { booking_id, reason: e.to_string() },
                    ));
                    CompensationStatus::CompensationFailed { reason: e.to_string() }
                }
            };
            confirmed.push(ConfirmedLeg { booking, compensation });
        }
        confirmed.reverse();
        confirmed
    }
}

fn interrupted_to_service_error(e: Interrupted) -> BookingServiceError {
    match e {
        Interrupted::TimedOut(d) => BookingServiceError::Timeout(d.as_millis() as u64),
        Interrupted::Cancelled => BookingServiceError::Cancelled,
    }
}
