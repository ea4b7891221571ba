use std::sync::Arc;
use tracing::{error, info, warn};
use wayfare_catalog::{quote, CatalogBoard, CatalogError, CatalogLoader, FareQuote};
use wayfare_core::identity::TokenProvider;
use wayfare_core::{CancelSignal, SeatClass, TripContext};
use wayfare_order::{BookingSaga, SagaOutcome, SeatAssignmentStore, Selection};
use wayfare_store::{BookingHandoff, SessionBridge, SessionError};
use crate::error::CheckoutError;

/// State behind the seat-selection screen, from entry to booking handoff.
pub struct CheckoutFlow {
    session: SessionBridge,
    identity: Arc<dyn TokenProvider>,
    loader: CatalogLoader,
    saga: BookingSaga,
    trip: TripContext,
    class: Option<SeatClass>,
    board: CatalogBoard,
    assignments: SeatAssignmentStore,
}

impl CheckoutFlow {
    /// Read the trip from the session. A missing trip means the screen cannot be used.
    pub async fn enter(
        session: SessionBridge,
        identity: Arc<dyn TokenProvider>,
        loader: CatalogLoader,
        saga: BookingSaga,
    ) -> Result<Self, CheckoutError> {
        let trip = match session.load_trip().await {
            Ok(trip) => trip,
            Err(SessionError::MissingTripContext) => return Err(CheckoutError::NeedsTripSetup),
            Err(e) => return Err(e.into()),
        };
        trip.validate()?;

        let class = trip.seat_class();
        if class.is_none() {
            warn!("Trip class '{}' is not a known seat class", trip.class_type);
        }

        info!(
            "Checkout started: {} leg(s), {} passenger(s), class {}",
            trip.legs.len(),
            trip.passenger_count(),
            trip.class_type
        );

        let board = CatalogBoard::new(trip.legs.clone(), trip.class_type.clone());
        let assignments = SeatAssignmentStore::new(trip.legs.len(), trip.passenger_count());

        Ok(Self { session, identity, loader, saga, trip, class, board, assignments })
    }

    pub fn trip(&self) -> &TripContext {
        &self.trip
    }

    pub fn board(&self) -> &CatalogBoard {
        &self.board
    }

    pub fn assignments(&self) -> &SeatAssignmentStore {
        &self.assignments
    }

    /// Fetch every leg's seat map. Failed legs stay empty and can be retried.
    pub async fn load_catalogs(&mut self, cancel: &CancelSignal) -> Vec<CatalogError> {
        let errors = self.loader.load_all(&mut self.board, cancel).await;
        for leg_index in 0..self.board.leg_count() {
            self.sync_leg(leg_index);
        }
        errors
    }

    /// Re-fetch one leg. Returns the `(passenger, seat)` assignments that had to be dropped.
    pub async fn retry_leg(
        &mut self,
        leg_index: usize,
        cancel: &CancelSignal,
    ) -> Result<Vec<(usize, String)>, CheckoutError> {
        self.loader.retry_leg(&mut self.board, leg_index, cancel).await?;
        Ok(self.sync_leg(leg_index))
    }

    fn sync_leg(&mut self, leg_index: usize) -> Vec<(usize, String)> {
        let Some(catalog) = self.board.catalog(leg_index) else {
            return Vec::new();
        };
        match self.assignments.refresh_leg(leg_index, &catalog.seats) {
            Ok(dropped) => dropped,
            Err(e) => {
                error!("Seat map for leg {} could not be applied: {}", leg_index + 1, e);
                Vec::new()
            }
        }
    }

    pub fn set_active_passenger(&mut self, passenger_index: usize) -> Result<(), CheckoutError> {
        Ok(self.assignments.set_active_passenger(passenger_index)?)
    }

    pub fn select(&mut self, leg_index: usize, passenger_index: usize, seat: &str) -> Result<Selection, CheckoutError> {
        Ok(self.assignments.select(leg_index, passenger_index, seat)?)
    }

    pub fn select_for_active(&mut self, leg_index: usize, seat: &str) -> Result<Selection, CheckoutError> {
        Ok(self.assignments.select_for_active(leg_index, seat)?)
    }

    /// Current fare. Zero until every leg is loaded or when the trip class is unknown.
    pub fn quote(&self) -> FareQuote {
        match (self.class, self.board.legs()) {
            (Some(class), Some(legs)) => quote(&legs, class, self.trip.passenger_count(), self.trip.protection),
            _ => FareQuote::default(),
        }
    }

    /// Submit the seat plan.
    ///
    /// Selection is locked for the duration of the saga. It is reopened when the saga
    /// could not start or failed, and stays locked after success.
    pub async fn confirm(&mut self, cancel: &CancelSignal) -> Result<SagaOutcome, CheckoutError> {
        if !self.board.is_ready() {
            return Err(CheckoutError::CatalogNotReady { legs: self.board.unresolved_legs() });
        }

        let token = self.identity.get_token().await;
        let plan = self.assignments.freeze()?;

        let outcome = match self.saga.run(token, &self.trip, &plan, cancel).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.assignments.thaw();
                return Err(e.into());
            }
        };

        match &outcome {
            SagaOutcome::Completed(success) => {
                let handoff = BookingHandoff::from(success);
                if let Err(source) = self.session.write_handoff(&handoff).await {
                    error!("Bookings {:?} created but handoff failed: {}", handoff.booking_ids, source);
                    return Err(CheckoutError::HandoffFailed { booking_ids: handoff.booking_ids, source });
                }
            }
            SagaOutcome::Failed(failure) => {
                warn!("{}", failure.summary());
                self.assignments.thaw();
            }
        }
        Ok(outcome)
    }
}
