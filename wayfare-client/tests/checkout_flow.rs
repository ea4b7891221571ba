use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use wayfare_catalog::CatalogLoader;
use wayfare_client::{CheckoutError, CheckoutFlow};
use wayfare_core::booking::{BookingRecord, BookingService, BookingServiceError, BookingStatus, CreateBookingRequest};
use wayfare_core::catalog::{CatalogService, CatalogServiceError, LegDetails, WireRoute, WireSchedule, WireSeat};
use wayfare_core::identity::StaticTokenProvider;
use wayfare_core::{
    CancelSignal, ClassPrices, ContactInfo, FeePolicy, Passenger, ProtectionFlags, SeatClass, Station, TripContext,
};
use wayfare_order::{AssignmentError, BookingSaga, CompensationStatus, SagaError, SagaOutcome, SagaPolicy, Selection};
use wayfare_shared::Masked;
use wayfare_store::{InMemorySessionStore, SessionBridge, SessionStore};

// ============================================================================
// Fakes
// ============================================================================

struct FakeCatalog {
    legs: HashMap<String, LegDetails>,
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn get_leg_details(&self, service_id: &str) -> Result<LegDetails, CatalogServiceError> {
        self.legs
            .get(service_id)
            .cloned()
            .ok_or_else(|| CatalogServiceError::NotFound { service_id: service_id.to_string() })
    }
}

#[derive(Default)]
struct FakeBooking {
    fail_services: Vec<String>,
    created: Mutex<Vec<CreateBookingRequest>>,
    cancelled: Mutex<Vec<String>>,
}

#[async_trait]
impl BookingService for FakeBooking {
    async fn create_booking(
        &self,
        _token: &Masked<String>,
        request: &CreateBookingRequest,
    ) -> Result<BookingRecord, BookingServiceError> {
        let mut created = self.created.lock().unwrap();
        created.push(request.clone());
        if self.fail_services.contains(&request.service_id) {
            return Err(BookingServiceError::SeatUnavailable {
                seats: request.passengers.iter().map(|p| p.seat_number.clone()).collect(),
            });
        }
        Ok(BookingRecord {
            booking_id: format!("BK-{}", created.len()),
            assigned_seats: request.passengers.iter().map(|p| p.seat_number.clone()).collect(),
            total_amount: 1000 * request.passengers.len() as i64,
            status: BookingStatus::Confirmed,
        })
    }

    async fn cancel_booking(&self, _token: &Masked<String>, booking_id: &str) -> Result<(), BookingServiceError> {
        self.cancelled.lock().unwrap().push(booking_id.to_string());
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn seat(number: &str, booked: bool) -> WireSeat {
    WireSeat { seat_number: number.to_string(), class: "Economy".to_string(), booked, price: None }
}

/// Premium seats on a service that publishes no premium price.
fn premium_leg(service_id: &str) -> LegDetails {
    let mut details = leg(service_id, 1000);
    for wire in &mut details.seat_inventory {
        wire.class = "PremiumEconomy".to_string();
    }
    details
}

fn leg(service_id: &str, economy: i64) -> LegDetails {
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
        seat_inventory: vec![seat("1A", false), seat("1B", false), seat("1C", true), seat("2A", false)],
        class_prices: ClassPrices { business: 5000, premium_economy: None, economy },
        policy: FeePolicy { cancellation_fee: 100, reschedule_fee: 150 },
    }
}

fn passenger(name: &str) -> Passenger {
    Passenger {
        name: name.to_string(),
        age: 30,
        gender: "M".to_string(),
        nationality: "NP".to_string(),
        document_id: Masked::new(format!("P-{}", name)),
    }
}

fn trip(legs: &[&str], cancellation: bool) -> TripContext {
    TripContext {
        legs: legs.iter().map(|l| l.to_string()).collect(),
        origin_id: "KTM".to_string(),
        destination_id: "PKR".to_string(),
        passengers: vec![passenger("Arjun"), passenger("Sita")],
        class_type: "Economy".to_string(),
        protection: ProtectionFlags { cancellation, reschedule: false },
        contact: ContactInfo { email: "arjun@example.com".into(), phone: "9800000000".into() },
    }
}

struct Harness {
    store: Arc<InMemorySessionStore>,
    session: SessionBridge,
    booking: Arc<FakeBooking>,
}

impl Harness {
    async fn new(trip: Option<TripContext>, booking: FakeBooking) -> Self {
        let store = Arc::new(InMemorySessionStore::new());
        let session = SessionBridge::new(store.clone());
        if let Some(trip) = trip {
            session.save_trip(&trip).await.unwrap();
        }
        Self { store, session, booking: Arc::new(booking) }
    }

    async fn enter(&self) -> Result<CheckoutFlow, CheckoutError> {
        let catalog = FakeCatalog {
            legs: HashMap::from([
                ("svc-out".to_string(), leg("svc-out", 1000)),
                ("svc-back".to_string(), leg("svc-back", 1200)),
                ("svc-premium".to_string(), premium_leg("svc-premium")),
            ]),
        };
        let loader = CatalogLoader::new(Arc::new(catalog), Duration::from_secs(5));
        let saga = BookingSaga::new(self.booking.clone(), SagaPolicy::default());
        let identity = Arc::new(StaticTokenProvider::new(Some("tok-1".into())));
        CheckoutFlow::enter(self.session.clone(), identity, loader, saga).await
    }
}

async fn loaded(harness: &Harness) -> CheckoutFlow {
    let mut flow = harness.enter().await.unwrap();
    let errors = flow.load_catalogs(&CancelSignal::never()).await;
    assert!(errors.is_empty());
    flow
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_missing_trip_needs_setup() {
    let harness = Harness::new(None, FakeBooking::default()).await;
    assert!(matches!(harness.enter().await, Err(CheckoutError::NeedsTripSetup)));
}

#[tokio::test]
async fn test_one_way_quote() {
    let harness = Harness::new(Some(trip(&["svc-out"], false)), FakeBooking::default()).await;
    let flow = loaded(&harness).await;
    assert_eq!(flow.quote().total, 2000);
}

#[tokio::test]
async fn test_round_trip_quote_with_protection() {
    let harness = Harness::new(Some(trip(&["svc-out", "svc-back"], true)), FakeBooking::default()).await;
    let flow = loaded(&harness).await;

    let quote = flow.quote();
    assert_eq!(quote.onward_total, 2000);
    assert_eq!(quote.return_total, 2400);
    assert_eq!(quote.cancellation_protection, 400);
    assert_eq!(quote.total, 4800);
}

#[tokio::test]
async fn test_quote_is_zero_before_catalogs_load() {
    let harness = Harness::new(Some(trip(&["svc-out"], false)), FakeBooking::default()).await;
    let flow = harness.enter().await.unwrap();
    assert_eq!(flow.quote().total, 0);
}

#[tokio::test]
async fn test_occupied_seat_rejected_without_mutation() {
    let harness = Harness::new(Some(trip(&["svc-out"], false)), FakeBooking::default()).await;
    let mut flow = loaded(&harness).await;
    flow.select(0, 0, "1A").unwrap();

    let err = flow.select(0, 0, "1C").unwrap_err();
    assert!(matches!(err, CheckoutError::Assignment(AssignmentError::SeatOccupied { .. })));
    assert_eq!(flow.assignments().seat_for(0, 0), Some("1A"));
    assert_eq!(flow.assignments().holder_of(0, "1C"), None);
}

#[tokio::test]
async fn test_active_passenger_selection() {
    let harness = Harness::new(Some(trip(&["svc-out"], false)), FakeBooking::default()).await;
    let mut flow = loaded(&harness).await;

    flow.set_active_passenger(1).unwrap();
    assert_eq!(flow.select_for_active(0, "2A").unwrap(), Selection::Assigned { replaced: None });
    assert_eq!(flow.assignments().seat_for(0, 1), Some("2A"));
}

#[tokio::test]
async fn test_incomplete_plan_makes_no_calls() {
    let harness = Harness::new(Some(trip(&["svc-out", "svc-back"], false)), FakeBooking::default()).await;
    let mut flow = loaded(&harness).await;
    flow.select(0, 0, "1A").unwrap();
    flow.select(1, 0, "1A").unwrap();
    flow.select(1, 1, "1B").unwrap();

    let err = flow.confirm(&CancelSignal::never()).await.unwrap_err();
    match err {
        CheckoutError::Saga(e @ SagaError::IncompleteAssignment { .. }) => {
            assert_eq!(e.to_string(), "Passenger 2 has no seat on leg 1");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(harness.booking.created.lock().unwrap().is_empty());

    // Selection is open again after the rejected submit.
    assert!(!flow.assignments().is_frozen());
    flow.select(0, 1, "1B").unwrap();
}

#[tokio::test]
async fn test_successful_checkout_writes_handoff() {
    let harness = Harness::new(Some(trip(&["svc-out", "svc-back"], false)), FakeBooking::default()).await;
    let mut flow = loaded(&harness).await;
    for leg in 0..2 {
        flow.select(leg, 0, "1A").unwrap();
        flow.select(leg, 1, "1B").unwrap();
    }

    let outcome = flow.confirm(&CancelSignal::never()).await.unwrap();
    assert!(outcome.is_completed());

    let created = harness.booking.created.lock().unwrap().clone();
    assert_eq!(created.len(), 2);
    assert_eq!((created[1].origin_id.as_str(), created[1].destination_id.as_str()), ("PKR", "KTM"));

    let handoff = harness.session.load_handoff().await.unwrap().unwrap();
    assert_eq!(handoff.booking_ids, vec!["BK-1", "BK-2"]);
    assert_eq!(handoff.total_amount, 4000);
    assert!(flow.assignments().is_frozen());
}

#[tokio::test]
async fn test_second_leg_failure_is_observable() {
    let booking = FakeBooking { fail_services: vec!["svc-back".into()], ..Default::default() };
    let harness = Harness::new(Some(trip(&["svc-out", "svc-back"], false)), booking).await;
    let mut flow = loaded(&harness).await;
    for leg in 0..2 {
        flow.select(leg, 0, "1A").unwrap();
        flow.select(leg, 1, "1B").unwrap();
    }

    let outcome = flow.confirm(&CancelSignal::never()).await.unwrap();
    let SagaOutcome::Failed(failure) = outcome else {
        panic!("expected a failed saga");
    };
    assert_eq!(failure.failed_leg, 1);
    assert_eq!(failure.confirmed.len(), 1);
    assert_eq!(failure.confirmed[0].booking.record.booking_id, "BK-1");
    assert_eq!(failure.confirmed[0].compensation, CompensationStatus::Compensated);
    assert_eq!(*harness.booking.cancelled.lock().unwrap(), vec!["BK-1".to_string()]);

    assert!(harness.store.get("booking").await.unwrap().is_none());
    assert!(!flow.assignments().is_frozen());
}

#[tokio::test]
async fn test_confirm_requires_loaded_catalogs() {
    let harness = Harness::new(Some(trip(&["svc-out"], false)), FakeBooking::default()).await;
    let mut flow = harness.enter().await.unwrap();
    let err = flow.confirm(&CancelSignal::never()).await.unwrap_err();
    assert!(matches!(err, CheckoutError::CatalogNotReady { ref legs } if legs == &vec![0]));
}

#[tokio::test]
async fn test_premium_checkout_uses_economy_price_and_wire_class() {
    let mut premium = trip(&["svc-premium"], false);
    premium.class_type = "Premium".to_string();
    let harness = Harness::new(Some(premium), FakeBooking::default()).await;
    let mut flow = loaded(&harness).await;

    assert_eq!(flow.board().catalog(0).unwrap().seats.get("1A").unwrap().class, SeatClass::Premium);
    assert_eq!(flow.quote().onward_fare, 1000);
    assert_eq!(flow.quote().total, 2000);

    flow.select(0, 0, "1A").unwrap();
    flow.select(0, 1, "1B").unwrap();
    assert!(flow.confirm(&CancelSignal::never()).await.unwrap().is_completed());

    let created = harness.booking.created.lock().unwrap().clone();
    assert_eq!(created[0].class_type, SeatClass::Premium);
    let body = serde_json::to_value(&created[0]).unwrap();
    assert_eq!(body["class_type"], "PremiumEconomy");
}
