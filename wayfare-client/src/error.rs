use wayfare_catalog::CatalogError;
use wayfare_core::CoreError;
use wayfare_order::{AssignmentError, SagaError};
use wayfare_store::SessionError;

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// No usable trip in the session. The caller sends the user back to trip setup.
    #[error("No trip in progress, start again from trip setup")]
    NeedsTripSetup,

    #[error(transparent)]
    InvalidTrip(#[from] CoreError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Assignment(#[from] AssignmentError),

    #[error("Seat maps for leg(s) {} are not loaded yet", format_legs(.legs))]
    CatalogNotReady { legs: Vec<usize> },

    #[error(transparent)]
    Saga(#[from] SagaError),

    /// Every leg is booked but the result could not be handed to the payment screen.
    #[error("Bookings {} were created but could not be saved: {source}", .booking_ids.join(", "))]
    HandoffFailed {
        booking_ids: Vec<String>,
        #[source]
        source: SessionError,
    },
}

fn format_legs(legs: &[usize]) -> String {
    legs.iter()
        .map(|l| (l + 1).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
