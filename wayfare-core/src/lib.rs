pub mod seat_class;
pub mod trip;
pub mod leg;
pub mod catalog;
pub mod booking;
pub mod identity;
pub mod cancel;

pub use seat_class::SeatClass;
pub use trip::{ContactInfo, Passenger, ProtectionFlags, TripContext};
pub use leg::{ClassPrices, FeePolicy, Leg, Seat, Station};
pub use cancel::{cancel_pair, CancelHandle, CancelSignal, Interrupted};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
