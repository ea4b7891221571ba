pub mod error;
pub mod http;
pub mod plan;
pub mod checkout;

pub use checkout::CheckoutFlow;
pub use error::CheckoutError;
pub use http::{HttpBookingService, HttpCatalogService};
pub use plan::PlannedSeat;
