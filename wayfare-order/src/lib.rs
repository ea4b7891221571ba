pub mod models;
pub mod assignment;
pub mod saga;

pub use models::{CompensationStatus, ConfirmedLeg, LegBooking, SagaFailure, SagaOutcome, SagaSuccess};
pub use assignment::{AssignmentError, AssignmentSnapshot, SeatAssignmentStore, Selection};
pub use saga::{BookingSaga, SagaError, SagaPolicy};
