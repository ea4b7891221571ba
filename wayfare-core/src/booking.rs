use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wayfare_shared::Masked;
use crate::{ContactInfo, Passenger, ProtectionFlags, SeatClass};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PassengerSeat {
    #[serde(flatten)]
    pub passenger: Passenger,
    pub seat_number: String,
}

/// Request body for booking a single leg.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateBookingRequest {
    pub service_id: String,
    pub passengers: Vec<PassengerSeat>,
    /// Serialized with the class table's wire name.
    pub class_type: SeatClass,
    pub origin_id: String,
    pub destination_id: String,
    pub protection: ProtectionFlags,
    pub contact: ContactInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// Server-issued result for one leg. Never modified after receipt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingRecord {
    pub booking_id: String,
    pub assigned_seats: Vec<String>,
    pub total_amount: i64,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum BookingServiceError {
    #[error("Seats no longer available: {}", seats.join(", "))]
    SeatUnavailable { seats: Vec<String> },

    #[error("Booking rejected with status {status}: {body}")]
    Rejected { status: u16, body: serde_json::Value },

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Timed out after {0} ms")]
    Timeout(u64),

    #[error("Cancelled before completion")]
    Cancelled,
}

/// Remote booking-creation service.
#[async_trait]
pub trait BookingService: Send + Sync {
    /// Book one leg for every passenger in the request.
    async fn create_booking(
        &self,
        token: &Masked<String>,
        request: &CreateBookingRequest,
    ) -> Result<BookingRecord, BookingServiceError>;

    /// Cancel a confirmed booking. Used to compensate earlier legs of a failed saga.
    async fn cancel_booking(
        &self,
        token: &Masked<String>,
        booking_id: &str,
    ) -> Result<(), BookingServiceError>;
}
