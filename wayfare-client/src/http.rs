use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;
use wayfare_core::booking::{BookingRecord, BookingService, BookingServiceError, CreateBookingRequest};
use wayfare_core::catalog::{CatalogService, CatalogServiceError, LegDetails};
use wayfare_shared::Masked;

/// Catalog service over HTTP: `GET {base}/services/{id}`.
#[derive(Clone)]
pub struct HttpCatalogService {
    client: Client,
    base_url: String,
}

impl HttpCatalogService {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CatalogService for HttpCatalogService {
    async fn get_leg_details(&self, service_id: &str) -> Result<LegDetails, CatalogServiceError> {
        let url = format!("{}/services/{}", self.base_url, service_id);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogServiceError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => response
                .json::<LegDetails>()
                .await
                .map_err(|e| CatalogServiceError::Malformed(e.to_string())),
            StatusCode::NOT_FOUND => Err(CatalogServiceError::NotFound { service_id: service_id.to_string() }),
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(CatalogServiceError::Status { status: status.as_u16(), message })
            }
        }
    }
}

/// Booking service over HTTP: `POST {base}/bookings`, `DELETE {base}/bookings/{id}`.
#[derive(Clone)]
pub struct HttpBookingService {
    client: Client,
    base_url: String,
}

/// Body of a 409 from the booking service.
#[derive(Debug, Deserialize)]
struct SeatConflict {
    #[serde(default)]
    unavailable_seats: Vec<String>,
}

impl HttpBookingService {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn rejection(status: StatusCode, response: reqwest::Response) -> BookingServiceError {
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
        BookingServiceError::Rejected { status: status.as_u16(), body }
    }
}

#[async_trait]
impl BookingService for HttpBookingService {
    async fn create_booking(
        &self,
        token: &Masked<String>,
        request: &CreateBookingRequest,
    ) -> Result<BookingRecord, BookingServiceError> {
        let url = format!("{}/bookings", self.base_url);
        debug!("POST {} for service {}", url, request.service_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token.expose())
            .json(request)
            .send()
            .await
            .map_err(|e| BookingServiceError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => response
                .json::<BookingRecord>()
                .await
                .map_err(|e| BookingServiceError::Transport(format!("unreadable booking response: {}", e))),
            StatusCode::CONFLICT => {
                let conflict: SeatConflict = response
                    .json()
                    .await
                    .unwrap_or(SeatConflict { unavailable_seats: Vec::new() });
                let seats = if conflict.unavailable_seats.is_empty() {
                    request.passengers.iter().map(|p| p.seat_number.clone()).collect()
                } else {
                    conflict.unavailable_seats
                };
                Err(BookingServiceError::SeatUnavailable { seats })
            }
            status => Err(Self::rejection(status, response).await),
        }
    }

    async fn cancel_booking(&self, token: &Masked<String>, booking_id: &str) -> Result<(), BookingServiceError> {
        let url = format!("{}/bookings/{}", self.base_url, booking_id);
        debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(|e| BookingServiceError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            status => Err(Self::rejection(status, response).await),
        }
    }
}
