use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;
use wayfare_core::identity::TokenProvider;
use wayfare_core::TripContext;
use wayfare_order::{LegBooking, SagaSuccess};
use wayfare_shared::Masked;

pub const TRIP_KEY: &str = "trip";
pub const AUTH_KEY: &str = "auth";
pub const BOOKING_KEY: &str = "booking";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No trip context in the session; the user has to go back to trip setup.
    #[error("No trip in progress, start again from trip setup")]
    MissingTripContext,

    #[error("Session value '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Session backend error: {0}")]
    Backend(String),
}

/// Key/value blob storage. Values are always read and replaced whole.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    async fn put(&self, key: &str, value: &str) -> Result<(), SessionError>;
}

#[derive(Default)]
pub struct InMemorySessionStore {
    values: RwLock<HashMap<String, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.values.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// What the payment screen receives after every leg was booked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingHandoff {
    pub saga_id: Uuid,
    pub booking_ids: Vec<String>,
    pub bookings: Vec<LegBooking>,
    pub total_amount: i64,
}

impl From<&SagaSuccess> for BookingHandoff {
    fn from(success: &SagaSuccess) -> Self {
        Self {
            saga_id: success.saga_id,
            booking_ids: success.booking_ids(),
            bookings: success.bookings.clone(),
            total_amount: success.total_amount(),
        }
    }
}

/// Reads the trip in, writes the booking result out. No validation happens here.
#[derive(Clone)]
pub struct SessionBridge {
    store: Arc<dyn SessionStore>,
}

impl SessionBridge {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn load_trip(&self) -> Result<TripContext, SessionError> {
        self.read(TRIP_KEY).await?.ok_or(SessionError::MissingTripContext)
    }

    pub async fn save_trip(&self, trip: &TripContext) -> Result<(), SessionError> {
        self.write(TRIP_KEY, trip).await
    }

    pub async fn save_token(&self, token: &Masked<String>) -> Result<(), SessionError> {
        self.write(AUTH_KEY, token).await
    }

    pub async fn write_handoff(&self, handoff: &BookingHandoff) -> Result<(), SessionError> {
        self.write(BOOKING_KEY, handoff).await?;
        info!("Booking handoff written for saga {}", handoff.saga_id);
        Ok(())
    }

    pub async fn load_handoff(&self) -> Result<Option<BookingHandoff>, SessionError> {
        self.read(BOOKING_KEY).await
    }

    async fn read<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>, SessionError> {
        match self.store.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| SessionError::Corrupt { key: key.to_string(), source }),
            None => Ok(None),
        }
    }

    async fn write<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), SessionError> {
        let raw = serde_json::to_string(value)
            .map_err(|source| SessionError::Corrupt { key: key.to_string(), source })?;
        self.store.put(key, &raw).await
    }
}

#[async_trait]
impl TokenProvider for SessionBridge {
    async fn get_token(&self) -> Option<Masked<String>> {
        match self.read::<Masked<String>>(AUTH_KEY).await {
            Ok(token) => token.filter(|t| !t.expose().trim().is_empty()),
            Err(e) => {
                warn!("Could not read auth token from session: {}", e);
                None
            }
        }
    }
}
