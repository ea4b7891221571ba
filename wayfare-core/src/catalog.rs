use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::{ClassPrices, FeePolicy, Station};

// ============================================================================
// Catalog service wire models
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegDetails {
    pub service_id: String,
    pub route: WireRoute,
    pub schedule: WireSchedule,
    #[serde(default)]
    pub seat_inventory: Vec<WireSeat>,
    pub class_prices: ClassPrices,
    #[serde(default)]
    pub policy: FeePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireRoute {
    pub origin: Station,
    pub destination: Station,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireSchedule {
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireSeat {
    pub seat_number: String,
    /// Wire class name, e.g. `PremiumEconomy`. Mapped through `SeatClass::from_wire`.
    pub class: String,
    #[serde(default)]
    pub booked: bool,
    #[serde(default)]
    pub price: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogServiceError {
    #[error("Service {service_id} not found")]
    NotFound { service_id: String },

    #[error("Catalog responded with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed catalog payload: {0}")]
    Malformed(String),

    #[error("Transport failure: {0}")]
    Transport(String),
}

/// Read-only access to per-leg service data. Calls for different legs are independent.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn get_leg_details(&self, service_id: &str) -> Result<LegDetails, CatalogServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leg_details_deserialization() {
        let json = r#"
            {
                "service_id": "svc-101",
                "route": {
                    "origin": {"id": "KTM", "name": "Kathmandu"},
                    "destination": {"id": "PKR", "name": "Pokhara"}
                },
                "schedule": {
                    "departure": "2026-11-02T06:30:00Z",
                    "arrival": "2026-11-02T07:05:00Z"
                },
                "seat_inventory": [
                    {"seat_number": "1A", "class": "Business", "booked": true, "price": 9000},
                    {"seat_number": "7C", "class": "Economy"}
                ],
                "class_prices": {"business": 9000, "economy": 4200}
            }
        "#;
        let details: LegDetails = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(details.seat_inventory.len(), 2);
        assert!(details.seat_inventory[0].booked);
        assert!(!details.seat_inventory[1].booked);
        assert_eq!(details.class_prices.premium_economy, None);
        assert_eq!(details.policy.cancellation_fee, 0);
    }
}
