use serde::{Deserialize, Serialize};
use wayfare_shared::Masked;
use crate::{CoreError, CoreResult, SeatClass};

/// A trip participant. Supplied by the passenger-details screen and never edited here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Passenger {
    pub name: String,
    pub age: u8,
    pub gender: String,
    pub nationality: String,
    pub document_id: Masked<String>,
}

/// Opt-in protection products carried over from the search screen.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProtectionFlags {
    #[serde(default)]
    pub cancellation: bool,
    #[serde(default)]
    pub reschedule: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
}

/// Everything the seat screen needs from earlier screens.
///
/// `legs` holds catalog service ids in travel order: the outbound leg first and,
/// for a round trip, the return leg second. `origin_id` and `destination_id` are the
/// stations of the outbound direction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripContext {
    pub legs: Vec<String>,
    pub origin_id: String,
    pub destination_id: String,
    pub passengers: Vec<Passenger>,
    pub class_type: String,
    #[serde(default)]
    pub protection: ProtectionFlags,
    pub contact: ContactInfo,
}

impl TripContext {
    pub fn is_round_trip(&self) -> bool {
        self.legs.len() == 2
    }

    pub fn passenger_count(&self) -> usize {
        self.passengers.len()
    }

    /// Stations for the booking request of `leg_index`. The return leg travels the
    /// outbound route reversed.
    pub fn stations_for_leg(&self, leg_index: usize) -> (&str, &str) {
        if leg_index % 2 == 1 {
            (&self.destination_id, &self.origin_id)
        } else {
            (&self.origin_id, &self.destination_id)
        }
    }

    /// The trip class resolved through the class table. `None` for names it does not know.
    pub fn seat_class(&self) -> Option<SeatClass> {
        SeatClass::parse(&self.class_type)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.legs.is_empty() || self.legs.len() > 2 {
            return Err(CoreError::ValidationError(format!(
                "a trip needs one or two legs, got {}",
                self.legs.len()
            )));
        }
        if self.passengers.is_empty() {
            return Err(CoreError::ValidationError("a trip needs at least one passenger".to_string()));
        }
        if self.legs.iter().any(|id| id.trim().is_empty()) {
            return Err(CoreError::ValidationError("leg service id is empty".to_string()));
        }
        Ok(())
    }
}
