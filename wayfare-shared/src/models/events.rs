use chrono::Utc;
use uuid::Uuid;

/// One entry of the booking saga journal.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct SagaEvent {
    pub saga_id: Uuid,
    pub leg_index: Option<usize>,
    pub kind: SagaEventKind,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SagaEventKind {
    LegRequested { service_id: String },
    LegConfirmed { booking_id: String, total_amount: i64 },
    LegFailed { reason: String },
    LegCompensated { booking_id: String },
    CompensationFailed { booking_id: String, reason: String },
    SagaCompleted { booking_ids: Vec<String>, total_amount: i64 },
}

impl SagaEvent {
    pub fn leg(saga_id: Uuid, leg_index: usize, kind: SagaEventKind) -> Self {
        Self {
            saga_id,
            leg_index: Some(leg_index),
            kind,
            timestamp: Utc::now().timestamp(),
        }
    }

    pub fn saga(saga_id: Uuid, kind: SagaEventKind) -> Self {
        Self {
            saga_id,
            leg_index: None,
            kind,
            timestamp: Utc::now().timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_is_tagged() {
        let event = SagaEvent::leg(
            Uuid::new_v4(),
            1,
            SagaEventKind::LegFailed { reason: "seat 4C no longer available".to_string() },
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["kind"]["type"], "LEG_FAILED");
        assert_eq!(value["leg_index"], 1);
    }
}
