//! Teambuilding programs.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{TeambuildingId, TeambuildingStatus, timestamp};

/// A teambuilding program as returned by `/teambuildings/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teambuilding {
    pub id: TeambuildingId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub budget: Option<Decimal>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub status: TeambuildingStatus,
    /// Number of events scheduled under this program (server derived).
    #[serde(default)]
    pub total_events: u32,
    /// Registrations across all of its events (server derived).
    #[serde(default)]
    pub total_participants: u32,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<NaiveDateTime>,
}

impl Teambuilding {
    /// Whether the program is currently accepting new events.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == TeambuildingStatus::Active
    }

    /// Length of the program in days, inclusive of both ends.
    #[must_use]
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// Create/update payload for a teambuilding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeambuildingInput {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: Option<Decimal>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub status: TeambuildingStatus,
}

impl From<&Teambuilding> for TeambuildingInput {
    fn from(tb: &Teambuilding) -> Self {
        Self {
            name: tb.name.clone(),
            description: tb.description.clone(),
            location: tb.location.clone(),
            start_date: tb.start_date,
            end_date: tb.end_date,
            budget: tb.budget,
            image_url: tb.image_url.clone(),
            status: tb.status,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_backend_response_with_optional_fields_missing() {
        let tb: Teambuilding = serde_json::from_value(json!({
            "id": 3,
            "name": "Retreat 2024",
            "start_date": "2024-06-01",
            "end_date": "2024-06-03",
            "created_at": "2024-01-10T08:00:00.000000",
        }))
        .unwrap();

        assert_eq!(tb.id, TeambuildingId::new(3));
        assert!(tb.is_active());
        assert_eq!(tb.duration_days(), 3);
        assert_eq!(tb.total_events, 0);
        assert!(tb.budget.is_none());
        assert!(tb.created_at.is_some());
    }

    #[test]
    fn budget_accepts_string_and_number() {
        let from_str: Teambuilding = serde_json::from_value(json!({
            "id": 1, "name": "A", "start_date": "2024-01-01", "end_date": "2024-01-01",
            "budget": "1500.50",
        }))
        .unwrap();
        let from_num: Teambuilding = serde_json::from_value(json!({
            "id": 1, "name": "A", "start_date": "2024-01-01", "end_date": "2024-01-01",
            "budget": 1500.5,
        }))
        .unwrap();

        assert_eq!(from_str.budget, from_num.budget);
    }

    #[test]
    fn missing_dates_fail_decoding() {
        let result = serde_json::from_value::<Teambuilding>(json!({
            "id": 1,
            "name": "Retreat 2024",
            "is_active": true,
        }));
        assert!(result.is_err());
    }
}
