//! Scheduled events belonging to a teambuilding program.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::{EventId, EventStatus, TeambuildingId, timestamp};

/// Participant cap suggested for new events.
pub const DEFAULT_MAX_PARTICIPANTS: u32 = 50;

/// An event as returned by `/events/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub teambuilding_id: TeambuildingId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "timestamp")]
    pub event_date: NaiveDateTime,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub max_participants: Option<u32>,
    /// Maintained by the backend; never sent by the client.
    #[serde(default)]
    pub current_participants: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub status: EventStatus,
}

impl Event {
    /// Free seats, or `None` for uncapped events.
    #[must_use]
    pub fn slots_remaining(&self) -> Option<u32> {
        self.max_participants
            .map(|max| max.saturating_sub(self.current_participants))
    }

    /// Whether the event has no seats left.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.slots_remaining() == Some(0) || self.status == EventStatus::Full
    }
}

/// Create/update payload for an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInput {
    pub teambuilding_id: TeambuildingId,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "timestamp")]
    pub event_date: NaiveDateTime,
    pub location: Option<String>,
    pub max_participants: u32,
    pub image_url: Option<String>,
}

/// Response of `/events/{id}/availability/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAvailability {
    pub event_id: EventId,
    pub available: bool,
    #[serde(default)]
    pub max_participants: Option<u32>,
    #[serde(default)]
    pub current_participants: u32,
    #[serde(default)]
    pub slots_remaining: Option<u32>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(max: Option<u32>, current: u32) -> Event {
        serde_json::from_value(json!({
            "id": 1,
            "teambuilding_id": 2,
            "name": "Kayaking",
            "event_date": "2025-07-01T10:00:00",
            "max_participants": max,
            "current_participants": current,
        }))
        .unwrap()
    }

    #[test]
    fn slots_remaining_never_underflows() {
        assert_eq!(event(Some(10), 4).slots_remaining(), Some(6));
        assert_eq!(event(Some(10), 12).slots_remaining(), Some(0));
        assert_eq!(event(None, 12).slots_remaining(), None);
    }

    #[test]
    fn full_when_capacity_reached() {
        assert!(event(Some(5), 5).is_full());
        assert!(!event(None, 500).is_full());
    }

    #[test]
    fn input_serializes_event_date_without_offset() {
        let input = EventInput {
            teambuilding_id: TeambuildingId::new(2),
            name: "Kayaking".to_owned(),
            description: None,
            event_date: timestamp::parse("2025-07-01T10:00").unwrap(),
            location: None,
            max_participants: DEFAULT_MAX_PARTICIPANTS,
            image_url: None,
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["event_date"], "2025-07-01T10:00:00");
        assert_eq!(value["max_participants"], 50);
    }
}
