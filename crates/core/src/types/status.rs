//! Status enums for teambuildings, events and registrations.
//!
//! All statuses travel as lowercase strings on the wire and in query strings
//! (`/registrations/status/confirmed`).

use serde::{Deserialize, Serialize};

/// Error returned when a status string is not one of the known values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind} status: {value}")]
pub struct ParseStatusError {
    /// Which status family was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Lifecycle of a teambuilding program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TeambuildingStatus {
    #[default]
    Active,
    Inactive,
    Completed,
    Cancelled,
}

impl TeambuildingStatus {
    /// Every variant, in display order.
    pub const ALL: [Self; 4] = [
        Self::Active,
        Self::Inactive,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TeambuildingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TeambuildingStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseStatusError {
                kind: "teambuilding",
                value: s.to_owned(),
            }),
        }
    }
}

/// Booking state of a scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Open,
    Closed,
    Full,
    Cancelled,
    Completed,
}

impl EventStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Full => "full",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "full" => Ok(Self::Full),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseStatusError {
                kind: "event",
                value: s.to_owned(),
            }),
        }
    }
}

/// State of a user's registration for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl RegistrationStatus {
    /// Every variant, in display order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Confirmed, Self::Cancelled];

    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RegistrationStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseStatusError {
                kind: "registration",
                value: s.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn registration_status_round_trips_through_display() {
        for status in RegistrationStatus::ALL {
            assert_eq!(status.to_string().parse::<RegistrationStatus>(), Ok(status));
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = "approved".parse::<RegistrationStatus>().unwrap_err();
        assert_eq!(err.to_string(), "invalid registration status: approved");
        assert!("Active".parse::<TeambuildingStatus>().is_err());
    }

    #[test]
    fn event_status_uses_lowercase_wire_format() {
        let status: EventStatus = serde_json::from_str("\"full\"").unwrap();
        assert_eq!(status, EventStatus::Full);
        assert_eq!(
            serde_json::to_string(&EventStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }
}
