//! Registrations of users for events.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::{EventId, RegistrationId, RegistrationStatus, UserId, timestamp};

/// A registration row.
///
/// List endpoints join the event and teambuilding names in, either flat
/// (`event_name`, `user_email`) or as nested `event` / `user` records; the
/// bare resource only carries the ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub event_id: EventId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub status: RegistrationStatus,
    #[serde(alias = "registration_date", with = "timestamp")]
    pub registered_at: NaiveDateTime,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub teambuilding_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<EventSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

/// Nested event record on a detailed registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    #[serde(default)]
    pub name: Option<String>,
}

/// Nested user record on a detailed registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Registration {
    /// Label for the registrant: the email when joined in, else the user id.
    #[must_use]
    pub fn user_label(&self) -> String {
        let nested = self.user.as_ref().and_then(|u| u.email.as_ref());
        match (self.user_email.as_ref().or(nested), self.user_id) {
            (Some(email), _) => email.clone(),
            (None, Some(id)) => format!("user #{id}"),
            (None, None) => "unknown".to_owned(),
        }
    }

    /// Label for the event: the joined name, else the event id.
    #[must_use]
    pub fn event_label(&self) -> String {
        self.event_name
            .clone()
            .or_else(|| self.event.as_ref().and_then(|e| e.name.clone()))
            .unwrap_or_else(|| format!("event #{}", self.event_id))
    }
}

/// Payload for registering the current user to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationInput {
    pub event_id: EventId,
    pub notes: Option<String>,
}

/// Full update payload (`PUT /registrations/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationUpdate {
    pub status: RegistrationStatus,
    pub notes: Option<String>,
}

/// Status-only update payload (`PUT /registrations/{id}/status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: RegistrationStatus,
}
