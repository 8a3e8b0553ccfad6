//! HTML form payloads and their validation.
//!
//! Form fields arrive as strings exactly as typed; `validate` turns them into
//! the API input types before any backend call is made. A failed validation
//! re-renders the form with the typed values intact.

use chrono::NaiveDate;
use eventhub_core::{
    DEFAULT_MAX_PARTICIPANTS, Event, EventInput, ProfileUpdate, Teambuilding, TeambuildingId,
    TeambuildingInput, TeambuildingStatus, UserProfile, types::timestamp,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Date format of `<input type="date">`.
const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

/// Date format of `<input type="datetime-local">`.
const DATETIME_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// A field that blocks submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} {message}")]
    Invalid {
        field: &'static str,
        message: &'static str,
    },
}

/// Trimmed value, or `None` when blank.
fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn required(value: &str, field: &'static str) -> Result<String, FormError> {
    optional(value).ok_or(FormError::Required(field))
}

fn date(value: &str, field: &'static str) -> Result<NaiveDate, FormError> {
    let value = required(value, field)?;
    NaiveDate::parse_from_str(&value, DATE_INPUT_FORMAT).map_err(|_| FormError::Invalid {
        field,
        message: "is not a valid date",
    })
}

// =============================================================================
// Teambuildings
// =============================================================================

/// Teambuilding create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TeambuildingForm {
    pub name: String,
    pub description: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub budget: String,
    pub image_url: String,
    pub status: String,
}

impl TeambuildingForm {
    /// Empty form for a new teambuilding.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            status: TeambuildingStatus::default().to_string(),
            ..Self::default()
        }
    }

    /// Check required fields and convert to the API payload.
    ///
    /// # Errors
    ///
    /// Returns the first field that blocks submission.
    pub fn validate(&self) -> Result<TeambuildingInput, FormError> {
        let name = required(&self.name, "Name")?;
        let start_date = date(&self.start_date, "Start date")?;
        let end_date = date(&self.end_date, "End date")?;
        if end_date < start_date {
            return Err(FormError::Invalid {
                field: "End date",
                message: "must not be before the start date",
            });
        }

        let budget = optional(&self.budget)
            .map(|b| b.parse::<Decimal>())
            .transpose()
            .map_err(|_| FormError::Invalid {
                field: "Budget",
                message: "must be a number",
            })?;
        if budget.is_some_and(|b| b.is_sign_negative()) {
            return Err(FormError::Invalid {
                field: "Budget",
                message: "must not be negative",
            });
        }

        let status = optional(&self.status)
            .map(|s| s.parse::<TeambuildingStatus>())
            .transpose()
            .map_err(|_| FormError::Invalid {
                field: "Status",
                message: "is not a known status",
            })?
            .unwrap_or_default();

        Ok(TeambuildingInput {
            name,
            description: optional(&self.description),
            location: optional(&self.location),
            start_date,
            end_date,
            budget,
            image_url: optional(&self.image_url),
            status,
        })
    }
}

impl From<&Teambuilding> for TeambuildingForm {
    fn from(tb: &Teambuilding) -> Self {
        Self {
            name: tb.name.clone(),
            description: tb.description.clone().unwrap_or_default(),
            location: tb.location.clone().unwrap_or_default(),
            start_date: tb.start_date.format(DATE_INPUT_FORMAT).to_string(),
            end_date: tb.end_date.format(DATE_INPUT_FORMAT).to_string(),
            budget: tb.budget.map(|b| b.to_string()).unwrap_or_default(),
            image_url: tb.image_url.clone().unwrap_or_default(),
            status: tb.status.to_string(),
        }
    }
}

// =============================================================================
// Events
// =============================================================================

/// Event create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EventForm {
    pub teambuilding_id: String,
    pub name: String,
    pub description: String,
    pub event_date: String,
    pub location: String,
    pub max_participants: String,
    pub image_url: String,
}

impl EventForm {
    /// Empty form for a new event, optionally preselecting a teambuilding.
    #[must_use]
    pub fn blank(teambuilding_id: Option<TeambuildingId>) -> Self {
        Self {
            teambuilding_id: teambuilding_id.map(|id| id.to_string()).unwrap_or_default(),
            max_participants: DEFAULT_MAX_PARTICIPANTS.to_string(),
            ..Self::default()
        }
    }

    /// Assign a field by its HTML name. Unknown names are ignored.
    ///
    /// Used when the form arrives as multipart alongside an image.
    pub fn set_field(&mut self, name: &str, value: String) {
        match name {
            "teambuilding_id" => self.teambuilding_id = value,
            "name" => self.name = value,
            "description" => self.description = value,
            "event_date" => self.event_date = value,
            "location" => self.location = value,
            "max_participants" => self.max_participants = value,
            "image_url" => self.image_url = value,
            _ => {}
        }
    }

    /// Selected teambuilding, if the field holds a valid id.
    #[must_use]
    pub fn selected_teambuilding(&self) -> Option<TeambuildingId> {
        self.teambuilding_id.parse().ok()
    }

    /// Check required fields and convert to the API payload.
    ///
    /// # Errors
    ///
    /// Returns the first field that blocks submission.
    pub fn validate(&self) -> Result<EventInput, FormError> {
        let teambuilding_id = required(&self.teambuilding_id, "Teambuilding")?
            .parse::<TeambuildingId>()
            .map_err(|_| FormError::Invalid {
                field: "Teambuilding",
                message: "is not a valid selection",
            })?;
        let name = required(&self.name, "Name")?;
        let event_date = timestamp::parse(&required(&self.event_date, "Date & time")?).ok_or(
            FormError::Invalid {
                field: "Date & time",
                message: "is not a valid date and time",
            },
        )?;
        let max_participants = required(&self.max_participants, "Max participants")?
            .parse::<u32>()
            .ok()
            .filter(|max| *max > 0)
            .ok_or(FormError::Invalid {
                field: "Max participants",
                message: "must be a whole number greater than zero",
            })?;

        Ok(EventInput {
            teambuilding_id,
            name,
            description: optional(&self.description),
            event_date,
            location: optional(&self.location),
            max_participants,
            image_url: optional(&self.image_url),
        })
    }
}

impl From<&Event> for EventForm {
    fn from(event: &Event) -> Self {
        Self {
            teambuilding_id: event.teambuilding_id.to_string(),
            name: event.name.clone(),
            description: event.description.clone().unwrap_or_default(),
            event_date: event.event_date.format(DATETIME_INPUT_FORMAT).to_string(),
            location: event.location.clone().unwrap_or_default(),
            max_participants: event
                .max_participants
                .unwrap_or(DEFAULT_MAX_PARTICIPANTS)
                .to_string(),
            image_url: event.image_url.clone().unwrap_or_default(),
        }
    }
}

// =============================================================================
// Profile
// =============================================================================

/// Profile edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub name: String,
    pub phone: String,
    pub avatar_url: String,
}

impl ProfileForm {
    /// Convert to the API payload. Blank optional fields are sent empty so
    /// they can be cleared.
    ///
    /// # Errors
    ///
    /// Returns `FormError::Required` if the name is blank.
    pub fn validate(&self) -> Result<ProfileUpdate, FormError> {
        Ok(ProfileUpdate {
            name: Some(required(&self.name, "Name")?),
            phone: Some(self.phone.trim().to_string()),
            avatar_url: Some(self.avatar_url.trim().to_string()),
        })
    }
}

impl From<&UserProfile> for ProfileForm {
    fn from(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            phone: profile.phone.clone().unwrap_or_default(),
            avatar_url: profile.avatar_url.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn teambuilding_form() -> TeambuildingForm {
        TeambuildingForm {
            name: " Summer Retreat ".to_string(),
            start_date: "2026-06-01".to_string(),
            end_date: "2026-06-03".to_string(),
            budget: "1500.50".to_string(),
            ..TeambuildingForm::blank()
        }
    }

    fn event_form() -> EventForm {
        EventForm {
            teambuilding_id: "3".to_string(),
            name: "Kayaking".to_string(),
            event_date: "2026-06-02T09:30".to_string(),
            ..EventForm::blank(None)
        }
    }

    #[test]
    fn teambuilding_form_converts_to_input() {
        let input = teambuilding_form().validate().unwrap();
        assert_eq!(input.name, "Summer Retreat");
        assert_eq!(input.description, None);
        assert_eq!(input.budget, Some("1500.50".parse().unwrap()));
        assert_eq!(input.status, TeambuildingStatus::Active);
    }

    #[test]
    fn missing_dates_block_submission() {
        let form = TeambuildingForm {
            end_date: String::new(),
            ..teambuilding_form()
        };
        assert_eq!(form.validate(), Err(FormError::Required("End date")));

        let form = TeambuildingForm {
            start_date: "  ".to_string(),
            ..teambuilding_form()
        };
        assert_eq!(form.validate(), Err(FormError::Required("Start date")));
    }

    #[test]
    fn end_date_before_start_is_rejected() {
        let form = TeambuildingForm {
            end_date: "2026-05-30".to_string(),
            ..teambuilding_form()
        };
        assert!(matches!(
            form.validate(),
            Err(FormError::Invalid {
                field: "End date",
                ..
            })
        ));
    }

    #[test]
    fn blank_name_is_required() {
        let form = TeambuildingForm {
            name: "   ".to_string(),
            ..teambuilding_form()
        };
        assert_eq!(form.validate().unwrap_err().to_string(), "Name is required");
    }

    #[test]
    fn event_form_defaults_to_fifty_participants() {
        let input = event_form().validate().unwrap();
        assert_eq!(input.max_participants, 50);
        assert_eq!(input.teambuilding_id, TeambuildingId::new(3));
        assert_eq!(
            input.event_date.format("%Y-%m-%d %H:%M").to_string(),
            "2026-06-02 09:30"
        );
    }

    #[test]
    fn zero_participants_is_rejected() {
        let form = EventForm {
            max_participants: "0".to_string(),
            ..event_form()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn event_without_teambuilding_is_rejected() {
        let form = EventForm {
            teambuilding_id: String::new(),
            ..event_form()
        };
        assert_eq!(form.validate(), Err(FormError::Required("Teambuilding")));
    }

    #[test]
    fn multipart_fields_fill_the_form() {
        let mut form = EventForm::blank(None);
        form.set_field("name", "Climbing".to_string());
        form.set_field("image_url", "/uploads/a.jpg".to_string());
        form.set_field("file", "ignored".to_string());
        assert_eq!(form.name, "Climbing");
        assert_eq!(form.image_url, "/uploads/a.jpg");
    }

    #[test]
    fn event_round_trips_through_the_form() {
        let event: Event = serde_json::from_value(serde_json::json!({
            "id": 9,
            "teambuilding_id": 3,
            "name": "Kayaking",
            "event_date": "2026-06-02T09:30:00",
            "max_participants": 12
        }))
        .unwrap();
        let form = EventForm::from(&event);
        assert_eq!(form.event_date, "2026-06-02T09:30");
        assert_eq!(form.max_participants, "12");
        assert_eq!(form.validate().unwrap().event_date, event.event_date);
    }

    #[test]
    fn profile_requires_a_name() {
        let form = ProfileForm {
            name: String::new(),
            phone: "123".to_string(),
            avatar_url: String::new(),
        };
        assert_eq!(form.validate(), Err(FormError::Required("Name")));
    }
}
