//! The signed-in user's profile (`/auth/me`).

use serde::{Deserialize, Serialize};

use crate::types::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<UserId>,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl UserProfile {
    /// Name to show in the layout, falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// Editable subset of the profile. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_email() {
        let mut profile: UserProfile =
            serde_json::from_str(r#"{"email":"ops@example.com","name":"  "}"#).unwrap();
        assert_eq!(profile.display_name(), "ops@example.com");

        profile.name = "Ops Team".to_owned();
        assert_eq!(profile.display_name(), "Ops Team");
    }

    #[test]
    fn update_omits_unchanged_fields() {
        let update = ProfileUpdate {
            phone: Some("+385 1 234".to_owned()),
            ..ProfileUpdate::default()
        };
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"phone":"+385 1 234"}"#
        );
    }
}
