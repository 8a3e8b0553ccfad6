//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Redirect to /dashboard or /login
//!
//! # Auth
//! GET  /login                         - Login page
//! GET  /login/start                   - Redirect to the identity provider
//! GET  /auth/callback                 - Provider callback (code exchange)
//! GET  /auth/expired                  - Clear a rejected session
//! POST /logout                        - Logout
//!
//! # Pages (require a session)
//! GET  /dashboard                     - Stats, recent registrations, upcoming events
//! GET  /teambuildings                 - List (+ ?status, ?new=1, ?edit={id})
//! POST /teambuildings                 - Create
//! POST /teambuildings/{id}            - Update
//! POST /teambuildings/{id}/delete     - Delete
//! GET  /events                        - List (+ ?teambuilding_id, ?new=1, ?edit={id})
//! POST /events                        - Create
//! POST /events/image                  - Upload an image into the pending form
//! POST /events/{id}                   - Update
//! POST /events/{id}/delete            - Delete
//! GET  /registrations                 - List (+ ?event_id | ?status)
//! POST /registrations/{id}/status     - Change status
//! POST /registrations/{id}/delete     - Delete
//! GET  /profile                       - Profile
//! POST /profile                       - Update profile
//! ```

pub mod auth;
pub mod dashboard;
pub mod events;
pub mod profile;
pub mod registrations;
pub mod teambuildings;

use askama::Template;
use axum::{
    Router,
    response::{Html, Redirect},
    routing::get,
};
use chrono::{NaiveDate, NaiveDateTime};
use tower_sessions::Session;

use crate::auth::{AuthSession, AuthState};
use crate::state::AppState;

/// Signed-in user shown in the sidebar.
#[derive(Debug, Clone)]
pub struct UserView {
    pub name: String,
    pub email: String,
}

impl From<&AuthSession> for UserView {
    fn from(auth: &AuthSession) -> Self {
        let name = if auth.user.name.trim().is_empty() {
            auth.user.email.clone()
        } else {
            auth.user.name.clone()
        };
        Self {
            name,
            email: auth.user.email.clone(),
        }
    }
}

/// One `<option>` of a select, with its selection precomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>, current: &str) -> Self {
        let value = value.into();
        Self {
            selected: value == current,
            label: label.into(),
            value,
        }
    }
}

/// Options for a status select.
pub(crate) fn status_options<'a>(
    statuses: impl IntoIterator<Item = &'a str>,
    current: &str,
) -> Vec<SelectOption> {
    statuses
        .into_iter()
        .map(|status| SelectOption::new(status, crate::filters::humanize(status), current))
        .collect()
}

/// Build the full page router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(teambuildings::router())
        .merge(events::router())
        .merge(registrations::router())
        .merge(profile::router())
}

/// GET /
async fn index(session: Session) -> Redirect {
    match AuthState::load(&session, chrono::Utc::now().timestamp()).await {
        AuthState::Authenticated(_) => Redirect::to("/dashboard"),
        AuthState::Loading | AuthState::Unauthenticated => Redirect::to("/login"),
    }
}

/// Render a template, falling back to a plain error body.
pub(crate) fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub(crate) fn format_datetime(at: NaiveDateTime) -> String {
    at.format("%b %-d, %Y %H:%M").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_options_mark_the_current_value() {
        let options = status_options(["pending", "confirmed"], "confirmed");
        assert_eq!(options.len(), 2);
        assert!(!options[0].selected);
        assert!(options[1].selected);
        assert_eq!(options[1].label, "Confirmed");
    }

    #[test]
    fn dates_render_for_humans() {
        let date = NaiveDate::from_ymd_opt(2026, 6, 2).unwrap();
        assert_eq!(format_date(date), "Jun 2, 2026");
        assert_eq!(
            format_datetime(date.and_hms_opt(9, 5, 0).unwrap()),
            "Jun 2, 2026 09:05"
        );
    }
}
