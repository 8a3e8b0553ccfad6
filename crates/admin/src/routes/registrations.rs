//! Registration list, status change and delete handlers.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use eventhub_core::{EventId, Registration, RegistrationId, RegistrationStatus};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    auth::AuthSession,
    error::{AppError, page_message},
    filters,
    middleware::RequireSession,
    services::RegistrationFilter,
    state::AppState,
};

use super::{SelectOption, UserView, format_datetime, render, status_options};

const LIST_PATH: &str = "/registrations";

/// Query for the registrations page. Both filters are strings so the
/// "All" options (empty values) parse.
#[derive(Debug, Default, Deserialize)]
pub struct RegistrationsQuery {
    pub event_id: Option<String>,
    pub status: Option<String>,
}

/// Which list endpoint to call. Event and status filters are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    All,
    Event(EventId),
    Status(RegistrationStatus),
}

impl Selection {
    /// Resolve the query; the event filter wins when both are present.
    ///
    /// # Errors
    ///
    /// Returns a message when the status is not a known one.
    fn from_query(query: &RegistrationsQuery) -> Result<Self, String> {
        let non_empty = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        if let Some(event) = non_empty(&query.event_id) {
            return event
                .parse::<EventId>()
                .map(Self::Event)
                .map_err(|_| format!("invalid event id: {event}"));
        }
        match non_empty(&query.status) {
            Some(status) => status
                .parse::<RegistrationStatus>()
                .map(Self::Status)
                .map_err(|e| e.to_string()),
            None => Ok(Self::All),
        }
    }

    /// Query string that reproduces this selection.
    fn query_string(self) -> String {
        match self {
            Self::All => String::new(),
            Self::Event(id) => format!("?event_id={id}"),
            Self::Status(status) => format!("?status={status}"),
        }
    }
}

/// Registration row for lists (registrations page and dashboard).
#[derive(Debug, Clone)]
pub struct RegistrationRow {
    pub id: i64,
    pub user: String,
    pub event: String,
    pub teambuilding: String,
    pub status: String,
    pub registered_at: String,
    pub notes: String,
    pub status_options: Vec<SelectOption>,
}

impl From<&Registration> for RegistrationRow {
    fn from(reg: &Registration) -> Self {
        Self {
            id: reg.id.as_i64(),
            user: reg.user_label(),
            event: reg.event_label(),
            teambuilding: reg.teambuilding_name.clone().unwrap_or_default(),
            status: reg.status.to_string(),
            registered_at: format_datetime(reg.registered_at),
            notes: reg.notes.clone().unwrap_or_default(),
            status_options: status_options(
                RegistrationStatus::ALL.iter().map(RegistrationStatus::as_str),
                reg.status.as_str(),
            ),
        }
    }
}

/// Event dropdown derived from the fetched rows: one entry per distinct
/// `event_id`, in first-seen order.
#[must_use]
pub fn event_options(registrations: &[Registration], current: &str) -> Vec<SelectOption> {
    let mut seen = Vec::<EventId>::new();
    let mut options = vec![SelectOption::new("", "All events", current)];
    for reg in registrations {
        if !seen.contains(&reg.event_id) {
            seen.push(reg.event_id);
            options.push(SelectOption::new(
                reg.event_id.to_string(),
                reg.event_label(),
                current,
            ));
        }
    }
    options
}

/// Registrations page template.
#[derive(Template)]
#[template(path = "registrations/index.html")]
pub struct RegistrationsTemplate {
    pub admin_user: UserView,
    pub current_path: String,
    pub error: Option<String>,
    pub rows: Vec<RegistrationRow>,
    pub event_options: Vec<SelectOption>,
    pub status_filter: Vec<SelectOption>,
    /// Where row actions return to, keeping the active filter.
    pub return_to: String,
}

/// Status change submitted from a row.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
    #[serde(default)]
    pub return_to: String,
}

/// Delete submitted from a row.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub return_to: String,
}

/// Build the registrations router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(LIST_PATH, get(index))
        .route("/registrations/{id}/status", post(update_status))
        .route("/registrations/{id}/delete", post(delete))
}

/// Only follow redirects back into this page.
fn safe_return(return_to: &str) -> &str {
    if return_to.starts_with(LIST_PATH) && !return_to.starts_with("//") {
        return_to
    } else {
        LIST_PATH
    }
}

/// Render the list for `selection` with an optional banner.
async fn page(
    state: &AppState,
    auth: &AuthSession,
    selection: Selection,
    banner: Option<String>,
) -> Result<Response, AppError> {
    let api = state.api_for(auth);
    let result = match selection {
        Selection::All => api.registrations().list(&RegistrationFilter::default()).await,
        Selection::Event(id) => api.registrations().by_event(id).await,
        Selection::Status(status) => api.registrations().by_status(status).await,
    };

    let (error, registrations) = match result {
        Ok(list) => (banner, list),
        Err(e) => (Some(page_message(e)?), Vec::new()),
    };

    let current_event = match selection {
        Selection::Event(id) => id.to_string(),
        _ => String::new(),
    };
    let current_status = match selection {
        Selection::Status(status) => status.as_str(),
        _ => "",
    };
    let mut status_filter = vec![SelectOption::new("", "All statuses", current_status)];
    status_filter.extend(status_options(
        RegistrationStatus::ALL.iter().map(RegistrationStatus::as_str),
        current_status,
    ));

    let template = RegistrationsTemplate {
        admin_user: UserView::from(auth),
        current_path: LIST_PATH.to_string(),
        error,
        rows: registrations.iter().map(RegistrationRow::from).collect(),
        event_options: event_options(&registrations, &current_event),
        status_filter,
        return_to: format!("{LIST_PATH}{}", selection.query_string()),
    };
    Ok(render(&template).into_response())
}

/// Registrations list page.
///
/// GET /registrations
#[instrument(skip(auth, state))]
async fn index(
    RequireSession(auth): RequireSession,
    State(state): State<AppState>,
    Query(query): Query<RegistrationsQuery>,
) -> Result<Response, AppError> {
    match Selection::from_query(&query) {
        Ok(selection) => page(&state, &auth, selection, None).await,
        Err(message) => page(&state, &auth, Selection::All, Some(message)).await,
    }
}

/// Change a registration's status. Setting the current status again is a
/// no-op on the backend.
///
/// POST /registrations/{id}/status
#[instrument(skip(auth, state, form))]
async fn update_status(
    RequireSession(auth): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<StatusForm>,
) -> Result<Response, AppError> {
    let status = match form.status.parse::<RegistrationStatus>() {
        Ok(status) => status,
        Err(e) => return page(&state, &auth, Selection::All, Some(e.to_string())).await,
    };

    let id = RegistrationId::new(id);
    match state
        .api_for(&auth)
        .registrations()
        .update_status(id, status)
        .await
    {
        Ok(reg) => {
            tracing::info!(id = %reg.id, status = %reg.status, "Registration status updated");
            Ok(Redirect::to(safe_return(&form.return_to)).into_response())
        }
        Err(e) => {
            let banner = page_message(e)?;
            page(&state, &auth, Selection::All, Some(banner)).await
        }
    }
}

/// Delete a registration.
///
/// POST /registrations/{id}/delete
#[instrument(skip(auth, state, form))]
async fn delete(
    RequireSession(auth): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<DeleteForm>,
) -> Result<Response, AppError> {
    let id = RegistrationId::new(id);
    match state.api_for(&auth).registrations().delete(id).await {
        Ok(()) => Ok(Redirect::to(safe_return(&form.return_to)).into_response()),
        Err(e) => {
            let banner = page_message(e)?;
            page(&state, &auth, Selection::All, Some(banner)).await
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn registration(id: i64, event_id: i64, event_name: &str) -> Registration {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "event_id": event_id,
            "user_email": "ana@example.com",
            "status": "pending",
            "registered_at": "2026-05-01T10:00:00",
            "event_name": event_name
        }))
        .unwrap()
    }

    fn query(event_id: Option<&str>, status: Option<&str>) -> RegistrationsQuery {
        RegistrationsQuery {
            event_id: event_id.map(str::to_string),
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn event_options_are_distinct_in_first_seen_order() {
        let regs = vec![
            registration(1, 7, "Kayaking"),
            registration(2, 3, "Climbing"),
            registration(3, 7, "Kayaking"),
        ];
        let options = event_options(&regs, "3");
        let values: Vec<_> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, ["", "7", "3"]);
        assert_eq!(options[2].label, "Climbing");
        assert!(options[2].selected);
    }

    #[test]
    fn event_filter_wins_over_status() {
        assert_eq!(
            Selection::from_query(&query(Some("7"), Some("confirmed"))).unwrap(),
            Selection::Event(EventId::new(7))
        );
        assert_eq!(
            Selection::from_query(&query(Some(""), Some("confirmed"))).unwrap(),
            Selection::Status(RegistrationStatus::Confirmed)
        );
        assert_eq!(
            Selection::from_query(&query(None, None)).unwrap(),
            Selection::All
        );
    }

    #[test]
    fn unknown_status_is_reported() {
        assert!(Selection::from_query(&query(None, Some("approved"))).is_err());
    }

    #[test]
    fn return_targets_stay_on_the_page() {
        assert_eq!(
            safe_return("/registrations?status=pending"),
            "/registrations?status=pending"
        );
        assert_eq!(safe_return("https://evil.example"), "/registrations");
        assert_eq!(safe_return(""), "/registrations");
    }

    #[test]
    fn rows_preselect_the_current_status() {
        let row = RegistrationRow::from(&registration(1, 7, "Kayaking"));
        let selected: Vec<_> = row
            .status_options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(selected, ["pending"]);
        assert_eq!(row.user, "ana@example.com");
    }
}
