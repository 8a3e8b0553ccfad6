//! Teambuilding list, form and delete handlers.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use eventhub_core::{Teambuilding, TeambuildingId, TeambuildingStatus};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    auth::AuthSession,
    error::{AppError, page_message},
    filters,
    forms::TeambuildingForm,
    middleware::RequireSession,
    services::TeambuildingFilter,
    state::AppState,
};

use super::{SelectOption, UserView, format_date, render, status_options};

const LIST_PATH: &str = "/teambuildings";

/// Query for the teambuildings page.
#[derive(Debug, Default, Deserialize)]
pub struct TeambuildingsQuery {
    pub status: Option<String>,
    pub edit: Option<i64>,
    pub new: Option<String>,
}

/// Teambuilding row for the list.
#[derive(Debug, Clone)]
pub struct TeambuildingRow {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub dates: String,
    pub budget: String,
    pub status: String,
    pub total_events: u32,
    pub total_participants: u32,
}

impl From<&Teambuilding> for TeambuildingRow {
    fn from(tb: &Teambuilding) -> Self {
        Self {
            id: tb.id.as_i64(),
            name: tb.name.clone(),
            location: tb.location.clone().unwrap_or_default(),
            dates: format!(
                "{} - {}",
                format_date(tb.start_date),
                format_date(tb.end_date)
            ),
            budget: tb.budget.map(|b| format!("{b:.2}")).unwrap_or_default(),
            status: tb.status.to_string(),
            total_events: tb.total_events,
            total_participants: tb.total_participants,
        }
    }
}

/// The create/edit form shown above the list.
#[derive(Debug, Clone)]
pub struct FormPanel {
    pub editing_id: Option<TeambuildingId>,
    pub form: TeambuildingForm,
    pub error: Option<String>,
}

impl FormPanel {
    fn new(editing_id: Option<TeambuildingId>, form: TeambuildingForm) -> Self {
        Self {
            editing_id,
            form,
            error: None,
        }
    }

    fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Where the form posts.
    #[must_use]
    pub fn action(&self) -> String {
        self.editing_id
            .map_or_else(|| LIST_PATH.to_string(), |id| format!("{LIST_PATH}/{id}"))
    }

    /// Status choices with the form's value selected.
    #[must_use]
    pub fn status_options(&self) -> Vec<SelectOption> {
        status_options(
            TeambuildingStatus::ALL.iter().map(TeambuildingStatus::as_str),
            &self.form.status,
        )
    }

    #[must_use]
    pub const fn title(&self) -> &'static str {
        if self.editing_id.is_some() {
            "Edit teambuilding"
        } else {
            "New teambuilding"
        }
    }
}

/// Teambuildings page template.
#[derive(Template)]
#[template(path = "teambuildings/index.html")]
pub struct TeambuildingsTemplate {
    pub admin_user: UserView,
    pub current_path: String,
    pub error: Option<String>,
    pub rows: Vec<TeambuildingRow>,
    pub status_filter: Vec<SelectOption>,
    pub panel: Option<FormPanel>,
}

/// Build the teambuildings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(LIST_PATH, get(index).post(create))
        .route("/teambuildings/{id}", post(update))
        .route("/teambuildings/{id}/delete", post(delete))
}

/// Render the list with an optional form panel and banner.
///
/// A failed list call replaces the rows entirely.
async fn page(
    state: &AppState,
    auth: &AuthSession,
    status: Option<TeambuildingStatus>,
    panel: Option<FormPanel>,
    banner: Option<String>,
) -> Result<Response, AppError> {
    let api = state.api_for(auth);
    let filter = TeambuildingFilter {
        status,
        ..TeambuildingFilter::default()
    };

    let (error, rows) = match api.teambuildings().list(&filter).await {
        Ok(list) => (banner, list.iter().map(TeambuildingRow::from).collect()),
        Err(e) => (Some(page_message(e)?), Vec::new()),
    };

    let template = TeambuildingsTemplate {
        admin_user: UserView::from(auth),
        current_path: LIST_PATH.to_string(),
        error,
        rows,
        status_filter: status_options(
            TeambuildingStatus::ALL.iter().map(TeambuildingStatus::as_str),
            status.as_ref().map_or("", TeambuildingStatus::as_str),
        ),
        panel,
    };
    Ok(render(&template).into_response())
}

/// Teambuildings list page.
///
/// GET /teambuildings
#[instrument(skip(auth, state))]
async fn index(
    RequireSession(auth): RequireSession,
    State(state): State<AppState>,
    Query(query): Query<TeambuildingsQuery>,
) -> Result<Response, AppError> {
    let mut banner = None;

    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match raw.parse::<TeambuildingStatus>() {
            Ok(status) => Some(status),
            Err(e) => {
                banner = Some(e.to_string());
                None
            }
        },
    };

    let panel = if let Some(id) = query.edit {
        let id = TeambuildingId::new(id);
        match state.api_for(&auth).teambuildings().get(id).await {
            Ok(tb) => Some(FormPanel::new(Some(id), TeambuildingForm::from(&tb))),
            Err(e) => {
                banner = Some(page_message(e)?);
                None
            }
        }
    } else {
        query
            .new
            .is_some()
            .then(|| FormPanel::new(None, TeambuildingForm::blank()))
    };

    page(&state, &auth, status, panel, banner).await
}

/// Create a teambuilding.
///
/// POST /teambuildings
#[instrument(skip(auth, state, form))]
async fn create(
    RequireSession(auth): RequireSession,
    State(state): State<AppState>,
    Form(form): Form<TeambuildingForm>,
) -> Result<Response, AppError> {
    save(&state, &auth, None, form).await
}

/// Update a teambuilding.
///
/// POST /teambuildings/{id}
#[instrument(skip(auth, state, form))]
async fn update(
    RequireSession(auth): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<TeambuildingForm>,
) -> Result<Response, AppError> {
    save(&state, &auth, Some(TeambuildingId::new(id)), form).await
}

/// Create when `editing_id` is `None`, update otherwise; reload on success.
async fn save(
    state: &AppState,
    auth: &AuthSession,
    editing_id: Option<TeambuildingId>,
    form: TeambuildingForm,
) -> Result<Response, AppError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(e) => {
            let panel = FormPanel::new(editing_id, form).with_error(e.to_string());
            return page(state, auth, None, Some(panel), None).await;
        }
    };

    let api = state.api_for(auth);
    let result = match editing_id {
        Some(id) => api.teambuildings().update(id, &input).await,
        None => api.teambuildings().create(&input).await,
    };

    match result {
        Ok(tb) => {
            tracing::info!(id = %tb.id, "Teambuilding saved");
            Ok(Redirect::to(LIST_PATH).into_response())
        }
        Err(e) => {
            let panel = FormPanel::new(editing_id, form).with_error(page_message(e)?);
            page(state, auth, None, Some(panel), None).await
        }
    }
}

/// Delete a teambuilding. The backend decides whether dependants block it.
///
/// POST /teambuildings/{id}/delete
#[instrument(skip(auth, state))]
async fn delete(
    RequireSession(auth): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let id = TeambuildingId::new(id);
    match state.api_for(&auth).teambuildings().delete(id).await {
        Ok(()) => Ok(Redirect::to(LIST_PATH).into_response()),
        Err(e) => {
            let banner = page_message(e)?;
            page(&state, &auth, None, None, Some(banner)).await
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn form_panel_posts_to_create_or_update() {
        let new = FormPanel::new(None, TeambuildingForm::blank());
        assert_eq!(new.action(), "/teambuildings");
        assert_eq!(new.title(), "New teambuilding");

        let edit = FormPanel::new(Some(TeambuildingId::new(7)), TeambuildingForm::blank());
        assert_eq!(edit.action(), "/teambuildings/7");
    }

    #[test]
    fn rows_format_dates_and_budget() {
        let tb: Teambuilding = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Retreat",
            "start_date": "2026-06-01",
            "end_date": "2026-06-03",
            "budget": "1500.5",
            "status": "active"
        }))
        .unwrap();
        let row = TeambuildingRow::from(&tb);
        assert_eq!(row.dates, "Jun 1, 2026 - Jun 3, 2026");
        assert_eq!(row.budget, "1500.50");
        assert_eq!(row.status, "active");
    }
}
