//! Event list, form, image upload and delete handlers.

use std::collections::HashMap;

use askama::Template;
use axum::{
    Form, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use eventhub_core::{Event, EventId, Teambuilding, TeambuildingId};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    auth::AuthSession,
    error::{AppError, page_message},
    filters,
    forms::EventForm,
    middleware::RequireSession,
    services::{EventFilter, ImageFile, TeambuildingFilter},
    state::AppState,
};

use super::{SelectOption, UserView, format_datetime, render};

const LIST_PATH: &str = "/events";

/// Request body cap for `/events/image` (the backend accepts up to 10 MB).
const UPLOAD_BODY_LIMIT: usize = 12 * 1024 * 1024;

/// Query for the events page.
///
/// `teambuilding_id` is a string so the "All" option (empty value) parses.
#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    pub teambuilding_id: Option<String>,
    pub edit: Option<i64>,
    pub new: Option<String>,
}

/// Event row for lists (events page and dashboard).
#[derive(Debug, Clone)]
pub struct EventRow {
    pub id: i64,
    pub name: String,
    pub teambuilding: String,
    pub date: String,
    pub location: String,
    pub capacity: String,
    pub status: String,
    pub is_full: bool,
}

impl From<&Event> for EventRow {
    fn from(event: &Event) -> Self {
        let capacity = match event.max_participants {
            Some(max) => format!("{} / {max}", event.current_participants),
            None => event.current_participants.to_string(),
        };
        Self {
            id: event.id.as_i64(),
            name: event.name.clone(),
            teambuilding: format!("#{}", event.teambuilding_id),
            date: format_datetime(event.event_date),
            location: event.location.clone().unwrap_or_default(),
            capacity,
            status: event.status.to_string(),
            is_full: event.is_full(),
        }
    }
}

/// The create/edit form shown above the list.
#[derive(Debug, Clone)]
pub struct FormPanel {
    pub editing_id: Option<EventId>,
    pub form: EventForm,
    pub error: Option<String>,
    /// Absolute URL of `form.image_url`, for the preview.
    pub preview_url: Option<String>,
}

impl FormPanel {
    fn new(editing_id: Option<EventId>, form: EventForm) -> Self {
        Self {
            editing_id,
            form,
            error: None,
            preview_url: None,
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

    /// Editing id carried through the upload round-trip.
    #[must_use]
    pub fn editing_value(&self) -> String {
        self.editing_id.map(|id| id.to_string()).unwrap_or_default()
    }

    #[must_use]
    pub const fn title(&self) -> &'static str {
        if self.editing_id.is_some() {
            "Edit event"
        } else {
            "New event"
        }
    }
}

/// Events page template.
#[derive(Template)]
#[template(path = "events/index.html")]
pub struct EventsTemplate {
    pub admin_user: UserView,
    pub current_path: String,
    pub error: Option<String>,
    pub rows: Vec<EventRow>,
    pub filter_options: Vec<SelectOption>,
    pub filter_value: String,
    pub teambuilding_options: Vec<SelectOption>,
    pub panel: Option<FormPanel>,
}

/// Build the events router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(LIST_PATH, get(index).post(create))
        .route(
            "/events/image",
            post(upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/events/{id}", post(update))
        .route("/events/{id}/delete", post(delete))
}

fn parse_filter(raw: Option<&str>) -> Option<TeambuildingId> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}

/// Dropdown options: one per teambuilding, in list order.
fn teambuilding_options(
    teambuildings: &[Teambuilding],
    all_label: Option<&str>,
    current: &str,
) -> Vec<SelectOption> {
    all_label
        .map(|label| SelectOption::new("", label, current))
        .into_iter()
        .chain(
            teambuildings
                .iter()
                .map(|tb| SelectOption::new(tb.id.to_string(), tb.name.clone(), current)),
        )
        .collect()
}

/// Render the list with an optional form panel and banner.
///
/// Events and the teambuilding dropdown are fetched concurrently. The
/// teambuilding filter is applied by the backend.
async fn page(
    state: &AppState,
    auth: &AuthSession,
    filter: Option<TeambuildingId>,
    panel: Option<FormPanel>,
    banner: Option<String>,
) -> Result<Response, AppError> {
    let api = state.api_for(auth);
    let events = async {
        match filter {
            Some(id) => api.events().by_teambuilding(id).await,
            None => api.events().list(&EventFilter::default()).await,
        }
    };
    let teambuilding_service = api.teambuildings();
    let all = TeambuildingFilter::default();
    let (events, teambuildings) = tokio::join!(events, teambuilding_service.list(&all));

    let (teambuildings, options_error) = match teambuildings {
        Ok(list) => (list, None),
        Err(e) => (Vec::new(), Some(page_message(e)?)),
    };
    let names: HashMap<TeambuildingId, &str> = teambuildings
        .iter()
        .map(|tb| (tb.id, tb.name.as_str()))
        .collect();

    let (error, rows) = match events {
        Ok(events) => {
            let rows = events
                .iter()
                .map(|event| {
                    let mut row = EventRow::from(event);
                    if let Some(name) = names.get(&event.teambuilding_id) {
                        row.teambuilding = (*name).to_string();
                    }
                    row
                })
                .collect();
            (banner.or(options_error), rows)
        }
        Err(e) => (Some(page_message(e)?), Vec::new()),
    };

    let filter_value = filter.map(|id| id.to_string()).unwrap_or_default();
    let panel = panel.map(|mut panel| {
        let image = panel.form.image_url.trim();
        panel.preview_url = (!image.is_empty()).then(|| state.api().asset_url(image));
        panel
    });
    let form_selection = panel
        .as_ref()
        .map(|p| p.form.teambuilding_id.clone())
        .unwrap_or_default();

    let template = EventsTemplate {
        admin_user: UserView::from(auth),
        current_path: LIST_PATH.to_string(),
        error,
        rows,
        filter_options: teambuilding_options(
            &teambuildings,
            Some("All teambuildings"),
            &filter_value,
        ),
        filter_value,
        teambuilding_options: teambuilding_options(
            &teambuildings,
            Some("Select a teambuilding"),
            &form_selection,
        ),
        panel,
    };
    Ok(render(&template).into_response())
}

/// Events list page.
///
/// GET /events
#[instrument(skip(auth, state))]
async fn index(
    RequireSession(auth): RequireSession,
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Response, AppError> {
    let filter = parse_filter(query.teambuilding_id.as_deref());
    let mut banner = None;

    let panel = if let Some(id) = query.edit {
        let id = EventId::new(id);
        match state.api_for(&auth).events().get(id).await {
            Ok(event) => Some(FormPanel::new(Some(id), EventForm::from(&event))),
            Err(e) => {
                banner = Some(page_message(e)?);
                None
            }
        }
    } else {
        query
            .new
            .is_some()
            .then(|| FormPanel::new(None, EventForm::blank(filter)))
    };

    page(&state, &auth, filter, panel, banner).await
}

/// Create an event.
///
/// POST /events
#[instrument(skip(auth, state, form))]
async fn create(
    RequireSession(auth): RequireSession,
    State(state): State<AppState>,
    Form(form): Form<EventForm>,
) -> Result<Response, AppError> {
    save(&state, &auth, None, form).await
}

/// Update an event.
///
/// POST /events/{id}
#[instrument(skip(auth, state, form))]
async fn update(
    RequireSession(auth): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<EventForm>,
) -> Result<Response, AppError> {
    save(&state, &auth, Some(EventId::new(id)), form).await
}

/// Create when `editing_id` is `None`, update otherwise; reload on success.
async fn save(
    state: &AppState,
    auth: &AuthSession,
    editing_id: Option<EventId>,
    form: EventForm,
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
        Some(id) => api.events().update(id, &input).await,
        None => api.events().create(&input).await,
    };

    match result {
        Ok(event) => {
            tracing::info!(id = %event.id, "Event saved");
            Ok(Redirect::to(LIST_PATH).into_response())
        }
        Err(e) => {
            let panel = FormPanel::new(editing_id, form).with_error(page_message(e)?);
            page(state, auth, None, Some(panel), None).await
        }
    }
}

/// Upload an image for the pending form and re-render it with the result.
///
/// The multipart body carries the form's current fields plus `file`. On
/// success the returned URL replaces `image_url`; on failure it is kept.
///
/// POST /events/image
#[instrument(skip(auth, state, multipart))]
async fn upload_image(
    RequireSession(auth): RequireSession,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = EventForm::default();
    let mut editing_id = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("image").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                if !bytes.is_empty() {
                    file = Some(ImageFile::new(file_name, content_type, bytes.to_vec()));
                }
            }
            "editing_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                editing_id = value.trim().parse::<EventId>().ok();
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                form.set_field(&name, value);
            }
        }
    }

    let mut panel = FormPanel::new(editing_id, form);
    match file {
        None => panel = panel.with_error("Choose an image to upload"),
        Some(file) => match state.api_for(&auth).upload().upload_image(file).await {
            Ok(image) => {
                tracing::info!(url = %image.url, "Event image uploaded");
                panel.form.image_url = image.url;
            }
            Err(e) => panel = panel.with_error(page_message(e)?),
        },
    }

    page(&state, &auth, None, Some(panel), None).await
}

/// Delete an event.
///
/// POST /events/{id}/delete
#[instrument(skip(auth, state))]
async fn delete(
    RequireSession(auth): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    match state.api_for(&auth).events().delete(EventId::new(id)).await {
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

    fn event(max: Option<u32>, current: u32) -> Event {
        serde_json::from_value(serde_json::json!({
            "id": 4,
            "teambuilding_id": 2,
            "name": "Escape room",
            "event_date": "2026-06-02T18:00:00",
            "max_participants": max,
            "current_participants": current,
            "status": "open"
        }))
        .unwrap()
    }

    #[test]
    fn rows_show_capacity() {
        assert_eq!(EventRow::from(&event(Some(10), 3)).capacity, "3 / 10");
        assert_eq!(EventRow::from(&event(None, 3)).capacity, "3");
        assert!(EventRow::from(&event(Some(3), 3)).is_full);
    }

    #[test]
    fn empty_filter_means_all() {
        assert_eq!(parse_filter(Some("")), None);
        assert_eq!(parse_filter(None), None);
        assert_eq!(parse_filter(Some("5")), Some(TeambuildingId::new(5)));
    }

    #[test]
    fn form_panel_posts_to_create_or_update() {
        let panel = FormPanel::new(Some(EventId::new(9)), EventForm::blank(None));
        assert_eq!(panel.action(), "/events/9");
        assert_eq!(panel.editing_value(), "9");
        assert_eq!(FormPanel::new(None, EventForm::blank(None)).action(), "/events");
    }
}
