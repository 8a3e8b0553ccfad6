//! Integration tests for the EventHub admin.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p eventhub-integration-tests
//! ```
//!
//! No external services are needed. [`FakeBackend`] serves the REST contract
//! under `/api` and a minimal OAuth2 provider under `/idp` from one in-process
//! axum server; [`AdminServer`] runs the real admin router against it.
//!
//! # Test Categories
//!
//! - `api_client` - Resource services and error classification
//! - `admin_pages` - Page handlers, forms and redirects
//! - `login_flow` - Login, session expiry and logout

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Form, Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post, put},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use eventhub_admin::api::{AccessToken, ApiClient, ApiSession};
use eventhub_admin::config::{AdminConfig, ApiConfig};
use eventhub_admin::state::AppState;
use eventhub_core::{
    DashboardStats, Event, EventAvailability, EventId, EventInput, EventStatus, ProfileUpdate,
    Registration, RegistrationId, RegistrationStatus, StatusUpdate, Teambuilding, TeambuildingId,
    TeambuildingInput, TeambuildingStatus, UploadedImage, UserId, UserProfile,
};
use serde_json::json;
use sha2::{Digest, Sha256};
use tokio::net::TcpListener;

/// Token the fake provider issues; full read/write access.
pub const ADMIN_TOKEN: &str = "admin-token-7f3a";

/// Token accepted for reads only; writes answer 403.
pub const VIEWER_TOKEN: &str = "viewer-token-c21d";

/// Authorization code returned by `/idp/authorize`.
pub const AUTH_CODE: &str = "code-5e8b91";

pub const CLIENT_ID: &str = "eventhub-admin-tests";

/// Passes the placeholder and entropy checks of the admin config.
pub const CLIENT_SECRET: &str = "k3J9qT7vX2mP8wLz5RbN4cYh6FgD1sAe";

/// Email of the profile behind [`ADMIN_TOKEN`].
pub const ADMIN_EMAIL: &str = "olivia@eventhub.test";

pub const ADMIN_NAME: &str = "Olivia Ops";

/// Uploads above this size are refused with 413.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

// =============================================================================
// Fake backend
// =============================================================================

struct Store {
    teambuildings: BTreeMap<i64, Teambuilding>,
    events: BTreeMap<i64, Event>,
    registrations: BTreeMap<i64, Registration>,
    profile: UserProfile,
    next_id: i64,
    revoked: bool,
    /// PKCE challenge of the last `/authorize` call.
    challenge: Option<String>,
    status_writes: usize,
    uploads: usize,
    /// When set, every authorised read answers with this status.
    failing_reads: Option<StatusCode>,
}

impl Store {
    fn new() -> Self {
        Self {
            teambuildings: BTreeMap::new(),
            events: BTreeMap::new(),
            registrations: BTreeMap::new(),
            profile: UserProfile {
                id: Some(UserId::new(1)),
                email: ADMIN_EMAIL.to_string(),
                name: ADMIN_NAME.to_string(),
                phone: None,
                avatar_url: None,
                role: Some("admin".to_string()),
            },
            next_id: 1,
            revoked: false,
            challenge: None,
            status_writes: 0,
            uploads: 0,
            failing_reads: None,
        }
    }

    fn next_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn participants(&self, event_id: EventId) -> u32 {
        let count = self
            .registrations
            .values()
            .filter(|r| r.event_id == event_id && r.status != RegistrationStatus::Cancelled)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn teambuilding_view(&self, tb: &Teambuilding) -> Teambuilding {
        let events: Vec<&Event> = self
            .events
            .values()
            .filter(|e| e.teambuilding_id == tb.id)
            .collect();
        Teambuilding {
            total_events: u32::try_from(events.len()).unwrap_or(u32::MAX),
            total_participants: events.iter().map(|e| self.participants(e.id)).sum(),
            ..tb.clone()
        }
    }

    fn event_view(&self, event: &Event) -> Event {
        Event {
            current_participants: self.participants(event.id),
            ..event.clone()
        }
    }

    /// Registrations as list endpoints return them: names joined in.
    fn registration_view(&self, reg: &Registration) -> Registration {
        let event = self.events.get(&reg.event_id.as_i64());
        let teambuilding = event.and_then(|e| self.teambuildings.get(&e.teambuilding_id.as_i64()));
        Registration {
            event_name: event.map(|e| e.name.clone()),
            teambuilding_name: teambuilding.map(|t| t.name.clone()),
            ..reg.clone()
        }
    }
}

type Shared = Arc<Mutex<Store>>;

type Reply = Result<Response, Response>;

fn lock(store: &Shared) -> MutexGuard<'_, Store> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

fn detail(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

fn not_found(what: &str) -> Response {
    detail(StatusCode::NOT_FOUND, &format!("{what} not found"))
}

/// Check the bearer token. Writes need [`ADMIN_TOKEN`].
fn guard(store: &Shared, headers: &HeaderMap, write: bool) -> Result<(), Response> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let (revoked, failing_reads) = {
        let store = lock(store);
        (store.revoked, store.failing_reads)
    };

    if let Some(status) = failing_reads
        && !revoked
        && !write
        && matches!(token, Some(ADMIN_TOKEN | VIEWER_TOKEN))
    {
        return Err(detail(status, "Database temporarily unavailable"));
    }

    match token {
        Some(ADMIN_TOKEN) if !revoked => Ok(()),
        Some(VIEWER_TOKEN) if !revoked && !write => Ok(()),
        Some(VIEWER_TOKEN) if !revoked => Err(detail(
            StatusCode::FORBIDDEN,
            "Admin privileges required",
        )),
        _ => Err(detail(StatusCode::UNAUTHORIZED, "Could not validate credentials")),
    }
}

/// In-process EventHub REST backend and identity provider.
#[derive(Clone)]
pub struct FakeBackend {
    addr: SocketAddr,
    store: Shared,
}

impl FakeBackend {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let store: Shared = Arc::new(Mutex::new(Store::new()));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Fake backend has no address");

        let app = Router::new()
            .nest("/api", api_routes())
            .nest("/idp", idp_routes())
            .with_state(store.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, store }
    }

    /// Base URL of the REST API.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Issuer URL of the identity provider.
    #[must_use]
    pub fn issuer(&self) -> String {
        format!("http://{}/idp", self.addr)
    }

    /// API session presenting `token`.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn session(&self, token: &str) -> ApiSession {
        let config = ApiConfig::new(&self.api_url()).expect("Invalid fake API URL");
        ApiClient::new(&config)
            .expect("Failed to build API client")
            .session(Some(AccessToken::new(token)))
    }

    /// Make every token answer 401 from now on.
    pub fn revoke_tokens(&self) {
        lock(&self.store).revoked = true;
    }

    /// Answer every read with `status` until [`FakeBackend::restore_reads`].
    pub fn fail_reads(&self, status: StatusCode) {
        lock(&self.store).failing_reads = Some(status);
    }

    pub fn restore_reads(&self) {
        lock(&self.store).failing_reads = None;
    }

    /// Events as stored, in id order.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        lock(&self.store).events.values().cloned().collect()
    }

    /// Number of `PUT /registrations/{id}/status` calls that changed state.
    #[must_use]
    pub fn status_writes(&self) -> usize {
        lock(&self.store).status_writes
    }

    #[must_use]
    pub fn teambuilding_count(&self) -> usize {
        lock(&self.store).teambuildings.len()
    }

    #[must_use]
    pub fn registration_status(&self, id: RegistrationId) -> Option<RegistrationStatus> {
        lock(&self.store)
            .registrations
            .get(&id.as_i64())
            .map(|r| r.status)
    }

    /// Insert an active teambuilding in June 2030.
    pub fn seed_teambuilding(&self, name: &str) -> TeambuildingId {
        let mut store = lock(&self.store);
        let id = TeambuildingId::new(store.next_id());
        store.teambuildings.insert(
            id.as_i64(),
            Teambuilding {
                id,
                name: name.to_string(),
                description: None,
                location: Some("Ghent".to_string()),
                start_date: date(2030, 6, 1),
                end_date: date(2030, 6, 3),
                budget: None,
                image_url: None,
                status: TeambuildingStatus::Active,
                total_events: 0,
                total_participants: 0,
                created_at: None,
                updated_at: None,
            },
        );
        id
    }

    /// Insert an open event on `event_date` capped at `max_participants`.
    pub fn seed_event(
        &self,
        teambuilding_id: TeambuildingId,
        name: &str,
        event_date: NaiveDateTime,
        max_participants: u32,
    ) -> EventId {
        let mut store = lock(&self.store);
        let id = EventId::new(store.next_id());
        store.events.insert(
            id.as_i64(),
            Event {
                id,
                teambuilding_id,
                name: name.to_string(),
                description: None,
                event_date,
                location: None,
                max_participants: Some(max_participants),
                current_participants: 0,
                image_url: None,
                status: EventStatus::Open,
            },
        );
        id
    }

    pub fn seed_registration(
        &self,
        event_id: EventId,
        user_email: &str,
        status: RegistrationStatus,
    ) -> RegistrationId {
        let mut store = lock(&self.store);
        let id = RegistrationId::new(store.next_id());
        store.registrations.insert(
            id.as_i64(),
            Registration {
                id,
                event_id,
                user_id: None,
                user_email: Some(user_email.to_string()),
                status,
                registered_at: Utc::now().naive_utc(),
                event_name: None,
                teambuilding_name: None,
                notes: None,
                event: None,
                user: None,
            },
        );
        id
    }
}

/// Calendar date helper for seeds.
///
/// # Panics
///
/// Panics on an impossible date.
#[must_use]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("Invalid seed date")
}

/// Noon on the given day.
///
/// # Panics
///
/// Panics on an impossible date.
#[must_use]
pub fn noon(year: i32, month: u32, day: u32) -> NaiveDateTime {
    date(year, month, day)
        .and_hms_opt(12, 0, 0)
        .expect("Invalid seed time")
}

fn api_routes() -> Router<Shared> {
    Router::new()
        .route("/teambuildings/", get(list_teambuildings).post(create_teambuilding))
        .route("/teambuildings/active/", get(active_teambuildings))
        .route(
            "/teambuildings/{id}/",
            get(get_teambuilding)
                .put(update_teambuilding)
                .delete(delete_teambuilding),
        )
        .route("/events/", get(list_events).post(create_event))
        .route("/events/upcoming/", get(upcoming_events))
        .route("/events/teambuilding/{id}", get(events_by_teambuilding))
        .route(
            "/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/events/{id}/availability/", get(event_availability))
        .route("/registrations/", get(list_registrations))
        .route("/registrations/my-registrations/", get(my_registrations))
        .route("/registrations/event/{id}", get(registrations_by_event))
        .route("/registrations/status/{status}", get(registrations_by_status))
        .route(
            "/registrations/{id}",
            get(get_registration).delete(delete_registration),
        )
        .route("/registrations/{id}/status", put(update_registration_status))
        .route("/dashboard/stats", get(dashboard_stats))
        .route(
            "/upload/image",
            post(upload_image).layer(DefaultBodyLimit::max(4 * MAX_UPLOAD_BYTES)),
        )
        .route("/auth/me", get(get_profile).put(update_profile))
}

fn idp_routes() -> Router<Shared> {
    Router::new()
        .route("/authorize", get(authorize))
        .route("/oauth/token", post(token))
        .route("/userinfo", get(userinfo))
        .route("/v2/logout", get(logout))
}

// -----------------------------------------------------------------------------
// Teambuildings
// -----------------------------------------------------------------------------

async fn list_teambuildings(
    State(store): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    guard(&store, &headers, false)?;
    let store = lock(&store);
    let list: Vec<Teambuilding> = store
        .teambuildings
        .values()
        .filter(|tb| {
            query
                .get("status")
                .is_none_or(|s| s.as_str() == tb.status.as_str())
        })
        .map(|tb| store.teambuilding_view(tb))
        .collect();
    Ok(Json(list).into_response())
}

async fn active_teambuildings(State(store): State<Shared>, headers: HeaderMap) -> Reply {
    guard(&store, &headers, false)?;
    let store = lock(&store);
    let list: Vec<Teambuilding> = store
        .teambuildings
        .values()
        .filter(|tb| tb.is_active())
        .map(|tb| store.teambuilding_view(tb))
        .collect();
    Ok(Json(list).into_response())
}

async fn get_teambuilding(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    guard(&store, &headers, false)?;
    let store = lock(&store);
    let tb = store
        .teambuildings
        .get(&id)
        .ok_or_else(|| not_found("Teambuilding"))?;
    Ok(Json(store.teambuilding_view(tb)).into_response())
}

fn check_teambuilding(input: &TeambuildingInput) -> Result<(), Response> {
    if input.name.trim().is_empty() {
        return Err(detail(StatusCode::UNPROCESSABLE_ENTITY, "Name is required"));
    }
    if input.end_date < input.start_date {
        return Err(detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            "End date must be after start date",
        ));
    }
    Ok(())
}

async fn create_teambuilding(
    State(store): State<Shared>,
    headers: HeaderMap,
    Json(input): Json<TeambuildingInput>,
) -> Reply {
    guard(&store, &headers, true)?;
    check_teambuilding(&input)?;
    let mut store = lock(&store);
    let id = TeambuildingId::new(store.next_id());
    let tb = Teambuilding {
        id,
        name: input.name,
        description: input.description,
        location: input.location,
        start_date: input.start_date,
        end_date: input.end_date,
        budget: input.budget,
        image_url: input.image_url,
        status: input.status,
        total_events: 0,
        total_participants: 0,
        created_at: Some(Utc::now().naive_utc()),
        updated_at: None,
    };
    store.teambuildings.insert(id.as_i64(), tb.clone());
    Ok((StatusCode::CREATED, Json(tb)).into_response())
}

async fn update_teambuilding(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<TeambuildingInput>,
) -> Reply {
    guard(&store, &headers, true)?;
    check_teambuilding(&input)?;
    let mut store = lock(&store);
    let tb = store
        .teambuildings
        .get_mut(&id)
        .ok_or_else(|| not_found("Teambuilding"))?;
    tb.name = input.name;
    tb.description = input.description;
    tb.location = input.location;
    tb.start_date = input.start_date;
    tb.end_date = input.end_date;
    tb.budget = input.budget;
    tb.image_url = input.image_url;
    tb.status = input.status;
    tb.updated_at = Some(Utc::now().naive_utc());
    let tb = tb.clone();
    Ok(Json(store.teambuilding_view(&tb)).into_response())
}

async fn delete_teambuilding(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    guard(&store, &headers, true)?;
    let mut store = lock(&store);
    if !store.teambuildings.contains_key(&id) {
        return Err(not_found("Teambuilding"));
    }
    if store.events.values().any(|e| e.teambuilding_id.as_i64() == id) {
        return Err(detail(
            StatusCode::BAD_REQUEST,
            "Cannot delete teambuilding with existing events",
        ));
    }
    store.teambuildings.remove(&id);
    Ok(StatusCode::NO_CONTENT.into_response())
}

// -----------------------------------------------------------------------------
// Events
// -----------------------------------------------------------------------------

fn events_where(store: &Store, keep: impl Fn(&Event) -> bool) -> Vec<Event> {
    store
        .events
        .values()
        .filter(|e| keep(e))
        .map(|e| store.event_view(e))
        .collect()
}

async fn list_events(
    State(store): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    guard(&store, &headers, false)?;
    let store = lock(&store);
    let teambuilding = query.get("teambuilding_id").cloned();
    let list = events_where(&store, |e| {
        teambuilding
            .as_deref()
            .is_none_or(|id| e.teambuilding_id.to_string() == id)
    });
    Ok(Json(list).into_response())
}

async fn upcoming_events(
    State(store): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    guard(&store, &headers, false)?;
    let limit = query
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(10);
    let now = Utc::now().naive_utc();
    let store = lock(&store);
    let mut list = events_where(&store, |e| e.event_date >= now);
    list.sort_by_key(|e| e.event_date);
    list.truncate(limit);
    Ok(Json(list).into_response())
}

async fn events_by_teambuilding(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    guard(&store, &headers, false)?;
    let store = lock(&store);
    if !store.teambuildings.contains_key(&id) {
        return Err(not_found("Teambuilding"));
    }
    let list = events_where(&store, |e| e.teambuilding_id.as_i64() == id);
    Ok(Json(list).into_response())
}

async fn get_event(State(store): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    guard(&store, &headers, false)?;
    let store = lock(&store);
    let event = store.events.get(&id).ok_or_else(|| not_found("Event"))?;
    Ok(Json(store.event_view(event)).into_response())
}

async fn event_availability(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    guard(&store, &headers, false)?;
    let store = lock(&store);
    let event = store
        .events
        .get(&id)
        .map(|e| store.event_view(e))
        .ok_or_else(|| not_found("Event"))?;
    Ok(Json(EventAvailability {
        event_id: event.id,
        available: !event.is_full(),
        max_participants: event.max_participants,
        current_participants: event.current_participants,
        slots_remaining: event.slots_remaining(),
    })
    .into_response())
}

fn check_event(store: &Store, input: &EventInput) -> Result<(), Response> {
    if !store
        .teambuildings
        .contains_key(&input.teambuilding_id.as_i64())
    {
        return Err(not_found("Teambuilding"));
    }
    if input.max_participants == 0 {
        return Err(detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            "max_participants must be greater than 0",
        ));
    }
    Ok(())
}

async fn create_event(
    State(store): State<Shared>,
    headers: HeaderMap,
    Json(input): Json<EventInput>,
) -> Reply {
    guard(&store, &headers, true)?;
    let mut store = lock(&store);
    check_event(&store, &input)?;
    let id = EventId::new(store.next_id());
    let event = Event {
        id,
        teambuilding_id: input.teambuilding_id,
        name: input.name,
        description: input.description,
        event_date: input.event_date,
        location: input.location,
        max_participants: Some(input.max_participants),
        current_participants: 0,
        image_url: input.image_url,
        status: EventStatus::Open,
    };
    store.events.insert(id.as_i64(), event.clone());
    Ok((StatusCode::CREATED, Json(event)).into_response())
}

async fn update_event(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<EventInput>,
) -> Reply {
    guard(&store, &headers, true)?;
    let mut store = lock(&store);
    check_event(&store, &input)?;
    let event = store.events.get_mut(&id).ok_or_else(|| not_found("Event"))?;
    event.teambuilding_id = input.teambuilding_id;
    event.name = input.name;
    event.description = input.description;
    event.event_date = input.event_date;
    event.location = input.location;
    event.max_participants = Some(input.max_participants);
    event.image_url = input.image_url;
    let event = event.clone();
    Ok(Json(store.event_view(&event)).into_response())
}

async fn delete_event(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    guard(&store, &headers, true)?;
    let mut store = lock(&store);
    if !store.events.contains_key(&id) {
        return Err(not_found("Event"));
    }
    if store.registrations.values().any(|r| r.event_id.as_i64() == id) {
        return Err(detail(
            StatusCode::BAD_REQUEST,
            "Cannot delete event with existing registrations",
        ));
    }
    store.events.remove(&id);
    Ok(StatusCode::NO_CONTENT.into_response())
}

// -----------------------------------------------------------------------------
// Registrations
// -----------------------------------------------------------------------------

fn registrations_where(store: &Store, keep: impl Fn(&Registration) -> bool) -> Vec<Registration> {
    store
        .registrations
        .values()
        .filter(|r| keep(r))
        .map(|r| store.registration_view(r))
        .collect()
}

async fn list_registrations(
    State(store): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    guard(&store, &headers, false)?;
    let store = lock(&store);
    let list = registrations_where(&store, |r| {
        query
            .get("event_id")
            .is_none_or(|id| r.event_id.to_string() == *id)
            && query
                .get("status")
                .is_none_or(|s| s.as_str() == r.status.as_str())
    });
    Ok(Json(list).into_response())
}

async fn my_registrations(State(store): State<Shared>, headers: HeaderMap) -> Reply {
    guard(&store, &headers, false)?;
    let store = lock(&store);
    let email = store.profile.email.clone();
    let list = registrations_where(&store, |r| r.user_email.as_deref() == Some(email.as_str()));
    Ok(Json(list).into_response())
}

async fn registrations_by_event(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    guard(&store, &headers, false)?;
    let store = lock(&store);
    if !store.events.contains_key(&id) {
        return Err(not_found("Event"));
    }
    let list = registrations_where(&store, |r| r.event_id.as_i64() == id);
    Ok(Json(list).into_response())
}

async fn registrations_by_status(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(status): Path<String>,
) -> Reply {
    guard(&store, &headers, false)?;
    let status: RegistrationStatus = status
        .parse()
        .map_err(|_| detail(StatusCode::UNPROCESSABLE_ENTITY, "Invalid status"))?;
    let store = lock(&store);
    let list = registrations_where(&store, |r| r.status == status);
    Ok(Json(list).into_response())
}

async fn get_registration(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    guard(&store, &headers, false)?;
    let store = lock(&store);
    let reg = store
        .registrations
        .get(&id)
        .ok_or_else(|| not_found("Registration"))?;
    Ok(Json(store.registration_view(reg)).into_response())
}

/// Setting the current status again succeeds without a write.
async fn update_registration_status(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(update): Json<StatusUpdate>,
) -> Reply {
    guard(&store, &headers, true)?;
    let mut store = lock(&store);
    let reg = store
        .registrations
        .get_mut(&id)
        .ok_or_else(|| not_found("Registration"))?;
    let changed = reg.status != update.status;
    reg.status = update.status;
    let reg = reg.clone();
    if changed {
        store.status_writes += 1;
    }
    Ok(Json(store.registration_view(&reg)).into_response())
}

async fn delete_registration(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    guard(&store, &headers, true)?;
    let mut store = lock(&store);
    store
        .registrations
        .remove(&id)
        .ok_or_else(|| not_found("Registration"))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

// -----------------------------------------------------------------------------
// Dashboard, upload, profile
// -----------------------------------------------------------------------------

async fn dashboard_stats(State(store): State<Shared>, headers: HeaderMap) -> Reply {
    guard(&store, &headers, false)?;
    let store = lock(&store);
    let now = Utc::now().naive_utc();
    let count = |n: usize| u64::try_from(n).unwrap_or(u64::MAX);

    let mut recent: Vec<Registration> = store
        .registrations
        .values()
        .map(|r| store.registration_view(r))
        .collect();
    recent.sort_by(|a, b| b.registered_at.cmp(&a.registered_at));
    recent.truncate(5);

    Ok(Json(DashboardStats {
        total_teambuildings: count(store.teambuildings.len()),
        total_events: count(store.events.len()),
        total_registrations: count(store.registrations.len()),
        active_teambuildings: count(
            store.teambuildings.values().filter(|t| t.is_active()).count(),
        ),
        total_users: Some(1),
        upcoming_events: Some(count(
            store.events.values().filter(|e| e.event_date >= now).count(),
        )),
        recent_registrations: recent,
    })
    .into_response())
}

async fn upload_image(
    State(store): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Reply {
    guard(&store, &headers, true)?;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let is_image = field
            .content_type()
            .is_some_and(|ct| ct.starts_with("image/"));
        let bytes = field
            .bytes()
            .await
            .map_err(|_| detail(StatusCode::BAD_REQUEST, "Invalid upload"))?;

        if !is_image {
            return Err(detail(StatusCode::BAD_REQUEST, "File must be an image"));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(detail(StatusCode::PAYLOAD_TOO_LARGE, "File too large"));
        }

        let mut store = lock(&store);
        store.uploads += 1;
        return Ok(Json(UploadedImage {
            url: format!("/uploads/{}-{filename}", store.uploads),
            filename: Some(filename),
            size: u64::try_from(bytes.len()).ok(),
        })
        .into_response());
    }

    Err(detail(StatusCode::BAD_REQUEST, "No file uploaded"))
}

async fn get_profile(State(store): State<Shared>, headers: HeaderMap) -> Reply {
    guard(&store, &headers, false)?;
    Ok(Json(lock(&store).profile.clone()).into_response())
}

async fn update_profile(
    State(store): State<Shared>,
    headers: HeaderMap,
    Json(update): Json<ProfileUpdate>,
) -> Reply {
    guard(&store, &headers, true)?;
    let mut store = lock(&store);
    if let Some(name) = update.name {
        store.profile.name = name;
    }
    if update.phone.is_some() {
        store.profile.phone = update.phone;
    }
    if update.avatar_url.is_some() {
        store.profile.avatar_url = update.avatar_url;
    }
    Ok(Json(store.profile.clone()).into_response())
}

// -----------------------------------------------------------------------------
// Identity provider
// -----------------------------------------------------------------------------

/// Approve every login immediately and bounce back with [`AUTH_CODE`].
async fn authorize(
    State(store): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    let (Some(redirect_uri), Some(state), Some(challenge)) = (
        query.get("redirect_uri"),
        query.get("state"),
        query.get("code_challenge"),
    ) else {
        return Err(detail(StatusCode::BAD_REQUEST, "invalid_request"));
    };
    if query.get("client_id").map(String::as_str) != Some(CLIENT_ID) {
        return Err(detail(StatusCode::BAD_REQUEST, "unknown client"));
    }

    lock(&store).challenge = Some(challenge.clone());
    Ok(Redirect::to(&format!("{redirect_uri}?code={AUTH_CODE}&state={state}")).into_response())
}

async fn token(State(store): State<Shared>, Form(form): Form<HashMap<String, String>>) -> Reply {
    let invalid = |description: &str| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant", "error_description": description })),
        )
            .into_response()
    };

    if form.get("client_secret").map(String::as_str) != Some(CLIENT_SECRET) {
        return Err(invalid("client authentication failed"));
    }
    if form.get("code").map(String::as_str) != Some(AUTH_CODE) {
        return Err(invalid("invalid authorization code"));
    }
    let verifier = form.get("code_verifier").cloned().unwrap_or_default();
    let expected = lock(&store).challenge.take();
    if expected != Some(URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))) {
        return Err(invalid("PKCE verification failed"));
    }

    Ok(Json(json!({
        "access_token": ADMIN_TOKEN,
        "token_type": "Bearer",
        "expires_in": 3600,
    }))
    .into_response())
}

async fn userinfo(State(store): State<Shared>, headers: HeaderMap) -> Reply {
    guard(&store, &headers, false)?;
    Ok(Json(json!({
        "sub": "auth0|1",
        "email": ADMIN_EMAIL,
        "name": ADMIN_NAME,
    }))
    .into_response())
}

async fn logout(Query(query): Query<HashMap<String, String>>) -> Reply {
    let return_to = query
        .get("returnTo")
        .ok_or_else(|| detail(StatusCode::BAD_REQUEST, "returnTo is required"))?;
    Ok(Redirect::to(return_to).into_response())
}

// =============================================================================
// Admin server
// =============================================================================

/// The real admin router served against a [`FakeBackend`].
pub struct AdminServer {
    base_url: String,
}

impl AdminServer {
    /// Build the config through the normal loader and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the port cannot be bound or the config is rejected.
    pub async fn start(backend: &FakeBackend) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind admin server");
        let addr = listener.local_addr().expect("Admin server has no address");
        let base_url = format!("http://{addr}");

        let vars: HashMap<&str, String> = HashMap::from([
            ("ADMIN_BASE_URL", base_url.clone()),
            ("EVENTHUB_API_URL", backend.api_url()),
            ("EVENTHUB_API_TIMEOUT_SECS", "5".to_string()),
            ("AUTH0_DOMAIN", backend.issuer()),
            ("AUTH0_CLIENT_ID", CLIENT_ID.to_string()),
            ("AUTH0_CLIENT_SECRET", CLIENT_SECRET.to_string()),
        ]);
        let config =
            AdminConfig::from_lookup(|key| vars.get(key).cloned()).expect("Invalid test config");
        let state = AppState::new(config).expect("Failed to build app state");

        let app = eventhub_admin::app(state);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { base_url }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Cookie-keeping client that follows redirects.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn browser() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client")
    }

    /// Cookie-keeping client that stops at the first redirect.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn manual_browser() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }

    /// Run the full login round trip and return the landing page.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn login(&self, browser: &reqwest::Client) -> reqwest::Response {
        browser
            .get(self.url("/login/start"))
            .send()
            .await
            .expect("Login request failed")
    }
}
