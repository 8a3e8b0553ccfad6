//! Event endpoints.

use eventhub_core::{Event, EventAvailability, EventId, EventInput, EventStatus, TeambuildingId};
use tracing::instrument;

use super::{QueryPairs, push_opt};
use crate::api::{ApiError, ApiSession};

/// Default page size of [`EventService::upcoming`].
pub const DEFAULT_UPCOMING_LIMIT: u32 = 10;

/// Optional filters for [`EventService::list`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EventFilter {
    pub teambuilding_id: Option<TeambuildingId>,
    pub status: Option<EventStatus>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl EventFilter {
    fn query(&self) -> QueryPairs {
        let mut query = QueryPairs::new();
        push_opt(&mut query, "teambuilding_id", self.teambuilding_id);
        push_opt(&mut query, "status", self.status);
        push_opt(&mut query, "skip", self.skip);
        push_opt(&mut query, "limit", self.limit);
        query
    }
}

/// `/events/` resource.
#[derive(Debug, Clone, Copy)]
pub struct EventService<'a> {
    api: &'a ApiSession,
}

impl<'a> EventService<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiSession) -> Self {
        Self { api }
    }

    /// List events.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>, ApiError> {
        self.api.get("/events/", &filter.query()).await
    }

    /// Events scheduled after now, soonest first.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn upcoming(&self, limit: u32) -> Result<Vec<Event>, ApiError> {
        self.api
            .get("/events/upcoming/", &[("limit", limit.to_string())])
            .await
    }

    /// Fetch one event.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn get(&self, id: EventId) -> Result<Event, ApiError> {
        self.api.get(&format!("/events/{id}"), &[]).await
    }

    /// Events belonging to one teambuilding (server-side filter).
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn by_teambuilding(&self, id: TeambuildingId) -> Result<Vec<Event>, ApiError> {
        self.api
            .get(&format!("/events/teambuilding/{id}"), &[])
            .await
    }

    /// Remaining capacity of an event.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn availability(&self, id: EventId) -> Result<EventAvailability, ApiError> {
        self.api
            .get(&format!("/events/{id}/availability/"), &[])
            .await
    }

    /// Create an event.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &EventInput) -> Result<Event, ApiError> {
        self.api.post("/events/", input).await
    }

    /// Replace an event's editable fields.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn update(&self, id: EventId, input: &EventInput) -> Result<Event, ApiError> {
        self.api.put(&format!("/events/{id}"), input).await
    }

    /// Delete an event.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn delete(&self, id: EventId) -> Result<(), ApiError> {
        self.api.delete(&format!("/events/{id}")).await
    }
}
