//! Registration endpoints.

use eventhub_core::{
    EventId, Registration, RegistrationId, RegistrationInput, RegistrationStatus,
    RegistrationUpdate, StatusUpdate,
};
use tracing::instrument;

use super::{QueryPairs, push_opt};
use crate::api::{ApiError, ApiSession};

/// Optional filters for [`RegistrationService::list`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationFilter {
    pub event_id: Option<EventId>,
    pub status: Option<RegistrationStatus>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl RegistrationFilter {
    fn query(&self) -> QueryPairs {
        let mut query = QueryPairs::new();
        push_opt(&mut query, "event_id", self.event_id);
        push_opt(&mut query, "status", self.status);
        push_opt(&mut query, "skip", self.skip);
        push_opt(&mut query, "limit", self.limit);
        query
    }
}

/// `/registrations/` resource.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationService<'a> {
    api: &'a ApiSession,
}

impl<'a> RegistrationService<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiSession) -> Self {
        Self { api }
    }

    /// List registrations.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &RegistrationFilter) -> Result<Vec<Registration>, ApiError> {
        self.api.get("/registrations/", &filter.query()).await
    }

    /// Registrations of the signed-in user.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn mine(&self) -> Result<Vec<Registration>, ApiError> {
        self.api.get("/registrations/my-registrations/", &[]).await
    }

    /// Registrations for one event.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn by_event(&self, id: EventId) -> Result<Vec<Registration>, ApiError> {
        self.api
            .get(&format!("/registrations/event/{id}"), &[])
            .await
    }

    /// Registrations in one status.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn by_status(
        &self,
        status: RegistrationStatus,
    ) -> Result<Vec<Registration>, ApiError> {
        self.api
            .get(&format!("/registrations/status/{status}"), &[])
            .await
    }

    /// Fetch one registration.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn get(&self, id: RegistrationId) -> Result<Registration, ApiError> {
        self.api.get(&format!("/registrations/{id}"), &[]).await
    }

    /// Register the signed-in user for an event.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn create(&self, input: &RegistrationInput) -> Result<Registration, ApiError> {
        self.api.post("/registrations/", input).await
    }

    /// Replace status and notes.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: RegistrationId,
        update: &RegistrationUpdate,
    ) -> Result<Registration, ApiError> {
        self.api
            .put(&format!("/registrations/{id}"), update)
            .await
    }

    /// Change only the status. Setting the current status again is a no-op
    /// on the backend.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: RegistrationId,
        status: RegistrationStatus,
    ) -> Result<Registration, ApiError> {
        self.api
            .put(
                &format!("/registrations/{id}/status"),
                &StatusUpdate { status },
            )
            .await
    }

    /// Delete a registration.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn delete(&self, id: RegistrationId) -> Result<(), ApiError> {
        self.api.delete(&format!("/registrations/{id}")).await
    }
}
