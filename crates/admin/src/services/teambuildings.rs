//! Teambuilding endpoints.

use eventhub_core::{Teambuilding, TeambuildingId, TeambuildingInput, TeambuildingStatus};
use tracing::instrument;

use super::{QueryPairs, push_opt};
use crate::api::{ApiError, ApiSession};

/// Optional filters for [`TeambuildingService::list`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TeambuildingFilter {
    pub status: Option<TeambuildingStatus>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl TeambuildingFilter {
    fn query(&self) -> QueryPairs {
        let mut query = QueryPairs::new();
        push_opt(&mut query, "status", self.status);
        push_opt(&mut query, "skip", self.skip);
        push_opt(&mut query, "limit", self.limit);
        query
    }
}

/// `/teambuildings/` resource.
#[derive(Debug, Clone, Copy)]
pub struct TeambuildingService<'a> {
    api: &'a ApiSession,
}

impl<'a> TeambuildingService<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiSession) -> Self {
        Self { api }
    }

    /// List teambuildings.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &TeambuildingFilter) -> Result<Vec<Teambuilding>, ApiError> {
        self.api.get("/teambuildings/", &filter.query()).await
    }

    /// List teambuildings with status `active`.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn active(&self) -> Result<Vec<Teambuilding>, ApiError> {
        self.api.get("/teambuildings/active/", &[]).await
    }

    /// Fetch one teambuilding.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn get(&self, id: TeambuildingId) -> Result<Teambuilding, ApiError> {
        self.api.get(&format!("/teambuildings/{id}/"), &[]).await
    }

    /// Create a teambuilding.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &TeambuildingInput) -> Result<Teambuilding, ApiError> {
        self.api.post("/teambuildings/", input).await
    }

    /// Replace a teambuilding's editable fields.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn update(
        &self,
        id: TeambuildingId,
        input: &TeambuildingInput,
    ) -> Result<Teambuilding, ApiError> {
        self.api.put(&format!("/teambuildings/{id}/"), input).await
    }

    /// Delete a teambuilding. The backend decides whether referenced
    /// programs may be deleted.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn delete(&self, id: TeambuildingId) -> Result<(), ApiError> {
        self.api.delete(&format!("/teambuildings/{id}/")).await
    }
}
