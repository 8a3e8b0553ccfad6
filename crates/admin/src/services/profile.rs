//! The signed-in user's profile.

use eventhub_core::{ProfileUpdate, UserProfile};
use tracing::instrument;

use crate::api::{ApiError, ApiSession};

/// `/auth/me` resource.
#[derive(Debug, Clone, Copy)]
pub struct ProfileService<'a> {
    api: &'a ApiSession,
}

impl<'a> ProfileService<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiSession) -> Self {
        Self { api }
    }

    /// Profile of the token's owner. The backend creates it on first use.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.api.get("/auth/me", &[]).await
    }

    /// Update name, phone or avatar.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn update(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        self.api.put("/auth/me", update).await
    }
}
