//! Dashboard statistics.

use eventhub_core::DashboardStats;
use tracing::instrument;

use crate::api::{ApiError, ApiSession};

/// `/dashboard/` resource.
#[derive(Debug, Clone, Copy)]
pub struct DashboardService<'a> {
    api: &'a ApiSession,
}

impl<'a> DashboardService<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiSession) -> Self {
        Self { api }
    }

    /// Aggregate counters and recent registrations.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`].
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<DashboardStats, ApiError> {
        self.api.get("/dashboard/stats", &[]).await
    }
}
