//! Resource services over the REST API.
//!
//! Each service is a stateless pass-through borrowing an [`ApiSession`]:
//! no retries, no caching and no validation beyond what the backend does.
//! Errors propagate unchanged as [`crate::api::ApiError`].
//!
//! # Services
//!
//! - `teambuildings` - Teambuilding programs
//! - `events` - Scheduled events and their availability
//! - `registrations` - Registrations and status changes
//! - `dashboard` - Aggregate statistics
//! - `upload` - Image upload (multipart)
//! - `profile` - The signed-in user's profile (`/auth/me`)

pub mod dashboard;
pub mod events;
pub mod profile;
pub mod registrations;
pub mod teambuildings;
pub mod upload;

pub use dashboard::DashboardService;
pub use events::{EventFilter, EventService};
pub use profile::ProfileService;
pub use registrations::{RegistrationFilter, RegistrationService};
pub use teambuildings::{TeambuildingFilter, TeambuildingService};
pub use upload::{ImageFile, UploadService};

use crate::api::ApiSession;

/// Query string pairs for a list endpoint.
type QueryPairs = Vec<(&'static str, String)>;

/// Append `key=value` when `value` is present.
fn push_opt(query: &mut QueryPairs, key: &'static str, value: Option<impl ToString>) {
    if let Some(value) = value {
        query.push((key, value.to_string()));
    }
}

impl ApiSession {
    /// Teambuilding endpoints.
    #[must_use]
    pub const fn teambuildings(&self) -> TeambuildingService<'_> {
        TeambuildingService::new(self)
    }

    /// Event endpoints.
    #[must_use]
    pub const fn events(&self) -> EventService<'_> {
        EventService::new(self)
    }

    /// Registration endpoints.
    #[must_use]
    pub const fn registrations(&self) -> RegistrationService<'_> {
        RegistrationService::new(self)
    }

    /// Dashboard endpoints.
    #[must_use]
    pub const fn dashboard(&self) -> DashboardService<'_> {
        DashboardService::new(self)
    }

    /// Upload endpoints.
    #[must_use]
    pub const fn upload(&self) -> UploadService<'_> {
        UploadService::new(self)
    }

    /// Profile endpoints.
    #[must_use]
    pub const fn profile(&self) -> ProfileService<'_> {
        ProfileService::new(self)
    }
}
