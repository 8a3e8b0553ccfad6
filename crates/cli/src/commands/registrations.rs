//! `eventhub registrations ...`

use eventhub_admin::api::ApiSession;
use eventhub_admin::services::RegistrationFilter;
use eventhub_core::{EventId, RegistrationId, RegistrationStatus};

use super::{CliError, print_deleted, print_json};

/// List registrations. An event filter takes precedence over a status
/// filter; clap already rejects passing both.
pub async fn list(
    api: &ApiSession,
    event: Option<EventId>,
    status: Option<RegistrationStatus>,
) -> Result<(), CliError> {
    let service = api.registrations();
    let registrations = match (event, status) {
        (Some(id), _) => service.by_event(id).await?,
        (None, Some(status)) => service.by_status(status).await?,
        (None, None) => service.list(&RegistrationFilter::default()).await?,
    };
    tracing::info!(count = registrations.len(), "Listed registrations");
    print_json(&registrations)
}

pub async fn mine(api: &ApiSession) -> Result<(), CliError> {
    print_json(&api.registrations().mine().await?)
}

pub async fn set_status(
    api: &ApiSession,
    id: RegistrationId,
    status: RegistrationStatus,
) -> Result<(), CliError> {
    let registration = api.registrations().update_status(id, status).await?;
    tracing::info!(%id, %status, "Registration status updated");
    print_json(&registration)
}

pub async fn delete(api: &ApiSession, id: RegistrationId) -> Result<(), CliError> {
    api.registrations().delete(id).await?;
    print_deleted("registration", id.as_i64())
}
