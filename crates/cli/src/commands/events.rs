//! `eventhub events ...`

use eventhub_admin::api::ApiSession;
use eventhub_admin::services::EventFilter;
use eventhub_core::{EventId, TeambuildingId};

use super::{CliError, print_deleted, print_json};

pub use eventhub_admin::services::events::DEFAULT_UPCOMING_LIMIT;

pub async fn list(api: &ApiSession, teambuilding: Option<TeambuildingId>) -> Result<(), CliError> {
    let events = match teambuilding {
        Some(id) => api.events().by_teambuilding(id).await?,
        None => api.events().list(&EventFilter::default()).await?,
    };
    tracing::info!(count = events.len(), "Listed events");
    print_json(&events)
}

pub async fn upcoming(api: &ApiSession, limit: u32) -> Result<(), CliError> {
    print_json(&api.events().upcoming(limit).await?)
}

pub async fn show(api: &ApiSession, id: EventId) -> Result<(), CliError> {
    print_json(&api.events().get(id).await?)
}

pub async fn availability(api: &ApiSession, id: EventId) -> Result<(), CliError> {
    print_json(&api.events().availability(id).await?)
}

pub async fn delete(api: &ApiSession, id: EventId) -> Result<(), CliError> {
    api.events().delete(id).await?;
    tracing::info!(%id, "Event deleted");
    print_deleted("event", id.as_i64())
}
