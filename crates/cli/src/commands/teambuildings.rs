//! `eventhub teambuildings ...`

use eventhub_admin::api::ApiSession;
use eventhub_admin::services::TeambuildingFilter;
use eventhub_core::{TeambuildingId, TeambuildingStatus};

use super::{CliError, print_deleted, print_json};

pub async fn list(api: &ApiSession, status: Option<TeambuildingStatus>) -> Result<(), CliError> {
    let filter = TeambuildingFilter {
        status,
        ..TeambuildingFilter::default()
    };
    let teambuildings = api.teambuildings().list(&filter).await?;
    tracing::info!(count = teambuildings.len(), "Listed teambuildings");
    print_json(&teambuildings)
}

pub async fn active(api: &ApiSession) -> Result<(), CliError> {
    print_json(&api.teambuildings().active().await?)
}

pub async fn show(api: &ApiSession, id: TeambuildingId) -> Result<(), CliError> {
    print_json(&api.teambuildings().get(id).await?)
}

/// Delete a teambuilding. The backend refuses while events still reference it.
pub async fn delete(api: &ApiSession, id: TeambuildingId) -> Result<(), CliError> {
    api.teambuildings().delete(id).await?;
    tracing::info!(%id, "Teambuilding deleted");
    print_deleted("teambuilding", id.as_i64())
}
