//! Dashboard, upload and identity commands.

use std::path::Path;

use eventhub_admin::api::ApiSession;
use eventhub_admin::services::ImageFile;
use serde::Serialize;

use super::{CliError, print_json};

pub async fn dashboard(api: &ApiSession) -> Result<(), CliError> {
    print_json(&api.dashboard().stats().await?)
}

/// Upload result with the URL resolved against the asset host.
#[derive(Debug, Serialize)]
struct Uploaded {
    url: String,
    absolute_url: String,
}

/// Upload an image. Type and size limits are the backend's call.
pub async fn upload(api: &ApiSession, path: &Path) -> Result<(), CliError> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());

    tracing::info!(file = %file_name, size = bytes.len(), "Uploading image");
    let image = api
        .upload()
        .upload_image(ImageFile::new(file_name, None, bytes))
        .await?;

    print_json(&Uploaded {
        absolute_url: api.client().asset_url(&image.url),
        url: image.url,
    })
}

pub async fn whoami(api: &ApiSession) -> Result<(), CliError> {
    print_json(&api.profile().me().await?)
}
