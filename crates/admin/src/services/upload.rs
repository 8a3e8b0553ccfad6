//! Image upload.

use eventhub_core::UploadedImage;
use reqwest::multipart::{Form, Part};
use tracing::instrument;

use crate::api::{ApiError, ApiSession};

/// A file picked for upload.
#[derive(Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Build a file, guessing the content type from the extension when the
    /// caller has none.
    #[must_use]
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream")
            .or_else(|| guess_content_type(&file_name).map(str::to_string));
        Self {
            file_name,
            content_type,
            bytes,
        }
    }
}

impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn guess_content_type(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// `/upload/` resource.
#[derive(Debug, Clone, Copy)]
pub struct UploadService<'a> {
    api: &'a ApiSession,
}

impl<'a> UploadService<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiSession) -> Self {
        Self { api }
    }

    /// Upload an image as the multipart field `file`.
    ///
    /// The backend enforces type and size limits.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`ApiError`]; an unparseable content type
    /// is `ApiError::Build`.
    #[instrument(skip(self))]
    pub async fn upload_image(&self, file: ImageFile) -> Result<UploadedImage, ApiError> {
        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(content_type) = file.content_type {
            part = part.mime_str(&content_type).map_err(ApiError::Build)?;
        }
        let form = Form::new().part("file", part);
        self.api.post_multipart("/upload/image", form).await
    }
}
