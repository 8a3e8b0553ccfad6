//! Uploaded media.

use serde::{Deserialize, Serialize};

/// Response of `/upload/image`.
///
/// `url` is usually a path relative to the asset host (`/uploads/abc.jpg`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl UploadedImage {
    /// Resolve `url` against `asset_base`. Absolute URLs are returned as-is.
    #[must_use]
    pub fn resolve(url: &str, asset_base: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_owned();
        }
        format!(
            "{}/{}",
            asset_base.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_paths() {
        assert_eq!(
            UploadedImage::resolve("/uploads/a.jpg", "http://localhost/"),
            "http://localhost/uploads/a.jpg"
        );
        assert_eq!(
            UploadedImage::resolve("uploads/a.jpg", "http://localhost"),
            "http://localhost/uploads/a.jpg"
        );
    }

    #[test]
    fn keeps_absolute_urls() {
        assert_eq!(
            UploadedImage::resolve("https://cdn.example.com/a.jpg", "http://localhost"),
            "https://cdn.example.com/a.jpg"
        );
    }
}
