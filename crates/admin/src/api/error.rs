//! REST API error taxonomy.

use serde::Deserialize;
use thiserror::Error;

/// Message shown when no response was received at all.
pub const NETWORK_ERROR_DETAIL: &str = "Network error. Please check your connection.";

/// Message shown for 403 responses without a `detail`.
const FORBIDDEN_DETAIL: &str = "Access forbidden";

/// Errors returned by [`super::ApiSession`] calls.
///
/// The data layer never navigates: the router turns
/// [`ApiError::SessionExpired`] into a logout + redirect to the login page.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected the bearer token (401).
    #[error("session expired")]
    SessionExpired,

    /// Authenticated but not allowed (403). The session stays valid.
    #[error("{detail}")]
    Forbidden { detail: String },

    /// Any other non-2xx response, with the backend's `detail` verbatim.
    #[error("{detail}")]
    Rejected { status: u16, detail: String },

    /// No response received (connect failure, timeout, dropped body).
    #[error("Network error. Please check your connection.")]
    Network(#[source] reqwest::Error),

    /// 2xx response whose body does not match the expected record.
    #[error("unexpected response from server: {0}")]
    Decode(String),

    /// A request URL could not be built from the configured base.
    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    /// The HTTP client or a request part could not be built.
    #[error("failed to build request: {0}")]
    Build(#[source] reqwest::Error),
}

impl ApiError {
    /// User-facing message for this error.
    #[must_use]
    pub fn detail(&self) -> String {
        self.to_string()
    }

    /// HTTP status returned by the backend, when there was one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::SessionExpired => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the caller must invalidate the session and re-authenticate.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// Classify a non-2xx response from its status and raw body.
    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => Self::SessionExpired,
            403 => Self::Forbidden {
                detail: extract_detail(body).unwrap_or_else(|| FORBIDDEN_DETAIL.to_string()),
            },
            _ => Self::Rejected {
                status,
                detail: extract_detail(body).unwrap_or_else(|| fallback_detail(status, body)),
            },
        }
    }
}

/// The backend's `{ "detail": ... }` error payload.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Pull `detail` out of an error body.
///
/// Validation errors carry a list instead of a string; those are joined
/// from their `msg` fields.
fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .map(|item| {
                    item.get("msg")
                        .and_then(serde_json::Value::as_str)
                        .map_or_else(|| item.to_string(), str::to_string)
                })
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn fallback_detail(status: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .map_or_else(|| format!("HTTP {status}"), str::to_string)
    } else {
        body.to_string()
    }
}
