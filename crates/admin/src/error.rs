//! Unified error handling for admin.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::api::ApiError;
use crate::auth::AuthError;

/// Where a rejected token sends the browser: the session is cleared there.
pub const SESSION_EXPIRED_PATH: &str = "/auth/expired";

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// The backend rejected the bearer token.
    #[error("Your session has expired")]
    SessionExpired,

    /// Authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// Any other API failure.
    #[error(transparent)]
    Api(ApiError),

    /// Resource not found.
    #[error("Not found")]
    NotFound,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::SessionExpired => Self::SessionExpired,
            ApiError::Forbidden { detail } => Self::Forbidden(detail),
            ApiError::Rejected { status: 404, .. } => Self::NotFound,
            other => Self::Api(other),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Session(e) => Self::Session(e),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl AppError {
    /// HTTP status for the error page.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::SessionExpired => StatusCode::SEE_OTHER,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Api(ApiError::Network(_) | ApiError::Rejected { .. } | ApiError::Decode(_)) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Api(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether the error is ours rather than the user's or the backend's.
    const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Session(_)
                | Self::Internal(_)
                | Self::Api(ApiError::Decode(_) | ApiError::Url(_) | ApiError::Build(_))
        )
    }

    /// Message safe to show on the error page.
    fn public_message(&self) -> String {
        match self {
            Self::Session(_) | Self::Internal(_) => "Something went wrong. Please try again.".to_string(),
            Self::Api(err) if self.is_internal() => {
                tracing::debug!(error = %err, "Hiding internal API error from the page");
                "Something went wrong. Please try again.".to_string()
            }
            Self::Api(err) => err.detail(),
            _ => self.to_string(),
        }
    }
}

/// Standalone error page (rendered without the sidebar).
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub title: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::SessionExpired) {
            return Redirect::to(SESSION_EXPIRED_PATH).into_response();
        }

        if self.is_internal() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = self.status();
        let template = ErrorTemplate {
            status: status.as_u16(),
            title: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            message: self.public_message(),
        };

        let body = template.render().unwrap_or_else(|e| {
            tracing::error!("Template render error: {}", e);
            "Internal Server Error".to_string()
        });

        (status, Html(body)).into_response()
    }
}

/// Turn an API failure into a message for the current page.
///
/// Everything except an expired session stays on the page; that one is
/// escalated so the handler can bail out with `?`.
///
/// # Errors
///
/// Returns `AppError::SessionExpired` when the backend rejected the token.
pub fn page_message(err: ApiError) -> Result<String, AppError> {
    if err.is_session_expired() {
        return Err(AppError::SessionExpired);
    }
    if matches!(err, ApiError::Decode(_) | ApiError::Url(_) | ApiError::Build(_)) {
        tracing::error!(error = %err, "API call failed");
    }
    Ok(err.detail())
}

/// Set the Sentry user context for the signed-in user.
pub fn set_sentry_user(email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: (!email.is_empty()).then(|| email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_app_errors() {
        assert!(matches!(
            AppError::from(ApiError::SessionExpired),
            AppError::SessionExpired
        ));
        assert!(matches!(
            AppError::from(ApiError::from_status(403, r#"{"detail":"Admins only"}"#)),
            AppError::Forbidden(ref d) if d == "Admins only"
        ));
        assert!(matches!(
            AppError::from(ApiError::from_status(404, "")),
            AppError::NotFound
        ));
        assert!(matches!(
            AppError::from(ApiError::from_status(409, r#"{"detail":"In use"}"#)),
            AppError::Api(_)
        ));
    }

    #[test]
    fn session_expired_redirects() {
        let response = AppError::SessionExpired.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], SESSION_EXPIRED_PATH);
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::Forbidden("nope".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(get_status(AppError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::from(ApiError::from_status(500, "boom"))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn page_message_keeps_backend_detail() {
        let message =
            page_message(ApiError::from_status(400, r#"{"detail":"Event is full"}"#)).unwrap();
        assert_eq!(message, "Event is full");
    }

    #[test]
    fn page_message_escalates_expired_sessions() {
        assert!(matches!(
            page_message(ApiError::SessionExpired),
            Err(AppError::SessionExpired)
        ));
    }
}
