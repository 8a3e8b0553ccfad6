//! Authentication extractors for admin.
//!
//! Protected handlers take [`RequireSession`]; it resolves the session's
//! [`AuthState`] and only lets `Authenticated` through.

use askama::Template;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::auth::{AuthSession, AuthState};

/// "Signing you in" page shown while a login is in flight.
#[derive(Template)]
#[template(path = "auth/loading.html")]
pub struct LoadingTemplate {
    pub return_to: String,
}

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireSession(auth): RequireSession,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", auth.user.name)
/// }
/// ```
pub struct RequireSession(pub AuthSession);

/// Why a protected page was not rendered.
pub enum SessionRejection {
    /// No valid token; go to the login page.
    RedirectToLogin,
    /// A login is in flight; show the loading page for `path`.
    Loading(String),
    /// The session layer is missing from the stack.
    Unavailable,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Loading(return_to) => {
                let template = LoadingTemplate { return_to };
                Html(template.render().unwrap_or_else(|e| {
                    tracing::error!("Template render error: {}", e);
                    "Signing you in...".to_string()
                }))
                .into_response()
            }
            Self::Unavailable => {
                tracing::error!("Session layer missing from the middleware stack");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(SessionRejection::Unavailable)?;

        match AuthState::load(session, chrono::Utc::now().timestamp()).await {
            AuthState::Authenticated(auth) => {
                crate::error::set_sentry_user(&auth.user.email);
                Ok(Self(auth))
            }
            AuthState::Loading => Err(SessionRejection::Loading(parts.uri.path().to_string())),
            AuthState::Unauthenticated => Err(SessionRejection::RedirectToLogin),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_redirects_to_login() {
        let response = SessionRejection::RedirectToLogin.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/login");
    }

    #[test]
    fn loading_renders_a_page() {
        let response = SessionRejection::Loading("/events".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
