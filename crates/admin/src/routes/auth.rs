//! Authentication route handlers for admin.
//!
//! Login is delegated to the identity provider (authorization code + PKCE);
//! this module only starts the flow, finishes it and tears it down.

use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::auth::{
    AuthError, AuthSession, AuthState, PendingLogin, SessionUser, TokenGrant, clear_auth_session,
    login_error_message, set_auth_session, set_pending_login, take_pending_login,
};
use crate::error::clear_sentry_user;
use crate::filters;
use crate::state::AppState;

use super::render;

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// Query for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

/// Query the identity provider sends back to the callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page))
        .route("/login/start", get(login_start))
        .route("/auth/callback", get(callback))
        .route("/auth/expired", get(expired))
        .route("/logout", post(logout))
}

/// Render the login page.
///
/// GET /login
#[instrument(skip(session))]
async fn login_page(session: Session, Query(query): Query<LoginQuery>) -> Response {
    if AuthState::load(&session, chrono::Utc::now().timestamp())
        .await
        .is_authenticated()
    {
        return Redirect::to("/dashboard").into_response();
    }

    let template = LoginTemplate {
        error: query
            .error
            .as_deref()
            .map(|code| login_error_message(code).to_string()),
    };
    render(&template).into_response()
}

/// Start a login and redirect to the identity provider.
///
/// GET /login/start
#[instrument(skip(state, session))]
async fn login_start(State(state): State<AppState>, session: Session) -> Redirect {
    let pending = PendingLogin::generate(chrono::Utc::now().timestamp());

    let result = async {
        set_pending_login(&session, &pending).await?;
        state.identity().authorize_url(&pending)
    }
    .await;

    match result {
        Ok(url) => Redirect::to(url.as_str()),
        Err(e) => login_failed(&e),
    }
}

/// Finish a login: verify state, exchange the code, store the session.
///
/// GET /auth/callback
#[instrument(skip(state, session, query))]
async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Redirect {
    match complete_login(&state, &session, query).await {
        Ok(user) => {
            tracing::info!(email = %user.email, "Admin signed in");
            Redirect::to("/dashboard")
        }
        Err(e) => login_failed(&e),
    }
}

async fn complete_login(
    state: &AppState,
    session: &Session,
    query: CallbackQuery,
) -> Result<SessionUser, AuthError> {
    let now = chrono::Utc::now().timestamp();
    let pending = take_pending_login(session).await?;

    if let Some(error) = query.error {
        return Err(AuthError::Provider(
            query.error_description.unwrap_or(error),
        ));
    }

    let pending = pending
        .filter(|p| !p.is_stale(now))
        .ok_or(AuthError::NoPendingLogin)?;
    if query.state.as_deref() != Some(pending.state.as_str()) {
        return Err(AuthError::StateMismatch);
    }
    let code = query.code.ok_or(AuthError::MissingCode)?;

    let grant = state.identity().exchange_code(&code, &pending, now).await?;
    let user = display_user(state, &grant).await?;

    set_auth_session(session, &AuthSession::new(&grant, user.clone())).await?;
    Ok(user)
}

/// Who to show in the layout: the backend profile, else the provider's
/// `/userinfo` claims.
async fn display_user(state: &AppState, grant: &TokenGrant) -> Result<SessionUser, AuthError> {
    let api = state.api().session(Some(grant.access_token.clone()));
    match api.profile().me().await {
        Ok(profile) => Ok(SessionUser::from(&profile)),
        Err(e) => {
            tracing::warn!(error = %e, "Profile unavailable, using identity claims");
            state
                .identity()
                .user_info(grant.access_token.expose())
                .await
        }
    }
}

fn login_failed(error: &AuthError) -> Redirect {
    tracing::warn!(error = %error, "Login failed");
    Redirect::to(&format!("/login?error={}", error.code()))
}

/// Clear a session whose token the backend rejected.
///
/// GET /auth/expired
#[instrument(skip(session))]
async fn expired(session: Session) -> Redirect {
    if let Err(e) = clear_auth_session(&session).await {
        tracing::error!(error = %e, "Failed to clear expired session");
    }
    clear_sentry_user();
    Redirect::to("/login?error=expired")
}

/// Logout and clear session.
///
/// POST /logout
#[instrument(skip(state, session))]
async fn logout(State(state): State<AppState>, session: Session) -> Redirect {
    if let Err(e) = clear_auth_session(&session).await {
        tracing::error!(error = %e, "Failed to clear session on logout");
    }
    clear_sentry_user();

    let return_to = format!("{}/login", state.config().base_url);
    match state.identity().logout_url(&return_to) {
        Ok(url) => Redirect::to(url.as_str()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build provider logout URL");
            Redirect::to("/login")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_page_shows_mapped_error() {
        let template = LoginTemplate {
            error: Some(login_error_message("expired").to_string()),
        };
        let html = template.render().unwrap_or_default();
        assert!(html.contains("Your session has expired"));
    }
}
