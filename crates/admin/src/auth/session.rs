//! Session-stored authentication state.

use eventhub_core::UserProfile;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::provider::{PendingLogin, TokenGrant};
use crate::api::AccessToken;

/// Session keys for authentication data.
pub mod keys {
    /// Key for the signed-in user's [`super::AuthSession`].
    pub const AUTH_SESSION: &str = "auth_session";

    /// Key for the in-flight [`super::PendingLogin`].
    pub const PENDING_LOGIN: &str = "pending_login";
}

/// Identity shown in the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub name: String,
    pub email: String,
}

impl From<&UserProfile> for SessionUser {
    fn from(profile: &UserProfile) -> Self {
        Self {
            name: profile.display_name().to_string(),
            email: profile.email.clone(),
        }
    }
}

/// A signed-in user: bearer token, its expiry, and who it belongs to.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthSession {
    access_token: String,
    /// Unix timestamp after which the token is treated as expired.
    pub expires_at: i64,
    pub user: SessionUser,
}

impl AuthSession {
    /// Build a session from a token grant.
    #[must_use]
    pub fn new(grant: &TokenGrant, user: SessionUser) -> Self {
        Self {
            access_token: grant.access_token.expose().to_string(),
            expires_at: grant.expires_at,
            user,
        }
    }

    /// Token to present to the REST API.
    #[must_use]
    pub fn access_token(&self) -> AccessToken {
        AccessToken::new(self.access_token.clone())
    }

    /// Whether the token is past its expiry at `now`.
    #[must_use]
    pub const fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// Where the current browser session stands in the login flow.
#[derive(Debug, Clone)]
pub enum AuthState {
    /// A login was started and the provider has not called back yet.
    Loading,
    /// A valid token is held.
    Authenticated(AuthSession),
    /// No token, or the token expired.
    Unauthenticated,
}

impl AuthState {
    /// Derive the state from what the session holds at `now`.
    ///
    /// An expired token counts as unauthenticated even if a login is
    /// pending; a stale pending login is ignored.
    #[must_use]
    pub fn resolve(auth: Option<AuthSession>, pending: Option<&PendingLogin>, now: i64) -> Self {
        match auth {
            Some(auth) if !auth.is_expired_at(now) => Self::Authenticated(auth),
            Some(_) => Self::Unauthenticated,
            None if pending.is_some_and(|p| !p.is_stale(now)) => Self::Loading,
            None => Self::Unauthenticated,
        }
    }

    /// Load the state from the session store.
    ///
    /// Store failures are treated as "no data" so a broken store degrades to
    /// the login page rather than an error page.
    pub async fn load(session: &Session, now: i64) -> Self {
        let auth: Option<AuthSession> = session
            .get(keys::AUTH_SESSION)
            .await
            .ok()
            .flatten();
        let pending: Option<PendingLogin> = session
            .get(keys::PENDING_LOGIN)
            .await
            .ok()
            .flatten();

        if auth.as_ref().is_some_and(|a| a.is_expired_at(now)) {
            tracing::info!("Access token expired, clearing session");
            if let Err(e) = session.remove_value(keys::AUTH_SESSION).await {
                tracing::error!(error = %e, "Failed to remove expired auth session");
            }
        }

        Self::resolve(auth, pending.as_ref(), now)
    }

    /// Whether protected content may be rendered.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Store a pending login.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_pending_login(
    session: &Session,
    pending: &PendingLogin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::PENDING_LOGIN, pending).await
}

/// Remove and return the pending login (one-time use).
///
/// # Errors
///
/// Returns an error if the session cannot be read or modified.
pub async fn take_pending_login(
    session: &Session,
) -> Result<Option<PendingLogin>, tower_sessions::session::Error> {
    session.remove(keys::PENDING_LOGIN).await
}

/// Persist a completed login, rotating the session id.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_auth_session(
    session: &Session,
    auth: &AuthSession,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::AUTH_SESSION, auth).await
}

/// Drop everything in the session (logout, expired token).
///
/// # Errors
///
/// Returns an error if the session cannot be flushed.
pub async fn clear_auth_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
