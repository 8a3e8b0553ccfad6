//! Session middleware configuration for admin.
//!
//! Sessions live in process memory: they hold only the login handshake and
//! the bearer token, and a restart simply sends everyone back to `/login`.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "eventhub_admin_session";

/// Session expiry time in seconds (8 hours of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 8 * 60 * 60;

/// Create the session layer with an in-memory store.
///
/// `SameSite=Lax` is required: the identity provider's callback is a
/// cross-site top-level redirect that must carry the cookie.
#[must_use]
pub fn create_session_layer(config: &AdminConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
