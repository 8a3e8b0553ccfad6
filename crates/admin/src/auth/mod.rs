//! Authentication bridge to the identity provider.
//!
//! The admin panel never handles passwords. Login is an OAuth2
//! authorization-code flow with PKCE against an `OpenID` Connect provider;
//! the resulting bearer token is kept in the server-side session and handed
//! to the REST API on every call.
//!
//! ```text
//!                 /login/start                 /auth/callback (ok)
//! Unauthenticated ------------> Loading ---------------------------> Authenticated
//!        ^                         |                                      |
//!        |   provider error,       |                                      |
//!        +-- state mismatch, ------+                                      |
//!        |   exchange failure                                             |
//!        +------------ logout, 401 from the API, token expiry -----------+
//! ```

pub mod error;
pub mod provider;
pub mod session;

pub use error::{AuthError, login_error_message};
pub use provider::{IdentityProvider, PendingLogin, TokenGrant};
pub use session::{
    AuthSession, AuthState, SessionUser, clear_auth_session, keys, set_auth_session,
    set_pending_login, take_pending_login,
};
