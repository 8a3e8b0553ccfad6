//! Authentication error types.

use thiserror::Error;

/// Errors that can occur while signing a user in or out.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider redirected back with an `error` parameter.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// No login was started in this session, or it went stale.
    #[error("no login in progress")]
    NoPendingLogin,

    /// The `state` parameter does not match the one issued.
    #[error("login state mismatch")]
    StateMismatch,

    /// The callback carried no authorization code.
    #[error("missing authorization code")]
    MissingCode,

    /// The token endpoint refused the code.
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// Transport failure talking to the provider.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A provider URL could not be built.
    #[error("invalid identity provider URL: {0}")]
    Url(#[from] url::ParseError),

    /// The session store failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AuthError {
    /// Short code carried to the login page as `?error=`.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Provider(_) => "denied",
            Self::NoPendingLogin | Self::StateMismatch => "invalid_state",
            Self::MissingCode => "missing_code",
            Self::TokenExchange(_) | Self::Http(_) | Self::Url(_) => "token_exchange",
            Self::Session(_) => "session",
        }
    }
}

/// Message shown on the login page for an `?error=` code.
#[must_use]
pub fn login_error_message(code: &str) -> &'static str {
    match code {
        "expired" => "Your session has expired. Please log in again.",
        "denied" => "Login was cancelled or denied by the identity provider.",
        "invalid_state" => "Login could not be verified. Please try again.",
        "missing_code" => "The identity provider did not return a login code.",
        "token_exchange" => "Could not complete login with the identity provider.",
        "session" => "Could not store your session. Please try again.",
        _ => "Login failed. Please try again.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_code_has_a_dedicated_message() {
        let errors = [
            AuthError::Provider("access_denied".to_string()),
            AuthError::StateMismatch,
            AuthError::MissingCode,
            AuthError::TokenExchange("invalid_grant".to_string()),
        ];
        for err in errors {
            assert_ne!(
                login_error_message(err.code()),
                login_error_message("unknown"),
                "{err}"
            );
        }
    }
}
