//! Command implementations.
//!
//! # Environment Variables
//!
//! - `EVENTHUB_API_URL` - Base URL of the REST API
//! - `EVENTHUB_API_TOKEN` - Bearer token presented on every request
//! - `EVENTHUB_API_TIMEOUT_SECS` - Request timeout (default 10)

pub mod account;
pub mod events;
pub mod registrations;
pub mod teambuildings;

use std::io::Write;

use eventhub_admin::api::{AccessToken, ApiClient, ApiError, ApiSession};
use eventhub_admin::config::{ApiConfig, ConfigError};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Invalid API configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The backend answered 401 to the configured token.
    #[error("API token rejected")]
    TokenRejected,

    /// Any other API failure, with the backend's detail.
    #[error("{0}")]
    Api(ApiError),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        if err.is_session_expired() {
            Self::TokenRejected
        } else {
            Self::Api(err)
        }
    }
}

/// Build an authenticated API session from the environment.
///
/// # Errors
///
/// Returns `CliError::MissingEnvVar` when no token is set and
/// `CliError::Config` for an invalid API URL or timeout.
pub fn connect() -> Result<ApiSession, CliError> {
    let config = ApiConfig::from_lookup(|key| std::env::var(key).ok())?;
    let token = std::env::var("EVENTHUB_API_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty())
        .ok_or(CliError::MissingEnvVar("EVENTHUB_API_TOKEN"))?;

    let client = ApiClient::new(&config)?;
    tracing::debug!(base_url = client.base_url(), "Connected to EventHub API");
    Ok(client.session(Some(AccessToken::new(token))))
}

/// Write `value` to stdout as pretty JSON.
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Confirmation printed after a delete.
#[derive(Debug, Serialize)]
struct Deleted<'a> {
    resource: &'a str,
    id: i64,
    deleted: bool,
}

fn print_deleted(resource: &str, id: i64) -> Result<(), CliError> {
    print_json(&Deleted {
        resource,
        id,
        deleted: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_token_rejected() {
        assert!(matches!(
            CliError::from(ApiError::SessionExpired),
            CliError::TokenRejected
        ));
    }

    #[test]
    fn other_api_errors_keep_their_detail() {
        let err = CliError::from(ApiError::Rejected {
            status: 400,
            detail: "Cannot delete teambuilding with existing events".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Cannot delete teambuilding with existing events"
        );
    }

    #[test]
    fn forbidden_is_not_token_rejection() {
        let err = CliError::from(ApiError::Forbidden {
            detail: "Admins only".to_string(),
        });
        assert!(matches!(err, CliError::Api(_)));
    }
}
