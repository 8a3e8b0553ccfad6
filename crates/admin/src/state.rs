//! Application state shared across handlers.

use std::sync::Arc;

use crate::{
    api::{ApiClient, ApiError, ApiSession},
    auth::{AuthError, AuthSession, IdentityProvider},
    config::AdminConfig,
};

/// Errors building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("API client: {0}")]
    Api(#[from] ApiError),

    #[error("identity provider: {0}")]
    Identity(#[from] AuthError),
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    api: ApiClient,
    identity: IdentityProvider,
}

impl AppState {
    /// Build the shared clients from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client fails to build.
    pub fn new(config: AdminConfig) -> Result<Self, StateError> {
        let api = ApiClient::new(&config.api)?;
        let identity = IdentityProvider::new(&config.identity, config.redirect_uri())?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                identity,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityProvider {
        &self.inner.identity
    }

    /// API session carrying the signed-in user's token.
    #[must_use]
    pub fn api_for(&self, auth: &AuthSession) -> ApiSession {
        self.inner.api.session(Some(auth.access_token()))
    }
}
