//! HTTP client wrapper for the EventHub REST API.
//!
//! [`ApiClient`] owns one configured `reqwest::Client` (base URL, fixed
//! timeout). Requests are issued through an [`ApiSession`], which binds the
//! caller's bearer token explicitly instead of reading it from shared storage.
//!
//! Every response is classified into [`ApiError`] before it reaches a page:
//! 401 becomes `SessionExpired`, 403 `Forbidden`, other non-2xx `Rejected`
//! with the backend's `detail`, and a missing response `Network`.

mod error;

pub use error::{ApiError, NETWORK_ERROR_DETAIL};

use std::sync::Arc;

use eventhub_core::UploadedImage;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use tracing::instrument;
use url::Url;

use crate::config::ApiConfig;

/// Bearer token presented to the REST API.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Shared REST API client.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    asset_base_url: String,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Build` if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Build)?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                asset_base_url: config.asset_base_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Bind a session token. `None` sends requests unauthenticated.
    #[must_use]
    pub fn session(&self, token: Option<AccessToken>) -> ApiSession {
        ApiSession {
            client: self.clone(),
            token,
        }
    }

    /// Base URL every resource path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Absolute URL for an uploaded asset path.
    #[must_use]
    pub fn asset_url(&self, path: &str) -> String {
        UploadedImage::resolve(path, &self.inner.asset_base_url)
    }

    /// Liveness probe against the backend root.
    ///
    /// Any HTTP response counts as reachable.
    pub async fn ping(&self) -> bool {
        self.inner
            .client
            .get(&self.inner.base_url)
            .send()
            .await
            .is_ok()
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

/// An [`ApiClient`] bound to one caller's token.
#[derive(Clone, Debug)]
pub struct ApiSession {
    client: ApiClient,
    token: Option<AccessToken>,
}

impl ApiSession {
    /// Whether requests carry a bearer token.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The underlying client.
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Build the absolute URL for `path` with `query` appended.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Url` if the result is not a valid URL.
    pub fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}{path}", self.client.inner.base_url))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Issue a request and decode the JSON response into `T`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`] for transport failures, non-2xx
    /// responses and bodies that do not decode into `T`.
    #[instrument(skip(self, body, query), fields(method = %method))]
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        query: &[(&str, String)],
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let url = self.url(path, query)?;
        let mut builder = self.client.inner.client.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = self.send(builder).await?;
        Self::handle_response(response).await
    }

    /// Execute a GET request.
    ///
    /// # Errors
    ///
    /// See [`ApiSession::request`].
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.request::<T, ()>(Method::GET, path, None, query).await
    }

    /// Execute a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiSession::request`].
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(Method::POST, path, Some(body), &[]).await
    }

    /// Execute a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiSession::request`].
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(Method::PUT, path, Some(body), &[]).await
    }

    /// Execute a DELETE request. Any 2xx (usually 204) is success.
    ///
    /// # Errors
    ///
    /// See [`ApiSession::request`].
    #[instrument(skip(self))]
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path, &[])?;
        let response = self.send(self.client.inner.client.delete(url)).await?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(Self::parse_error(response).await)
    }

    /// POST a multipart form and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`ApiSession::request`].
    #[instrument(skip(self, form))]
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let url = self.url(path, &[])?;
        let builder = self.client.inner.client.post(url).multipart(form);
        let response = self.send(builder).await?;
        Self::handle_response(response).await
    }

    /// Attach the bearer token (if any) and send.
    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let builder = match &self.token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        };

        builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "API request failed without a response");
            ApiError::Network(e)
        })
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        if !response.status().is_success() {
            return Err(Self::parse_error(response).await);
        }

        let bytes = response.bytes().await.map_err(ApiError::Network)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!(error = %e, "API response did not match the expected shape");
            ApiError::Decode(e.to_string())
        })
    }

    /// Parse error response from the API.
    async fn parse_error(response: Response) -> ApiError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_status(status, &body);
        tracing::info!(status, error = %error, "API request rejected");
        error
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(&ApiConfig::new("http://localhost/api/").unwrap()).unwrap()
    }

    #[test]
    fn urls_keep_the_base_path() {
        let session = client().session(None);
        let url = session.url("/teambuildings/", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost/api/teambuildings/");
    }

    #[test]
    fn query_parameters_are_encoded() {
        let session = client().session(None);
        let url = session
            .url(
                "/events/",
                &[("status", "open".to_string()), ("q", "team & co".to_string())],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost/api/events/?status=open&q=team+%26+co"
        );
    }

    #[test]
    fn session_reports_token_presence() {
        let client = client();
        assert!(!client.session(None).is_authenticated());
        assert!(
            client
                .session(Some(AccessToken::new("tok")))
                .is_authenticated()
        );
    }

    #[test]
    fn token_debug_is_redacted() {
        let session = client().session(Some(AccessToken::new("very-secret-token")));
        let debug_output = format!("{session:?}");
        assert!(!debug_output.contains("very-secret-token"));
        assert!(debug_output.contains("[REDACTED]"));
    }

    #[test]
    fn asset_urls_resolve_against_the_api_origin() {
        assert_eq!(
            client().asset_url("/uploads/team.jpg"),
            "http://localhost/uploads/team.jpg"
        );
    }
}
