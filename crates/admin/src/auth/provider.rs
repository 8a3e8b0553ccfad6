//! OAuth2 / `OpenID` Connect client for the identity provider.
//!
//! Endpoints follow the Auth0 layout: `/authorize`, `/oauth/token`,
//! `/userinfo` and `/v2/logout` under the issuer URL.

use std::sync::Arc;
use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::instrument;
use url::Url;

use super::AuthError;
use super::session::SessionUser;
use crate::api::AccessToken;
use crate::config::IdentityConfig;

/// A login left unfinished for this long is treated as abandoned.
const PENDING_LOGIN_TTL_SECS: i64 = 10 * 60;

/// Token lifetime assumed when the provider omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// Timeout for calls to the identity provider.
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-login secrets stored in the session between `/login/start` and the
/// callback.
#[derive(Clone, Serialize, Deserialize)]
pub struct PendingLogin {
    /// CSRF `state` echoed back by the provider.
    pub state: String,
    code_verifier: String,
    /// Unix timestamp when the login started.
    pub created_at: i64,
}

impl PendingLogin {
    /// Generate a fresh `state` and PKCE verifier.
    #[must_use]
    pub fn generate(now: i64) -> Self {
        Self {
            state: random_token(),
            code_verifier: random_token(),
            created_at: now,
        }
    }

    /// S256 PKCE challenge for the stored verifier.
    #[must_use]
    pub fn code_challenge(&self) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(self.code_verifier.as_bytes()))
    }

    /// Whether the login has been pending for too long.
    #[must_use]
    pub const fn is_stale(&self, now: i64) -> bool {
        now - self.created_at > PENDING_LOGIN_TTL_SECS
    }
}

impl std::fmt::Debug for PendingLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingLogin")
            .field("state", &self.state)
            .field("code_verifier", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// 32 random bytes, base64url without padding (43 characters).
fn random_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Access token obtained from the token endpoint.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: AccessToken,
    /// Unix timestamp after which the token must not be used.
    pub expires_at: i64,
}

/// Response from the token endpoint.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Error response from the token endpoint.
#[derive(Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Claims returned by `/userinfo`.
#[derive(Deserialize)]
struct UserInfo {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    nickname: Option<String>,
    sub: String,
}

/// Client for the identity provider.
#[derive(Clone)]
pub struct IdentityProvider {
    inner: Arc<IdentityProviderInner>,
}

struct IdentityProviderInner {
    client: reqwest::Client,
    issuer: String,
    client_id: String,
    client_secret: SecretString,
    audience: String,
    scope: String,
    redirect_uri: String,
}

impl IdentityProvider {
    /// Create a provider client.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Http` if the HTTP client fails to build.
    pub fn new(config: &IdentityConfig, redirect_uri: impl Into<String>) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(IdentityProviderInner {
                client,
                issuer: config.issuer.trim_end_matches('/').to_string(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                audience: config.audience.clone(),
                scope: config.scope.clone(),
                redirect_uri: redirect_uri.into(),
            }),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        Ok(Url::parse(&format!("{}{path}", self.inner.issuer))?)
    }

    /// Authorization URL the browser is sent to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Url` if the issuer is not a valid URL.
    pub fn authorize_url(&self, pending: &PendingLogin) -> Result<Url, AuthError> {
        let mut url = self.endpoint("/authorize")?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.inner.client_id)
            .append_pair("redirect_uri", &self.inner.redirect_uri)
            .append_pair("audience", &self.inner.audience)
            .append_pair("scope", &self.inner.scope)
            .append_pair("state", &pending.state)
            .append_pair("code_challenge", &pending.code_challenge())
            .append_pair("code_challenge_method", "S256");
        Ok(url)
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExchange` if the provider refuses the code,
    /// or `AuthError::Http` on transport failure.
    #[instrument(skip(self, code, pending))]
    pub async fn exchange_code(
        &self,
        code: &str,
        pending: &PendingLogin,
        now: i64,
    ) -> Result<TokenGrant, AuthError> {
        let url = self.endpoint("/oauth/token")?;

        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.expose_secret()),
            ("code", code),
            ("redirect_uri", self.inner.redirect_uri.as_str()),
            ("code_verifier", pending.code_verifier.as_str()),
        ];

        let response = self.inner.client.post(url).form(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TokenErrorResponse>(&text)
                .ok()
                .and_then(|e| e.error_description.or(e.error))
                .unwrap_or_else(|| format!("HTTP {status}: {text}"));
            return Err(AuthError::TokenExchange(message));
        }

        let token: TokenResponse = response.json().await?;

        Ok(TokenGrant {
            access_token: AccessToken::new(token.access_token),
            expires_at: now + token.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS),
        })
    }

    /// Name and email of the token's owner, for display.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Http` on transport or decode failure.
    #[instrument(skip(self, token))]
    pub async fn user_info(&self, token: &str) -> Result<SessionUser, AuthError> {
        let url = self.endpoint("/userinfo")?;
        let info: UserInfo = self
            .inner
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let email = info.email.unwrap_or_default();
        let name = info
            .name
            .or(info.nickname)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| if email.is_empty() { info.sub } else { email.clone() });

        Ok(SessionUser { name, email })
    }

    /// Provider logout URL that returns the browser to `return_to`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Url` if the issuer is not a valid URL.
    pub fn logout_url(&self, return_to: &str) -> Result<Url, AuthError> {
        let mut url = self.endpoint("/v2/logout")?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.inner.client_id)
            .append_pair("returnTo", return_to);
        Ok(url)
    }
}

impl std::fmt::Debug for IdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityProvider")
            .field("issuer", &self.inner.issuer)
            .field("client_id", &self.inner.client_id)
            .finish_non_exhaustive()
    }
}
