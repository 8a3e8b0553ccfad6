//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_BASE_URL` - Public URL for the admin panel (used for the login callback)
//! - `EVENTHUB_API_URL` - Base URL of the REST API (e.g., `http://localhost/api`)
//! - `AUTH0_DOMAIN` - Identity provider tenant domain or URL
//! - `AUTH0_CLIENT_ID` - OAuth client ID of the admin application
//! - `AUTH0_CLIENT_SECRET` - OAuth client secret (high entropy)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `AUTH0_AUDIENCE` - API audience requested at login (default: `https://eventhub-api`)
//! - `EVENTHUB_API_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `EVENTHUB_ASSET_URL` - Host serving uploaded images (default: origin of the API URL)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sample rates (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_AUDIENCE: &str = "https://eventhub-api";
const DEFAULT_SCOPE: &str = "openid profile email";
const DEFAULT_API_TIMEOUT_SECS: u64 = 10;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin panel, without trailing slash
    pub base_url: String,
    /// REST backend configuration
    pub api: ApiConfig,
    /// Identity provider configuration
    pub identity: IdentityConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// REST backend configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every resource path is appended to
    pub base_url: String,
    /// Host that serves uploaded images
    pub asset_base_url: String,
    /// Fixed timeout applied to every request
    pub timeout: Duration,
}

impl ApiConfig {
    /// Build an API configuration with the default timeout and asset host.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let asset_base_url = origin_of(&base_url, "EVENTHUB_API_URL")?;
        Ok(Self {
            base_url,
            asset_base_url,
            timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
        })
    }
}

/// OAuth2 / `OpenID` Connect identity provider configuration.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Issuer URL (e.g., `https://tenant.eu.auth0.com`), without trailing slash
    pub issuer: String,
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: SecretString,
    /// Audience of the REST API access token
    pub audience: String,
    /// Requested scopes
    pub scope: String,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("issuer", &self.issuer)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("audience", &self.audience)
            .field("scope", &self.scope)
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`AdminConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env
            .or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;
        let base_url = env
            .required("ADMIN_BASE_URL")?
            .trim_end_matches('/')
            .to_string();
        origin_of(&base_url, "ADMIN_BASE_URL")?;

        let api = ApiConfig::from_vars(&env)?;
        let identity = IdentityConfig::from_vars(&env)?;

        let sentry_dsn = env.optional("SENTRY_DSN");
        let sentry_environment = env.optional("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env
            .optional("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .optional("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            base_url,
            api,
            identity,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Callback URL registered with the identity provider.
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("{}/auth/callback", self.base_url)
    }

    /// Whether the panel is served over HTTPS (controls secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl ApiConfig {
    /// Load only the REST backend section (`EVENTHUB_API_URL`,
    /// `EVENTHUB_ASSET_URL`, `EVENTHUB_API_TIMEOUT_SECS`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL is missing or a value is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Self::from_vars(&Env(&lookup))
    }

    fn from_vars(env: &Env<'_>) -> Result<Self, ConfigError> {
        let mut api = Self::new(&env.required("EVENTHUB_API_URL")?)?;

        if let Some(asset) = env.optional("EVENTHUB_ASSET_URL") {
            origin_of(&asset, "EVENTHUB_ASSET_URL")?;
            api.asset_base_url = asset.trim_end_matches('/').to_string();
        }

        let timeout_secs = env
            .or_default(
                "EVENTHUB_API_TIMEOUT_SECS",
                &DEFAULT_API_TIMEOUT_SECS.to_string(),
            )
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("EVENTHUB_API_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "EVENTHUB_API_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        api.timeout = Duration::from_secs(timeout_secs);

        Ok(api)
    }
}

impl IdentityConfig {
    fn from_vars(env: &Env<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            issuer: normalize_issuer(&env.required("AUTH0_DOMAIN")?),
            client_id: env.required("AUTH0_CLIENT_ID")?,
            client_secret: env.validated_secret("AUTH0_CLIENT_SECRET")?,
            audience: env.or_default("AUTH0_AUDIENCE", DEFAULT_AUDIENCE),
            scope: DEFAULT_SCOPE.to_string(),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup shared by the config constructors.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get a required environment variable. Empty values count as missing.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional environment variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get an environment variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Load and validate a secret.
    fn validated_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let value = self.required(key)?;
        validate_secret_strength(&value, key)?;
        Ok(SecretString::from(value))
    }
}

/// Accept either a bare tenant domain or a full URL.
fn normalize_issuer(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.starts_with("https://") || domain.starts_with("http://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}

/// Scheme, host and port of `value`, which must be an absolute http(s) URL.
fn origin_of(value: &str, var_name: &str) -> Result<String, ConfigError> {
    let url = url::Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url.origin().ascii_serialization())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the secret issued by the identity provider."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CLIENT_SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("ADMIN_BASE_URL", "http://localhost:3001/"),
            ("EVENTHUB_API_URL", "http://localhost/api/"),
            ("AUTH0_DOMAIN", "eventhub.eu.auth0.com"),
            ("AUTH0_CLIENT_ID", "abc123"),
            ("AUTH0_CLIENT_SECRET", CLIENT_SECRET),
        ]
    }

    fn with(
        mut vars: Vec<(&'static str, &'static str)>,
        key: &'static str,
        value: &'static str,
    ) -> Vec<(&'static str, &'static str)> {
        vars.retain(|(k, _)| *k != key);
        vars.push((key, value));
        vars
    }

    #[test]
    fn loads_minimal_configuration_with_defaults() {
        let config = AdminConfig::from_lookup(lookup(&minimal())).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3001");
        assert_eq!(config.base_url, "http://localhost:3001");
        assert_eq!(config.redirect_uri(), "http://localhost:3001/auth/callback");
        assert!(!config.is_secure());
        assert_eq!(config.api.base_url, "http://localhost/api");
        assert_eq!(config.api.asset_base_url, "http://localhost");
        assert_eq!(config.api.timeout, Duration::from_secs(10));
        assert_eq!(config.identity.issuer, "https://eventhub.eu.auth0.com");
        assert_eq!(config.identity.audience, "https://eventhub-api");
        assert_eq!(config.identity.scope, "openid profile email");
    }

    #[test]
    fn missing_required_variable_is_reported_by_name() {
        let vars: Vec<_> = minimal()
            .into_iter()
            .filter(|(k, _)| *k != "EVENTHUB_API_URL")
            .collect();
        let err = AdminConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "EVENTHUB_API_URL"));
    }

    #[test]
    fn rejects_non_http_api_url() {
        let vars = with(minimal(), "EVENTHUB_API_URL", "ftp://files.local/api");
        let err = AdminConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "EVENTHUB_API_URL"));
    }

    #[test]
    fn rejects_zero_timeout() {
        let vars = with(minimal(), "EVENTHUB_API_TIMEOUT_SECS", "0");
        assert!(AdminConfig::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn asset_url_override_is_used() {
        let vars = with(minimal(), "EVENTHUB_ASSET_URL", "https://cdn.eventhub.test/");
        let config = AdminConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.api.asset_base_url, "https://cdn.eventhub.test");
    }

    #[test]
    fn keeps_full_issuer_url() {
        assert_eq!(
            normalize_issuer("https://login.eventhub.test/"),
            "https://login.eventhub.test"
        );
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn placeholder_client_secret_is_rejected() {
        let vars = with(minimal(), "AUTH0_CLIENT_SECRET", "your-client-secret-here");
        let err = AdminConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn identity_config_debug_redacts_secrets() {
        let config = AdminConfig::from_lookup(lookup(&minimal())).unwrap();
        let debug_output = format!("{:?}", config.identity);

        assert!(debug_output.contains("abc123"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(CLIENT_SECRET));
    }
}
