//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `BACKEND_API_URL` - Base URL of the Aprova Fácil backend API
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `BACKEND_API_KEY` - Sent as `X-API-Key` on every backend request
//! - `CEP_LOOKUP_URL` - Postal code service (default: <https://viacep.com.br/ws>)
//! - `MERCADOPAGO_SDK_URL` - Payment SDK script (default: <https://sdk.mercadopago.com/js/v2>)
//! - `WHATSAPP_NUMBER` - Digits only, with country code (default: 5511999999999)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

pub const DEFAULT_CEP_LOOKUP_URL: &str = "https://viacep.com.br/ws";
pub const DEFAULT_MERCADOPAGO_SDK_URL: &str = "https://sdk.mercadopago.com/js/v2";
pub const DEFAULT_WHATSAPP_NUMBER: &str = "5511999999999";

/// Timeout applied to every outbound HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Backend REST API
    pub backend: BackendConfig,
    /// Postal code lookup service base URL
    pub cep_lookup_url: Url,
    /// Payment provider SDK script loaded by the checkout page
    pub mercadopago_sdk_url: Url,
    /// WhatsApp number used for deep links (digits only)
    pub whatsapp_number: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Backend API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    pub api_url: Url,
    pub api_key: Option<SecretString>,
    pub timeout: Duration,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl StorefrontConfig {
    /// Configuration with defaults for everything but the two required URLs.
    ///
    /// Used by tests and tooling that do not read the environment.
    #[must_use]
    pub fn new(base_url: impl Into<String>, backend_api_url: Url) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: base_url.into(),
            backend: BackendConfig {
                api_url: backend_api_url,
                api_key: None,
                timeout: DEFAULT_REQUEST_TIMEOUT,
            },
            cep_lookup_url: default_url(DEFAULT_CEP_LOOKUP_URL),
            mercadopago_sdk_url: default_url(DEFAULT_MERCADOPAGO_SDK_URL),
            whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_string(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API key fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        parse_url("STOREFRONT_BASE_URL", &base_url)?;

        let backend = BackendConfig::from_env()?;
        let cep_lookup_url = parse_url(
            "CEP_LOOKUP_URL",
            &get_env_or_default("CEP_LOOKUP_URL", DEFAULT_CEP_LOOKUP_URL),
        )?;
        let mercadopago_sdk_url = parse_url(
            "MERCADOPAGO_SDK_URL",
            &get_env_or_default("MERCADOPAGO_SDK_URL", DEFAULT_MERCADOPAGO_SDK_URL),
        )?;
        let whatsapp_number = validate_whatsapp_number(&get_env_or_default(
            "WHATSAPP_NUMBER",
            DEFAULT_WHATSAPP_NUMBER,
        ))?;

        Ok(Self {
            host,
            port,
            base_url,
            backend,
            cep_lookup_url,
            mercadopago_sdk_url,
            whatsapp_number,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Origin of the payment SDK, for the CSP.
    #[must_use]
    pub fn mercadopago_sdk_origin(&self) -> String {
        self.mercadopago_sdk_url.origin().ascii_serialization()
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_url = parse_url("BACKEND_API_URL", &get_required_env("BACKEND_API_URL")?)?;
        let api_key = match get_optional_env("BACKEND_API_KEY") {
            Some(key) => {
                validate_secret_strength(&key, "BACKEND_API_KEY")?;
                Some(SecretString::from(key))
            }
            None => None,
        };

        Ok(Self {
            api_url,
            api_key,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Absolute URL for a backend path such as `/api/orders`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_url.as_str().trim_end_matches('/'))
    }

    /// The API key, if configured.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(ExposeSecret::expose_secret)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn default_url(value: &str) -> Url {
    Url::parse(value).unwrap_or_else(|_| unreachable!("default URLs are valid"))
}

fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{other}'"),
        )),
    }
}

/// Parse a sample rate in `0.0..=1.0`.
fn get_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    let rate = raw
        .trim()
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{rate} is outside 0.0..=1.0"),
        ))
    }
}

fn validate_whatsapp_number(value: &str) -> Result<String, ConfigError> {
    let value = value.trim();
    if (10..=15).contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(value.to_string())
    } else {
        Err(ConfigError::InvalidEnvVar(
            "WHATSAPP_NUMBER".to_string(),
            "must be 10-15 digits including country code".to_string(),
        ))
    }
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
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
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
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated key."
            ),
        ));
    }

    Ok(())
}
