//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ERPNEXT_BASE_URL` - Site URL of the ERPNext instance (e.g., `https://erp.example.com`)
//! - `ERPNEXT_API_KEY` - API key of the integration user
//! - `ERPNEXT_API_SECRET` - API secret of the integration user
//!
//! ## Optional
//! - `ERPNEXT_COMPANY` - Default company for catalog searches
//! - `ERPNEXT_PRICE_LIST` - Default selling price list
//! - `ERPNEXT_FALLBACK_PRICE_LIST` - Price list tried after the default (default: Standard Selling)
//! - `ERPNEXT_TIMEOUT_SECS` - Per-request timeout in seconds (default: 15)

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use crate::retry::RetryPolicy;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Price list tried when neither the caller nor the configuration names one.
pub const DEFAULT_FALLBACK_PRICE_LIST: &str = "Standard Selling";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "api-secret",
    "api_secret",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Connection settings and credentials for one ERPNext site.
///
/// Built once at startup and handed to [`crate::ErpClient::new`]; the client
/// keeps its own copy, so there is no process-wide configuration state.
/// Implements `Debug` manually to redact the API secret.
#[derive(Clone)]
pub struct ErpConfig {
    /// Site URL; resource paths are appended below it.
    pub base_url: Url,
    /// API key of the integration user.
    pub api_key: String,
    /// API secret of the integration user.
    pub api_secret: SecretString,
    /// Company used to scope catalog searches when the caller names none.
    pub default_company: Option<String>,
    /// Selling price list tried first when the caller names none.
    pub default_price_list: Option<String>,
    /// Selling price list tried after the default.
    pub fallback_price_list: String,
    /// Timeout applied to every request.
    pub timeout: Duration,
    /// Retry budget for transient failures.
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for ErpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("default_company", &self.default_company)
            .field("default_price_list", &self.default_price_list)
            .field("fallback_price_list", &self.fallback_price_list)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl ErpConfig {
    /// Create a configuration with default timeout, retry budget and price
    /// list fallback.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if the URL does not parse or is
    /// not `http`/`https`.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        api_secret: SecretString,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            api_key: api_key.into(),
            api_secret,
            default_company: None,
            default_price_list: None,
            fallback_price_list: DEFAULT_FALLBACK_PRICE_LIST.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the API secret looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = get_required_env("ERPNEXT_BASE_URL")?;
        let api_key = get_required_env("ERPNEXT_API_KEY")?;
        let api_secret = get_validated_secret("ERPNEXT_API_SECRET")?;

        let timeout = match get_optional_env("ERPNEXT_TIMEOUT_SECS") {
            Some(raw) => parse_timeout(&raw)
                .map_err(|e| ConfigError::InvalidEnvVar("ERPNEXT_TIMEOUT_SECS".to_string(), e))?,
            None => DEFAULT_TIMEOUT,
        };

        let mut config = Self::new(&base_url, api_key, api_secret)?;
        config.default_company = get_optional_env("ERPNEXT_COMPANY");
        config.default_price_list = get_optional_env("ERPNEXT_PRICE_LIST");
        config.fallback_price_list =
            get_env_or_default("ERPNEXT_FALLBACK_PRICE_LIST", DEFAULT_FALLBACK_PRICE_LIST);
        config.timeout = timeout;
        Ok(config)
    }

    /// Set the default company.
    #[must_use]
    pub fn with_default_company(mut self, company: impl Into<String>) -> Self {
        self.default_company = Some(company.into());
        self
    }

    /// Set the default selling price list.
    #[must_use]
    pub fn with_default_price_list(mut self, price_list: impl Into<String>) -> Self {
        self.default_price_list = Some(price_list.into());
        self
    }

    /// Replace the fallback price list name.
    #[must_use]
    pub fn with_fallback_price_list(mut self, price_list: impl Into<String>) -> Self {
        self.fallback_price_list = price_list.into();
        self
    }

    /// Replace the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the retry budget.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// `key:secret` pair for the Basic authorization header.
    pub(crate) fn credential_pair(&self) -> String {
        format!("{}:{}", self.api_key, self.api_secret.expose_secret())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidBaseUrl(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidBaseUrl(format!("{url} cannot be a base")));
    }
    Ok(url)
}

fn parse_timeout(raw: &str) -> Result<Duration, String> {
    let secs = raw.trim().parse::<u64>().map_err(|e| e.to_string())?;
    if secs == 0 {
        return Err("timeout must be at least one second".to_string());
    }
    Ok(Duration::from_secs(secs))
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable (blank counts as unset).
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Reject secrets that are obviously copied from a sample `.env`.
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

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
