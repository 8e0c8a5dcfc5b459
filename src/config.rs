//! Configuration for the WeCom client.
//!
//! Credentials are supplied by the caller and never change after the
//! client is built. Everything else (base URL, timeout ceiling, token
//! policy) has a default and is fixed per client, not per call.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::WecomError;

/// Default WeCom API base URL.
pub const DEFAULT_BASE_URL: &str = "https://qyapi.weixin.qq.com/cgi-bin";

/// Default timeout ceiling for a single HTTP round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Long-lived application credentials.
///
/// `Debug` output hides the corp secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Enterprise (corp) ID.
    pub corp_id: String,

    /// Application secret.
    /// This value must never be logged or included in error messages.
    pub corp_secret: String,

    /// Application (agent) ID used for agent lookups and messages.
    pub agent_id: String,
}

impl Credentials {
    /// Creates a credential set.
    pub fn new(
        corp_id: impl Into<String>,
        corp_secret: impl Into<String>,
        agent_id: impl Into<String>,
    ) -> Self {
        Self {
            corp_id: corp_id.into(),
            corp_secret: corp_secret.into(),
            agent_id: agent_id.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("corp_id", &self.corp_id)
            .field("corp_secret", &"[REDACTED]")
            .field("agent_id", &self.agent_id)
            .finish()
    }
}

/// How the client obtains access tokens for authenticated calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenPolicy {
    /// Fetch a fresh token before every authenticated call.
    #[default]
    PerCall,

    /// Reuse a token until shortly before it expires.
    Cached,
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Application credentials.
    pub credentials: Credentials,

    /// API base URL, without a trailing slash.
    pub base_url: String,

    /// Timeout ceiling applied to every HTTP round trip.
    pub timeout: Duration,

    /// Token acquisition strategy.
    pub token_policy: TokenPolicy,
}

impl Config {
    /// Creates a configuration with default base URL, timeout and token policy.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            token_policy: TokenPolicy::default(),
        }
    }

    /// Overrides the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the timeout ceiling.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Selects the token acquisition strategy.
    pub fn with_token_policy(mut self, token_policy: TokenPolicy) -> Self {
        self.token_policy = token_policy;
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// # Required Environment Variables
    ///
    /// - `WECOM_CORP_ID`: The enterprise ID
    /// - `WECOM_CORP_SECRET`: The application secret
    /// - `WECOM_AGENT_ID`: The application ID
    ///
    /// # Optional Environment Variables
    ///
    /// - `WECOM_BASE_URL`: Overrides [`DEFAULT_BASE_URL`]
    ///
    /// # Errors
    ///
    /// Returns `WecomError::Config` if any required variable is missing
    /// or if values fail validation.
    ///
    /// # Example
    ///
    /// ```ignore
    /// dotenvy::dotenv().ok();
    /// let config = Config::from_env()?;
    /// ```
    pub fn from_env() -> Result<Self, WecomError> {
        let credentials = Credentials::new(
            Self::get_required_env("WECOM_CORP_ID")?,
            Self::get_required_env("WECOM_CORP_SECRET")?,
            Self::get_required_env("WECOM_AGENT_ID")?,
        );

        let mut config = Config::new(credentials);
        if let Ok(base_url) = env::var("WECOM_BASE_URL") {
            if !base_url.trim().is_empty() {
                config = config.with_base_url(base_url);
            }
        }

        config.validate()
    }

    /// Validates the configuration and normalizes the base URL.
    ///
    /// # Errors
    ///
    /// Returns `WecomError::Config` if the base URL is not http(s), if the
    /// corp ID or secret is empty, if the secret looks like a placeholder,
    /// or if the timeout is zero.
    pub fn validate(mut self) -> Result<Self, WecomError> {
        self.base_url = Self::validate_base_url(&self.base_url)?;

        if self.credentials.corp_id.trim().is_empty() {
            return Err(WecomError::invalid_config("corp_id must not be empty"));
        }
        if self.credentials.corp_secret.trim().is_empty() {
            return Err(WecomError::invalid_config("corp_secret must not be empty"));
        }
        Self::validate_secret(&self.credentials.corp_secret)?;

        if self.timeout.is_zero() {
            return Err(WecomError::invalid_config("timeout must be greater than zero"));
        }

        Ok(self)
    }

    /// Gets a required environment variable, returning an error if missing or empty.
    fn get_required_env(name: &str) -> Result<String, WecomError> {
        env::var(name)
            .map_err(|_| WecomError::missing_env(name))
            .and_then(|value| {
                if value.trim().is_empty() {
                    Err(WecomError::missing_env(name))
                } else {
                    Ok(value.trim().to_string())
                }
            })
    }

    /// Validates and normalizes the base URL.
    fn validate_base_url(url: &str) -> Result<String, WecomError> {
        let url = url.trim().trim_end_matches('/').to_string();

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(WecomError::invalid_config(
                "base URL must start with http:// or https://",
            ));
        }

        Ok(url)
    }

    /// Rejects secrets that were obviously copied from a template.
    fn validate_secret(secret: &str) -> Result<(), WecomError> {
        let secret_lower = secret.to_lowercase();
        let placeholder_patterns = ["your_secret", "your_corp_secret", "placeholder", "changeme"];

        for pattern in placeholder_patterns {
            if secret_lower.contains(pattern) {
                return Err(WecomError::invalid_config(
                    "corp_secret appears to be a placeholder value",
                ));
            }
        }

        Ok(())
    }
}
