//! Client configuration: the API origin, timeouts and the session endpoint
//! paths. Defaults are overridden by `TOKENGATE_*` environment variables when
//! present; empty values are ignored so a blank variable never wipes a default.
//! Configuration values are public; do not store secrets here.

use crate::error::Error;
use std::{env, time::Duration};
use url::Url;

/// Default request timeout applied to every call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Default upper bound for a single renewal round-trip.
pub const DEFAULT_RENEWAL_TIMEOUT: Duration = Duration::from_secs(10);

pub const ENV_API_BASE_URL: &str = "TOKENGATE_API_BASE_URL";
pub const ENV_REQUEST_TIMEOUT: &str = "TOKENGATE_REQUEST_TIMEOUT_SECONDS";
pub const ENV_RENEWAL_TIMEOUT: &str = "TOKENGATE_RENEWAL_TIMEOUT_SECONDS";
pub const ENV_REFRESH_PATH: &str = "TOKENGATE_REFRESH_PATH";
pub const ENV_VERIFY_PATH: &str = "TOKENGATE_VERIFY_PATH";
pub const ENV_LOGOUT_PATH: &str = "TOKENGATE_LOGOUT_PATH";

/// Transport configuration for an [`crate::ApiClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    api_base_url: String,
    request_timeout: Duration,
    renewal_timeout: Duration,
    refresh_path: String,
    verify_path: String,
    logout_path: String,
}

impl ClientConfig {
    /// Builds a config for the given origin with default timeouts and paths.
    ///
    /// # Errors
    /// Returns `Error::Config` if the origin is empty, unparsable, or not http(s).
    pub fn new(api_base_url: &str) -> Result<Self, Error> {
        Ok(Self {
            api_base_url: validate_base_url(api_base_url)?,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            renewal_timeout: DEFAULT_RENEWAL_TIMEOUT,
            refresh_path: "/auth/refresh".to_string(),
            verify_path: "/auth/verify".to_string(),
            logout_path: "/auth/logout".to_string(),
        })
    }

    /// Loads the config from `TOKENGATE_*` environment variables.
    ///
    /// # Errors
    /// Returns `Error::Config` if the base URL is missing or any value is invalid.
    pub fn from_env() -> Result<Self, Error> {
        let base = read_env(ENV_API_BASE_URL)
            .ok_or_else(|| Error::Config(format!("{ENV_API_BASE_URL} is not set")))?;
        let mut config = Self::new(&base)?;

        let overrides = EnvOverrides {
            request_timeout: read_env(ENV_REQUEST_TIMEOUT)
                .map(|value| parse_seconds(ENV_REQUEST_TIMEOUT, &value))
                .transpose()?,
            renewal_timeout: read_env(ENV_RENEWAL_TIMEOUT)
                .map(|value| parse_seconds(ENV_RENEWAL_TIMEOUT, &value))
                .transpose()?,
            refresh_path: read_env(ENV_REFRESH_PATH),
            verify_path: read_env(ENV_VERIFY_PATH),
            logout_path: read_env(ENV_LOGOUT_PATH),
        };
        apply_overrides(&mut config, overrides);

        Ok(config)
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_renewal_timeout(mut self, timeout: Duration) -> Self {
        self.renewal_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    #[must_use]
    pub fn with_verify_path(mut self, path: impl Into<String>) -> Self {
        self.verify_path = path.into();
        self
    }

    #[must_use]
    pub fn with_logout_path(mut self, path: impl Into<String>) -> Self {
        self.logout_path = path.into();
        self
    }

    #[must_use]
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    #[must_use]
    pub fn renewal_timeout(&self) -> Duration {
        self.renewal_timeout
    }

    #[must_use]
    pub fn refresh_path(&self) -> &str {
        &self.refresh_path
    }

    #[must_use]
    pub fn verify_path(&self) -> &str {
        &self.verify_path
    }

    #[must_use]
    pub fn logout_path(&self) -> &str {
        &self.logout_path
    }
}

#[derive(Default)]
struct EnvOverrides {
    request_timeout: Option<Duration>,
    renewal_timeout: Option<Duration>,
    refresh_path: Option<String>,
    verify_path: Option<String>,
    logout_path: Option<String>,
}

fn apply_overrides(config: &mut ClientConfig, overrides: EnvOverrides) {
    if let Some(value) = overrides.request_timeout {
        config.request_timeout = value;
    }
    if let Some(value) = overrides.renewal_timeout {
        config.renewal_timeout = value;
    }
    if let Some(value) = overrides.refresh_path {
        config.refresh_path = value;
    }
    if let Some(value) = overrides.verify_path {
        config.verify_path = value;
    }
    if let Some(value) = overrides.logout_path {
        config.logout_path = value;
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| normalize_value(&value))
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_seconds(key: &str, value: &str) -> Result<Duration, Error> {
    match value.parse::<u64>() {
        Ok(0) | Err(_) => Err(Error::Config(format!(
            "{key} must be a positive number of seconds, got {value:?}"
        ))),
        Ok(seconds) => Ok(Duration::from_secs(seconds)),
    }
}

fn validate_base_url(raw: &str) -> Result<String, Error> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Config("API base URL is empty".to_string()));
    }

    let url = Url::parse(trimmed)
        .map_err(|err| Error::Config(format!("invalid API base URL {trimmed:?}: {err}")))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(Error::Config(format!(
                "unsupported API base URL scheme {scheme}"
            )))
        }
    }

    if url.host().is_none() {
        return Err(Error::Config("API base URL has no host".to_string()));
    }

    Ok(trimmed.to_string())
}
