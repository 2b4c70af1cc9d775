use crate::{
    api::{config::ClientConfig, ApiClient},
    navigation::{FailurePolicy, GuardConfig},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::time::Duration;

/// Session settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_base_url: String,
    pub access_token: Option<SecretString>,
    pub cookies: Vec<String>,
    pub request_timeout: Option<Duration>,
    pub renewal_timeout: Option<Duration>,
    pub refresh_path: Option<String>,
    pub verify_path: Option<String>,
    pub logout_path: Option<String>,
    pub login_path: String,
    pub failure_policy: FailurePolicy,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_base_url: String) -> Self {
        Self {
            api_base_url,
            access_token: None,
            cookies: Vec::new(),
            request_timeout: None,
            renewal_timeout: None,
            refresh_path: None,
            verify_path: None,
            logout_path: None,
            login_path: GuardConfig::default().login_path,
            failure_policy: FailurePolicy::default(),
        }
    }

    pub fn set_token(&mut self, token: SecretString) {
        self.access_token = Some(token);
    }

    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config =
            ClientConfig::new(&self.api_base_url).context("invalid --api-base-url")?;

        if let Some(timeout) = self.request_timeout {
            config = config.with_request_timeout(timeout);
        }
        if let Some(timeout) = self.renewal_timeout {
            config = config.with_renewal_timeout(timeout);
        }
        if let Some(path) = &self.refresh_path {
            config = config.with_refresh_path(path.clone());
        }
        if let Some(path) = &self.verify_path {
            config = config.with_verify_path(path.clone());
        }
        if let Some(path) = &self.logout_path {
            config = config.with_logout_path(path.clone());
        }

        Ok(config)
    }

    /// Builds a client primed with the given access token and cookies.
    ///
    /// # Errors
    /// Returns an error if the config is invalid or the transport cannot be built.
    pub fn client(&self) -> Result<ApiClient> {
        let client = ApiClient::new(self.client_config()?)?;

        for cookie in &self.cookies {
            client.add_cookie(cookie);
        }
        if let Some(token) = &self.access_token {
            client.set_access_token(token.clone());
        }

        Ok(client)
    }

    #[must_use]
    pub fn guard_config(&self) -> GuardConfig {
        GuardConfig {
            login_path: self.login_path.clone(),
            failure_policy: self.failure_policy,
        }
    }
}
