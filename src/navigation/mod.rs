//! Navigation guard evaluated before every route transition.
//!
//! Flow Overview:
//! 1. Public destinations proceed without any network call.
//! 2. Protected destinations issue `GET /auth/verify`.
//! 3. `200` proceeds; any other 2xx and `401` renew the access token through
//!    the client's renewal coordinator, proceeding on success and redirecting
//!    to login on failure.
//! 4. Other failures (5xx, network, timeout) follow the [`FailurePolicy`].
//!
//! This is a UX gate only; the API must still enforce access on every call.

pub mod routes;

use self::routes::RouteTable;
use crate::{api::ApiClient, error::Error};
use reqwest::StatusCode;
use tracing::{debug, error, info, instrument, warn};

/// What to do with indeterminate verification outcomes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FailurePolicy {
    /// Deny and redirect to login.
    #[default]
    Closed,
    /// Log and let the transition through.
    Open,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Navigation {
    Proceed,
    Redirect { to: String },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GuardConfig {
    pub login_path: String,
    pub failure_policy: FailurePolicy,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            failure_policy: FailurePolicy::Closed,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NavigationGuard {
    client: ApiClient,
    routes: RouteTable,
    config: GuardConfig,
}

impl NavigationGuard {
    #[must_use]
    pub fn new(client: ApiClient, routes: RouteTable, config: GuardConfig) -> Self {
        Self {
            client,
            routes,
            config,
        }
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Decides whether the transition to `destination` may proceed.
    #[instrument(skip(self))]
    pub async fn before_each(&self, destination: &str) -> Navigation {
        if !self.routes.requires_auth(destination) {
            return Navigation::Proceed;
        }

        let check = self.client.check_session().await;
        match check.result {
            Ok(StatusCode::OK) => {
                debug!("session verified");
                Navigation::Proceed
            }
            Ok(status) => {
                warn!(
                    status = status.as_u16(),
                    "unexpected verification status; renewing"
                );
                self.renew_or_login(check.generation).await
            }
            Err(Error::AuthorizationExpired { .. }) => {
                debug!("session expired; renewing");
                self.renew_or_login(check.generation).await
            }
            Err(err) => self.indeterminate(&err),
        }
    }

    /// Logs out and returns the login redirect.
    pub async fn logout(&self) -> Navigation {
        if let Err(err) = self.client.logout().await {
            warn!(error = %err, "logout call failed");
        }
        self.login()
    }

    /// Renews unless another caller already did so after `generation`.
    async fn renew_or_login(&self, generation: u64) -> Navigation {
        match self.client.renew_since(generation).await {
            Ok(_) => {
                info!("session renewed");
                Navigation::Proceed
            }
            Err(err) => {
                error!(error = %err, "session renewal failed; redirecting to login");
                self.login()
            }
        }
    }

    fn indeterminate(&self, err: &Error) -> Navigation {
        match self.config.failure_policy {
            FailurePolicy::Open => {
                error!(error = %err, "session verification failed; allowing navigation");
                Navigation::Proceed
            }
            FailurePolicy::Closed => {
                error!(error = %err, "session verification failed; redirecting to login");
                self.login()
            }
        }
    }

    fn login(&self) -> Navigation {
        Navigation::Redirect {
            to: self.config.login_path.clone(),
        }
    }
}
