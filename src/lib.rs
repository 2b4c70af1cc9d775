//! # Tokengate (client-side session keeper)
//!
//! `tokengate` keeps a short-lived access token fresh for an HTTP API whose
//! long-lived refresh credential lives in an `HttpOnly` cookie, and gates
//! navigation to protected destinations on a verified session.
//!
//! ## Request pipeline
//!
//! Every call goes through [`ApiClient`]. A `401 Unauthorized` answer starts a
//! renewal (`POST /auth/refresh`, no body, cookie carried by the transport).
//! Concurrent 401s never issue a second renewal: the first caller leads, the
//! rest queue on the [`RenewalCoordinator`] and are released in arrival order
//! once the renewal settles. Each request is replayed at most once with
//! `Authorization: Bearer <access_token>`.
//!
//! ## Navigation
//!
//! [`NavigationGuard`] checks `GET /auth/verify` before entering a protected
//! route, renews through the same coordinator when the session is stale and
//! redirects to the login destination when renewal fails. Indeterminate
//! outcomes follow a [`FailurePolicy`], fail-closed by default.

pub mod api;
pub mod cli;
pub mod error;
pub mod navigation;
pub mod renewal;

pub use api::{
    config::ClientConfig, request::ApiRequest, response::ApiResponse, ApiClient, SessionCheck,
};
pub use error::{Error, RenewalError};
pub use navigation::{
    routes::{Route, RouteTable},
    FailurePolicy, GuardConfig, Navigation, NavigationGuard,
};
pub use renewal::coordinator::{RenewalCoordinator, RenewalState};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
