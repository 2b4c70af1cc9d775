//! Access token renewal against `POST /auth/refresh`.
//!
//! The request has no body; the refresh credential travels in an `HttpOnly`
//! cookie held by the client's cookie store. A 2xx answer must carry
//! `access_token`; anything else is a [`RenewalError`]. This primitive does not
//! deduplicate concurrent callers, see [`coordinator`] for that.

pub mod coordinator;

use crate::{api::response::sanitize_body, error::RenewalError};
use reqwest::Client;
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: Option<String>,
}

/// Performs one renewal round-trip, bounded by `limit`.
///
/// # Errors
/// Returns `RenewalError` when the call fails, is rejected, times out, or the
/// body carries no usable `access_token`.
#[instrument(skip(http), fields(url = %url))]
pub async fn request_renewal(
    http: &Client,
    url: &str,
    limit: Duration,
) -> Result<SecretString, RenewalError> {
    match timeout(limit, send_refresh(http, url)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(timeout = ?limit, "refresh call timed out");
            Err(RenewalError::TimedOut(limit))
        }
    }
}

async fn send_refresh(http: &Client, url: &str) -> Result<SecretString, RenewalError> {
    let response = http
        .post(url)
        .send()
        .await
        .map_err(|err| RenewalError::Network(err.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "refresh rejected");
        return Err(RenewalError::Rejected {
            status: status.as_u16(),
            message: sanitize_body(&body),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|err| RenewalError::Network(err.to_string()))?;
    let parsed: RefreshResponse =
        serde_json::from_slice(&body).map_err(|err| RenewalError::Decode(err.to_string()))?;

    match parsed.access_token {
        Some(token) if !token.trim().is_empty() => {
            debug!(status = status.as_u16(), "access token renewed");
            Ok(SecretString::from(token))
        }
        _ => Err(RenewalError::MissingToken),
    }
}
