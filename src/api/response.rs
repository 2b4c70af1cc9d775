use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::Error;

/// Maximum number of error body characters surfaced to callers.
const MAX_ERROR_CHARS: usize = 200;

/// A fully buffered response.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    /// Returns `Error::Parse` if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body)
            .map_err(|err| Error::Parse(format!("Failed to decode response: {err}")))
    }

    /// Passes a success through unchanged and turns anything else into `Error::Http`.
    ///
    /// # Errors
    /// Returns `Error::Http` with a sanitized body for non-2xx statuses.
    pub fn into_result(self) -> Result<Self, Error> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::Http {
                status: self.status.as_u16(),
                message: sanitize_body(&self.text()),
            })
        }
    }
}

/// Trims and truncates error bodies before they reach callers.
pub(crate) fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
