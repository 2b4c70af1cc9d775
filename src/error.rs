use std::time::Duration;
use thiserror::Error;

/// Failure of the renewal call. Cloned to every caller queued behind it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RenewalError {
    #[error("refresh rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("refresh request failed: {0}")]
    Network(String),
    #[error("refresh response has no access_token")]
    MissingToken,
    #[error("refresh response could not be decoded: {0}")]
    Decode(String),
    #[error("refresh timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),
    #[error("refresh abandoned before completion")]
    Abandoned,
    /// The session was cleared or replaced while the refresh was in flight.
    #[error("session changed while the refresh was in flight")]
    SessionCleared,
}

#[derive(Debug, Error)]
pub enum Error {
    /// A request was still unauthorized after its single replay.
    #[error("authorization expired for {path}")]
    AuthorizationExpired { path: String },
    #[error("session renewal failed: {0}")]
    RenewalFailed(#[from] RenewalError),
    #[error("session verification failed ({status})")]
    VerificationFailed { status: u16 },
    #[error("network error: {0}")]
    Network(String),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("response error: {0}")]
    Parse(String),
    #[error("request error: {0}")]
    Serialization(String),
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status carried by the error, when the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::AuthorizationExpired { .. } => Some(401),
            Error::VerificationFailed { status } | Error::Http { status, .. } => Some(*status),
            Error::RenewalFailed(RenewalError::Rejected { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// True when the caller should be sent back to the login destination.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Error::AuthorizationExpired { .. } | Error::RenewalFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renewal_error_converts_into_renewal_failed() {
        let err: Error = RenewalError::MissingToken.into();
        assert!(matches!(err, Error::RenewalFailed(RenewalError::MissingToken)));
        assert!(err.requires_login());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn status_is_reported_for_server_answers() {
        let rejected = Error::RenewalFailed(RenewalError::Rejected {
            status: 401,
            message: "expired".to_string(),
        });
        assert_eq!(rejected.status(), Some(401));
        assert_eq!(
            Error::AuthorizationExpired {
                path: "/users".to_string()
            }
            .status(),
            Some(401)
        );
        assert_eq!(Error::Network("refused".to_string()).status(), None);
        assert!(!Error::VerificationFailed { status: 500 }.requires_login());
    }

    #[test]
    fn timed_out_display_keeps_sub_second_limits() {
        let err = RenewalError::TimedOut(Duration::from_millis(250));
        assert_eq!(err.to_string(), "refresh timed out after 250ms");

        let err = RenewalError::TimedOut(Duration::from_secs(10));
        assert_eq!(err.to_string(), "refresh timed out after 10000ms");
    }
}
