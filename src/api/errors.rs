use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// Failure taxonomy for the resilient client. `Clone` because coalesced
/// callers all receive the leader's outcome.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("request timeout after {0:?}")]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(String),

    #[error("http error {status}")]
    Http { status: u16, retriable: bool },

    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("service unavailable, circuit open until {0}")]
    CircuitOpen(DateTime<Utc>),

    #[error("unparseable response: {0}")]
    Parse(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("consent not granted for external calls")]
    ConsentDenied,
}

impl ApiError {
    pub fn should_retry(&self) -> bool {
        match self {
            // Fatal - retrying cannot help
            Self::InvalidUrl(_) => false,
            Self::CircuitOpen(_) => false,
            Self::Parse(_) => false,
            Self::Cancelled => false,
            Self::ConsentDenied => false,
            Self::Http { retriable, .. } => *retriable,

            // Temporary
            Self::Timeout(_) => true,
            Self::Network(_) => true,
            // Retryable in principle, but the gate fires before any network
            // use so the retry belongs to the caller, not the retry loop.
            Self::RateLimited(_) => true,
        }
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(Duration::ZERO)
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
                retriable: status.is_server_error(),
            }
        } else if err.is_builder() {
            Self::InvalidUrl(err.to_string())
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            // DNS, connect, TLS
            Self::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(ApiError::Timeout(Duration::from_secs(1)).should_retry());
        assert!(ApiError::Network("dns".into()).should_retry());
        assert!(
            ApiError::Http {
                status: 503,
                retriable: true
            }
            .should_retry()
        );
        assert!(
            !ApiError::Http {
                status: 404,
                retriable: false
            }
            .should_retry()
        );
        assert!(!ApiError::CircuitOpen(Utc::now()).should_retry());
        assert!(!ApiError::Parse("bad json".into()).should_retry());
        assert!(!ApiError::Cancelled.should_retry());
        assert!(!ApiError::ConsentDenied.should_retry());
    }
}
