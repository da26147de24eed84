//! Transport and fetch error types.

use thiserror::Error;

use super::classify::classify_curl_error;
use super::policy::ErrorKind;

/// A single failed attempt at the transport layer.
#[derive(Debug, Clone, Error)]
#[error("{kind} error: {message}")]
pub struct TransportError {
    pub kind: ErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<curl::Error> for TransportError {
    fn from(e: curl::Error) -> Self {
        Self::new(classify_curl_error(&e), e.to_string())
    }
}

/// Terminal failure of `FetchScheduler::fetch`. Individual attempts fail
/// with [`TransportError`]; the last one is kept as the source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every allowed attempt failed.
    #[error("no response from {url} after {attempts} attempt(s): {source}")]
    RetryExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: TransportError,
    },
}

impl FetchError {
    /// Attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            FetchError::RetryExhausted { attempts, .. } => *attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curl_error_converts_with_kind() {
        let e: TransportError = curl::Error::new(28).into();
        assert_eq!(e.kind, ErrorKind::Timeout);
        assert!(e.to_string().starts_with("timeout error"));
    }

    #[test]
    fn exhausted_display_mentions_attempts() {
        let e = FetchError::RetryExhausted {
            url: "http://x/".to_string(),
            attempts: 4,
            source: TransportError::new(ErrorKind::Connection, "refused"),
        };
        assert_eq!(e.attempts(), 4);
        assert!(e.to_string().contains("after 4 attempt(s)"));
    }
}
