use std::fmt;
use std::time::Duration;

/// High-level classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Network-level failure (connection refused or reset, DNS, empty reply).
    Connection,
    /// The request itself is unusable (malformed URL, unsupported scheme).
    InvalidRequest,
    /// Any other transport error.
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::Connection => "connection",
            ErrorKind::InvalidRequest => "invalid request",
            ErrorKind::Other => "transport",
        };
        f.write_str(s)
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay (on top of the request interval).
    RetryAfter(Duration),
}

/// Fixed-delay retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt; a request makes at most
    /// `max_retry + 1` attempts.
    pub max_retry: u32,
    /// Extra delay before each retry. `None` retries without extra delay.
    pub delay_on_retry: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retry: 3,
            delay_on_retry: Some(Duration::from_secs(5)),
        }
    }
}

impl RetryPolicy {
    /// Decide what to do after the `failures`-th failed attempt (1-based).
    /// Every kind counts the same; the kind is only reported.
    pub fn decide(&self, failures: u32, _kind: ErrorKind) -> RetryDecision {
        if failures > self.max_retry {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.delay_on_retry.unwrap_or(Duration::ZERO))
    }

    /// Upper bound on attempts for a single request.
    pub fn max_attempts(&self) -> u32 {
        self.max_retry.saturating_add(1)
    }
}
