//! Retry policy for page and image fetches.
//!
//! This module classifies transport failures (timeouts, connection errors,
//! malformed requests) and decides whether the scheduler should try the same
//! URL again, so the scheduler itself only has to drive the state machine.

mod classify;
mod error;
mod policy;

pub use classify::classify_curl_error;
pub use error::{FetchError, TransportError};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
