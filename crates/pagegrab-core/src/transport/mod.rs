//! HTTP GET transport.
//!
//! The scheduler talks to the network only through [`Transport`], so timing and
//! retry logic can be exercised against a scripted transport in tests. The
//! production implementation is [`CurlTransport`] (libcurl Easy handle, one per
//! request, runs in the calling thread).

mod easy;
mod parse;

#[cfg(test)]
pub(crate) mod testing;

pub use easy::CurlTransport;
pub use parse::{parse_headers, ResponseHeaders};

use crate::retry::TransportError;
use std::time::Duration;

/// Request settings shared by every fetch of one scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub user_agent: String,
    /// Additional `(name, value)` headers.
    pub extra_headers: Vec<(String, String)>,
    pub timeout: Duration,
    pub follow_redirects: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            user_agent: crate::config::DEFAULT_USER_AGENT.to_string(),
            extra_headers: Vec::new(),
            timeout: Duration::from_secs(30),
            follow_redirects: false,
        }
    }
}

impl RequestOptions {
    /// Build the immutable request for one `fetch` call.
    pub fn request_for(&self, url: &str) -> FetchRequest {
        let mut headers = Vec::with_capacity(self.extra_headers.len() + 1);
        headers.push(("User-Agent".to_string(), self.user_agent.clone()));
        headers.extend(self.extra_headers.iter().cloned());
        FetchRequest {
            url: url.to_string(),
            headers,
            timeout: self.timeout,
            follow_redirects: self.follow_redirects,
        }
    }
}

/// A single GET request. Immutable per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
    pub follow_redirects: bool,
}

/// Raw response of one successful transfer.
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub status: u32,
    pub headers: ResponseHeaders,
    pub body: Vec<u8>,
}

/// Performs one blocking GET.
pub trait Transport {
    fn get(&mut self, request: &FetchRequest) -> Result<Response, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get(&mut self, request: &FetchRequest) -> Result<Response, TransportError> {
        (**self).get(request)
    }
}
