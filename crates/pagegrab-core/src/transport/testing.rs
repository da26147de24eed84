//! In-memory transports for unit tests.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use super::{FetchRequest, Response, ResponseHeaders, Transport};
use crate::retry::{ErrorKind, TransportError};

pub(crate) fn ok(body: &[u8]) -> Result<Response, TransportError> {
    Ok(Response {
        status: 200,
        headers: ResponseHeaders::default(),
        body: body.to_vec(),
    })
}

pub(crate) fn refused() -> Result<Response, TransportError> {
    Err(TransportError::new(ErrorKind::Connection, "connection refused"))
}

/// Plays back a fixed list of outcomes and records every request it sees.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    pub script: VecDeque<Result<Response, TransportError>>,
    pub calls: Vec<(Instant, FetchRequest)>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<Response, TransportError>>) -> Self {
        Self {
            script: script.into(),
            calls: Vec::new(),
        }
    }

    pub fn starts(&self) -> Vec<Instant> {
        self.calls.iter().map(|(t, _)| *t).collect()
    }
}

impl Transport for ScriptedTransport {
    fn get(&mut self, request: &FetchRequest) -> Result<Response, TransportError> {
        self.calls.push((Instant::now(), request.clone()));
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new(ErrorKind::Connection, "script exhausted")))
    }
}

/// Serves fixed responses by URL; unknown URLs fail with a connection error.
#[derive(Default)]
pub(crate) struct RoutedTransport {
    routes: HashMap<String, Response>,
    pub calls: Vec<String>,
}

impl RoutedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(
            url.to_string(),
            Response {
                status: 200,
                headers: ResponseHeaders {
                    content_type: Some(content_type.to_string()),
                    ..ResponseHeaders::default()
                },
                body: body.into(),
            },
        );
        self
    }

    pub fn status(mut self, url: &str, status: u32) -> Self {
        self.routes.insert(
            url.to_string(),
            Response {
                status,
                ..Response::default()
            },
        );
        self
    }
}

impl Transport for RoutedTransport {
    fn get(&mut self, request: &FetchRequest) -> Result<Response, TransportError> {
        self.calls.push(request.url.clone());
        self.routes
            .get(&request.url)
            .cloned()
            .ok_or_else(|| TransportError::new(ErrorKind::Connection, "no route"))
    }
}
