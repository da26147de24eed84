//! libcurl-backed transport.

use std::str;

use super::{parse, FetchRequest, Response, Transport};
use crate::retry::TransportError;

/// Blocking GET through a fresh `curl::easy::Easy` handle per request.
#[derive(Debug, Default, Clone, Copy)]
pub struct CurlTransport;

impl CurlTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for CurlTransport {
    fn get(&mut self, request: &FetchRequest) -> Result<Response, TransportError> {
        let mut body: Vec<u8> = Vec::new();
        let mut header_lines: Vec<String> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(&request.url)?;
        easy.get(true)?;
        easy.follow_location(request.follow_redirects)?;
        if request.follow_redirects {
            easy.max_redirections(10)?;
        }
        easy.timeout(request.timeout)?;

        let mut list = curl::easy::List::new();
        for (k, v) in &request.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        easy.http_headers(list)?;

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        Ok(Response {
            status,
            headers: parse::parse_headers(&header_lines),
            body,
        })
    }
}
