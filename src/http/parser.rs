use std::collections::HashMap;

use bytes::Bytes;
use thiserror::Error;

use crate::http::request::{self, split_target, Method, Request};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("request headers incomplete")]
    Incomplete,
    #[error("malformed request line")]
    InvalidRequest,
    #[error("malformed header line")]
    InvalidHeader,
}

/// Request line and headers, without the body.
#[derive(Debug)]
pub struct RequestHead {
    pub method: Method,
    pub target: String,
    pub version: String,
    pub headers: HashMap<String, String>,
}

impl RequestHead {
    pub fn content_length(&self) -> Option<usize> {
        request::content_length(&self.headers)
    }
}

/// Parses a complete request buffer.
///
/// The body is whatever follows the blank line, cut to `Content-Length` when
/// the buffer holds more. A body shorter than `Content-Length` is not an
/// error here; multipart validation catches it later.
pub fn parse_http_request(raw: Bytes) -> Result<Request, ParseError> {
    let headers_end = find_headers_end(&raw).ok_or(ParseError::Incomplete)?;
    let head = parse_head(&raw[..headers_end])?;

    let mut body = raw.slice(headers_end + 4..);
    if let Some(len) = head.content_length() {
        if body.len() > len {
            body.truncate(len);
        }
    }

    let (path, query) = split_target(&head.target);

    Ok(Request {
        method: head.method,
        path: path.to_string(),
        query: query.map(str::to_string),
        version: head.version,
        headers: head.headers,
        body,
    })
}

/// Parses the request line and header lines (everything before `\r\n\r\n`).
pub fn parse_head(header_bytes: &[u8]) -> Result<RequestHead, ParseError> {
    let headers_str = std::str::from_utf8(header_bytes)
        .map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.split_whitespace();

    let method_str = parts.next().ok_or(ParseError::InvalidRequest)?;
    let target = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;

    let method = Method::from_str(method_str)
        .unwrap_or_else(|| Method::Other(method_str.to_string()));

    // Headers
    let mut headers: HashMap<String, String> = HashMap::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line
            .split_once(':')
            .ok_or(ParseError::InvalidHeader)?;

        // Names differing only in case collapse into one entry, last wins.
        let key = key.trim();
        headers.retain(|k, _| !k.eq_ignore_ascii_case(key));
        headers.insert(key.to_string(), value.trim().to_string());
    }

    Ok(RequestHead {
        method,
        target: target.to_string(),
        version: version.to_string(),
        headers,
    })
}

/// Offset of the `\r\n\r\n` that ends the header block.
pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    find(buf, b"\r\n\r\n")
}

pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = Bytes::from_static(b"GET /api/list?path=%2Fdata HTTP/1.1\r\nHost: example.com\r\n\r\n");

        let parsed = parse_http_request(req).unwrap();

        assert_eq!(parsed.path, "/api/list");
        assert_eq!(parsed.query.as_deref(), Some("path=%2Fdata"));
        assert_eq!(parsed.headers.get("Host").unwrap(), "example.com");
    }

    #[test]
    fn find_handles_short_haystack() {
        assert_eq!(find(b"ab", b"abc"), None);
        assert_eq!(find(b"xxabc", b"abc"), Some(2));
    }
}
