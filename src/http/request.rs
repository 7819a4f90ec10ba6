use std::collections::HashMap;

use bytes::Bytes;

use crate::http::decode;

/// HTTP request methods.
///
/// Only POST changes how a request is read (its body is accumulated up to
/// `Content-Length`); routing otherwise ignores the verb except on upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// Any other token; routed on its path like the rest
    Other(String),
}

/// A parsed HTTP request.
///
/// `path` is the route part of the request target and `query` the text after
/// the first `?`, if any. `body` is a slice of the same buffer the headers were
/// read into and may be shorter than `Content-Length` when the peer closed
/// early.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The route, without the query string (e.g., "/api/list")
    pub path: String,
    /// Raw query string, without the leading `?`
    pub query: Option<String>,
    /// HTTP version (typically "HTTP/1.1")
    pub version: String,
    /// Request headers; duplicates keep the last value
    pub headers: HashMap<String, String>,
    /// Request body, possibly short
    pub body: Bytes,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// # Example
    ///
    /// ```
    /// # use webman::http::request::Method;
    /// assert_eq!(Method::from_str("POST"), Some(Method::POST));
    /// assert_eq!(Method::from_str("post"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            "HEAD" => Some(Method::HEAD),
            "OPTIONS" => Some(Method::OPTIONS),
            "PATCH" => Some(Method::PATCH),
            _ => None,
        }
    }
}

/// Splits a request target at the first `?` into route and query.
pub fn split_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    }
}

/// Header lookup shared by the reader and the handlers.
///
/// An exact match wins; otherwise names are compared ASCII
/// case-insensitively.
pub fn header_value<'a>(headers: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(key) {
        return Some(v.as_str());
    }
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.as_str())
}

pub fn content_length(headers: &HashMap<String, String>) -> Option<usize> {
    header_value(headers, "Content-Length").and_then(|v| v.trim().parse().ok())
}

impl Request {
    /// Retrieves a header value by name.
    ///
    /// An exact match wins; otherwise names are compared ASCII
    /// case-insensitively.
    pub fn header(&self, key: &str) -> Option<&str> {
        header_value(&self.headers, key)
    }

    /// The declared `Content-Length`, if present and numeric.
    pub fn content_length(&self) -> Option<usize> {
        content_length(&self.headers)
    }

    /// Raw (still percent-encoded) value of a query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .as_deref()
            .and_then(|q| decode::query_param(q, name))
    }
}
