use std::collections::HashMap;

use serde::Serialize;

/// HTTP status codes the server emits.
///
/// - `Ok` (200): Request successful
/// - `BadRequest` (400): Malformed request or multipart body
/// - `NotFound` (404): Unknown route, missing parameter or missing file
/// - `MethodNotAllowed` (405): Wrong verb on upload
/// - `InternalServerError` (500): Filesystem failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use webman::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::MethodNotAllowed.as_u16(), 405);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// A complete HTTP response, or the head of a streamed one.
///
/// For a streamed file the body stays empty and `Content-Length` carries the
/// size of the data that follows the head.
#[derive(Debug)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// HTTP headers as key-value pairs
    pub headers: HashMap<String, String>,
    /// Response body as bytes
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "application/json")
///     .body(b"{}".to_vec())
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Adds or replaces a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final Response.
    ///
    /// Fills in the envelope every response carries unless already set:
    /// `Content-Type`, `Content-Length` (from the body),
    /// `Access-Control-Allow-Origin: *` and `Connection: close`.
    pub fn build(mut self) -> Response {
        self.headers
            .entry("Content-Length".to_string())
            .or_insert_with(|| self.body.len().to_string());
        self.headers
            .entry("Content-Type".to_string())
            .or_insert_with(|| "text/plain".to_string());
        self.headers
            .entry("Access-Control-Allow-Origin".to_string())
            .or_insert_with(|| "*".to_string());
        self.headers
            .entry("Connection".to_string())
            .or_insert_with(|| "close".to_string());

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// Plain-text response.
    pub fn text(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(status)
            .header("Content-Type", "text/plain")
            .body(body.into())
            .build()
    }

    /// HTML page.
    pub fn html(body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", "text/html")
            .body(body.into())
            .build()
    }

    /// JSON response; a value that fails to serialize becomes a 500.
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => ResponseBuilder::new(status)
                .header("Content-Type", "application/json")
                .body(body)
                .build(),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response body");
                Response::internal_error()
            }
        }
    }

    /// The generic 404 for unmatched routes.
    pub fn not_found() -> Self {
        Response::text(StatusCode::NotFound, "Not found")
    }

    pub fn method_not_allowed() -> Self {
        Response::text(StatusCode::MethodNotAllowed, "Method not allowed")
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_error() -> Self {
        Response::text(StatusCode::InternalServerError, "500 Internal Server Error")
    }
}
