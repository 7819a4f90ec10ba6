use serde::Serialize;
use thiserror::Error;

use crate::http::multipart::MultipartError;
use crate::http::response::{Response, StatusCode};

/// Failure of an operation, carrying the message shown to the client.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: &'a str,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BadRequest,
            ApiError::NotFound(_) => StatusCode::NotFound,
            ApiError::Internal(_) => StatusCode::InternalServerError,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(m) | ApiError::NotFound(m) | ApiError::Internal(m) => m,
        }
    }

    /// `{"error": "..."}` with the matching status.
    pub fn into_response(self) -> Response {
        Response::json(self.status(), &ErrorEnvelope { error: self.message() })
    }

    /// Same status, plain-text body.
    pub fn into_text_response(self) -> Response {
        Response::text(self.status(), self.message())
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}
