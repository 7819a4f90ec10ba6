//! Single-file `multipart/form-data` extraction.
//!
//! The uploaded part is located by offset arithmetic rather than by scanning
//! the body for the closing boundary:
//!
//! ```text
//! file_size = Content-Length - data_start - trailer_len
//! trailer   = "\r\n" + <opening delimiter line> + "--\r\n"
//! ```
//!
//! Every step is bounds-checked, and the closing delimiter must sit right
//! after the computed range, so a malformed body is rejected before anything
//! is written.

use std::ffi::OsString;

use thiserror::Error;

use crate::http::decode::os_string_from_bytes;
use crate::http::parser::find;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MultipartError {
    #[error("No boundary found in headers")]
    MissingBoundary,
    #[error("No Content-Length")]
    MissingContentLength,
    #[error("Body does not start with the declared boundary")]
    BoundaryMismatch,
    #[error("No filename in multipart data")]
    MissingFilename,
    #[error("No file data start marker")]
    MissingDataStart,
    #[error("Invalid file size: {0} bytes")]
    InvalidFileSize(i64),
    #[error("Body truncated: expected {expected} bytes, received {received}")]
    Truncated { expected: usize, received: usize },
    #[error("Closing boundary not found after file data")]
    MissingTerminator,
}

/// Location of the uploaded file inside a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPart {
    /// Boundary token from `Content-Type`, leading dashes removed.
    pub boundary: String,
    /// Uploaded name with path separators replaced by `_`, bytes kept as sent.
    pub filename: OsString,
    pub data_start: usize,
    pub file_size: usize,
}

impl MultipartPart {
    /// The file bytes, `[data_start, data_start + file_size)`.
    pub fn data<'a>(&self, body: &'a [u8]) -> &'a [u8] {
        &body[self.data_start..self.data_start + self.file_size]
    }
}

/// Extracts the boundary token from a `Content-Type` value.
///
/// Takes the text after `boundary=`, drops leading dashes and stops at `\r`,
/// `\n` or `;`. Surrounding quotes are removed.
pub fn boundary_from_content_type(content_type: &str) -> Option<String> {
    let (_, rest) = content_type.split_once("boundary=")?;
    let rest = rest.trim_start_matches('"').trim_start_matches('-');
    let end = rest
        .find(|c: char| c == '\r' || c == '\n' || c == ';')
        .unwrap_or(rest.len());
    let token = rest[..end].trim().trim_end_matches('"');

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Replaces path separators so the name cannot escape the target directory.
pub fn sanitize_filename(raw: &[u8]) -> Vec<u8> {
    raw.iter()
        .map(|&b| if b == b'/' || b == b'\\' { b'_' } else { b })
        .collect()
}

/// Locates the single file part of `body`.
///
/// `content_type` and `content_length` are the request's header values;
/// `max_file_size` is the inclusive upper bound on the part size.
pub fn multipart_locate(
    content_type: Option<&str>,
    body: &[u8],
    content_length: Option<usize>,
    max_file_size: usize,
) -> Result<MultipartPart, MultipartError> {
    let boundary = content_type
        .and_then(boundary_from_content_type)
        .ok_or(MultipartError::MissingBoundary)?;
    let content_length = content_length.ok_or(MultipartError::MissingContentLength)?;

    // Opening delimiter line: "--" + boundary as the client wrote it.
    let line_end = find(body, b"\r\n").ok_or(MultipartError::BoundaryMismatch)?;
    let delimiter = &body[..line_end];
    if !delimiter.starts_with(b"--") || !delimiter.ends_with(boundary.as_bytes()) {
        return Err(MultipartError::BoundaryMismatch);
    }
    let trailer_len = delimiter.len() + 6;

    const FILENAME_MARKER: &[u8] = b"filename=\"";
    let name_start = find(body, FILENAME_MARKER).ok_or(MultipartError::MissingFilename)?
        + FILENAME_MARKER.len();
    let name_len = body[name_start..]
        .iter()
        .position(|&b| b == b'"' || b == b'\r' || b == b'\n')
        .unwrap_or(body.len() - name_start);
    let filename = sanitize_filename(&body[name_start..name_start + name_len]);
    if filename.is_empty() || filename == b"." || filename == b".." {
        return Err(MultipartError::MissingFilename);
    }

    let data_start = find(&body[name_start..], b"\r\n\r\n")
        .map(|off| name_start + off + 4)
        .ok_or(MultipartError::MissingDataStart)?;

    let file_size = content_length as i64 - data_start as i64 - trailer_len as i64;
    if file_size <= 0 || file_size as u64 > max_file_size as u64 {
        return Err(MultipartError::InvalidFileSize(file_size));
    }
    let file_size = file_size as usize;

    let data_end = data_start + file_size;
    if data_end > body.len() {
        return Err(MultipartError::Truncated {
            expected: content_length,
            received: body.len(),
        });
    }

    let closing = &body[data_end..];
    if !(closing.starts_with(b"\r\n") && closing[2..].starts_with(delimiter)) {
        return Err(MultipartError::MissingTerminator);
    }

    Ok(MultipartPart {
        boundary,
        filename: os_string_from_bytes(filename),
        data_start,
        file_size,
    })
}
