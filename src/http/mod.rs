//! HTTP request/response engine.
//!
//! A deliberately small subset of HTTP/1.1: one request per connection, no
//! keep-alive, every response closes the connection.
//!
//! # Architecture
//!
//! - **`connection`**: per-connection state machine and the request reader
//! - **`parser`**: request line and header parsing over the raw buffer
//! - **`decode`**: percent-decoding and query-string lookup
//! - **`multipart`**: locates the uploaded file inside a multipart body
//! - **`request`**: HTTP request representation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: serializes responses and streams file bodies
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Accumulate headers (and a POST body)
//!        └──────┬──────┘
//!               │ Request parsed (or rejected with 400)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Dispatch to an operation
//!        └──────┬───────────┘
//!               │ Reply ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response or stream a file
//!        └──────┬───────────┘
//!               ▼
//!            Closed
//! ```

pub mod connection;
pub mod decode;
pub mod multipart;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
