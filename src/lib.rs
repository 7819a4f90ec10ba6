//! Webman - file manager and system monitor over a minimal HTTP engine
//!
//! Core library: request reading and parsing, route dispatch, file and
//! telemetry operations, and the connection supervisor.

pub mod api;
pub mod config;
pub mod http;
pub mod server;
pub mod telemetry;
