//! Server configuration.
//!
//! Every field has a default, so an empty (or absent) YAML file yields a
//! working configuration. The listen address can also be overridden with the
//! `LISTEN` environment variable.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub listen_addr: String,
    /// Upper bound for the header read of a request.
    pub header_buffer_bytes: usize,
    /// POST bodies are accumulated only when `0 < Content-Length < max_body_bytes`.
    pub max_body_bytes: usize,
    /// Delay before closing a connection so the last send can flush.
    pub close_grace_ms: u64,
    /// Chunk size used for streaming downloads and copies.
    pub chunk_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            header_buffer_bytes: 64 * 1024,
            max_body_bytes: 50 * 1024 * 1024,
            close_grace_ms: 50,
            chunk_size: 64 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory used by list and upload when no `path` is given.
    pub default_dir: PathBuf,
    pub data_mount: PathBuf,
    pub system_mount: PathBuf,
    /// Hard cap on the size of a single uploaded file.
    pub max_upload_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            default_dir: PathBuf::from("/data"),
            data_mount: PathBuf::from("/data"),
            system_mount: PathBuf::from("/system"),
            max_upload_bytes: 100 * 1024 * 1024,
        }
    }
}

/// The RAM figures reported by sysinfo are an assumed budget, not a reading.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub ram_total_bytes: u64,
    pub ram_available_bytes: u64,
    pub ram_usage_ratio: f64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            ram_total_bytes: 16 * 1024 * 1024 * 1024,
            ram_available_bytes: 13 * 1024 * 1024 * 1024,
            ram_usage_ratio: 0.6,
        }
    }
}

impl Config {
    /// Defaults, with `LISTEN` taking precedence for the listen address.
    pub fn load() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env();
        cfg
    }

    /// Reads a YAML file, then applies the `LISTEN` override.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let mut cfg = Self::from_yaml(&raw)?;
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).context("parsing YAML config")
    }

    fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var("LISTEN") {
            self.server.listen_addr = addr;
        }
    }
}
