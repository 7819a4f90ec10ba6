//! System-info snapshot.
//!
//! Never fails: any sub-query that errors leaves its section partial.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::warn;

use crate::server::ServerContext;
use crate::server::stats::CounterSnapshot;
use crate::telemetry::DiskUsage;

#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    pub storage: Storage,
    pub ram: Ram,
    pub uptime: Uptime,
    pub network: Network,
    pub server: CounterSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct Storage {
    pub data: DiskUsage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<DiskUsage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ram {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Uptime {
    pub seconds: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub secs: u64,
    pub start_time: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Network {
    pub hostname: String,
    pub ip: String,
}

impl Uptime {
    pub fn from_secs(seconds: u64, start_time: u64) -> Self {
        Self {
            seconds,
            days: seconds / 86_400,
            hours: (seconds % 86_400) / 3_600,
            minutes: (seconds % 3_600) / 60,
            secs: seconds % 60,
            start_time,
        }
    }
}

fn unix_secs(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Host readings gathered off the async workers.
#[derive(Debug, Default)]
struct HostReadings {
    data: Option<DiskUsage>,
    system: Option<DiskUsage>,
    hostname: Option<String>,
    ip: Option<Ipv4Addr>,
}

/// Runs the filesystem and interface queries on the blocking pool.
async fn read_host(ctx: &ServerContext) -> HostReadings {
    let telemetry = Arc::clone(&ctx.telemetry);
    let data_mount = ctx.config.storage.data_mount.clone();
    let system_mount = ctx.config.storage.system_mount.clone();

    let readings = tokio::task::spawn_blocking(move || HostReadings {
        data: telemetry.disk_usage(&data_mount),
        system: telemetry.disk_usage(&system_mount),
        hostname: telemetry.hostname(),
        ip: telemetry.ipv4_address(),
    })
    .await;

    readings.unwrap_or_else(|e| {
        warn!(error = %e, "host telemetry task failed");
        HostReadings::default()
    })
}

pub async fn collect(ctx: &ServerContext) -> SystemInfo {
    let host = read_host(ctx).await;

    let storage = Storage {
        data: host.data.unwrap_or_default(),
        system: host.system,
    };

    // Assumed budget, not a live reading.
    let ram_cfg = &ctx.config.telemetry;
    let used = (ram_cfg.ram_available_bytes as f64 * ram_cfg.ram_usage_ratio) as u64;
    let ram = Ram {
        total: ram_cfg.ram_total_bytes,
        used,
        free: ram_cfg.ram_total_bytes.saturating_sub(used),
    };

    let now = SystemTime::now();
    let started = ctx.counters.started_at().unwrap_or(now);
    let elapsed = now.duration_since(started).map(|d| d.as_secs()).unwrap_or(0);
    let uptime = Uptime::from_secs(elapsed, unix_secs(started));

    let network = Network {
        hostname: host.hostname.unwrap_or_else(|| "unknown".to_string()),
        ip: host
            .ip
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string()),
    };

    SystemInfo {
        storage,
        ram,
        uptime,
        network,
        server: ctx.counters.snapshot(),
    }
}
