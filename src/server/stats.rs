//! Process-wide server counters.
//!
//! Each counter is an independent relaxed atomic: increments are never lost,
//! but a snapshot taken while other workers run may mix values from
//! slightly different moments.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::SystemTime;

use serde::Serialize;

#[derive(Debug, Default)]
pub struct ServerCounters {
    total_requests: AtomicU64,
    files_transferred: AtomicU64,
    bytes_transferred: AtomicU64,
    active_connections: AtomicU64,
    /// Set by the first request served.
    started_at: OnceLock<SystemTime>,
}

/// Point-in-time copy of the counters, as reported by sysinfo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub total_requests: u64,
    pub files_transferred: u64,
    pub bytes_transferred: u64,
    pub active_connections: u64,
}

impl ServerCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.started_at.get_or_init(SystemTime::now);
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// One file moved over the wire (download or upload).
    pub fn record_transfer(&self, bytes: u64) {
        self.files_transferred.fetch_add(1, Ordering::Relaxed);
        self.bytes_transferred.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Bumps the active-connection gauge until the returned guard drops.
    pub fn connection_opened(self: &Arc<Self>) -> ActiveConnection {
        self.active_connections.fetch_add(1, Ordering::Relaxed);
        ActiveConnection {
            counters: Arc::clone(self),
        }
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at.get().copied()
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            files_transferred: self.files_transferred.load(Ordering::Relaxed),
            bytes_transferred: self.bytes_transferred.load(Ordering::Relaxed),
            active_connections: self.active_connections.load(Ordering::Relaxed),
        }
    }
}

/// Holds one slot of the active-connection gauge.
#[derive(Debug)]
pub struct ActiveConnection {
    counters: Arc<ServerCounters>,
}

impl Drop for ActiveConnection {
    fn drop(&mut self) {
        self.counters
            .active_connections
            .fetch_sub(1, Ordering::Relaxed);
    }
}
