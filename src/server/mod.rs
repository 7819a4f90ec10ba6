//! Connection supervision and process-wide state.

pub mod listener;
pub mod stats;

use std::sync::Arc;

use crate::config::Config;
use crate::server::stats::ServerCounters;
use crate::telemetry::{HostTelemetry, TelemetryProvider};

/// Everything a worker needs, shared by all connections.
#[derive(Clone)]
pub struct ServerContext {
    pub config: Arc<Config>,
    pub counters: Arc<ServerCounters>,
    pub telemetry: Arc<dyn TelemetryProvider>,
}

impl ServerContext {
    pub fn new(config: Config) -> Self {
        Self::with_telemetry(config, Arc::new(HostTelemetry))
    }

    pub fn with_telemetry(config: Config, telemetry: Arc<dyn TelemetryProvider>) -> Self {
        Self {
            config: Arc::new(config),
            counters: Arc::new(ServerCounters::new()),
            telemetry,
        }
    }
}
