//! Shared handler state.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use proctor_core::api::{MonitorHandle, PersistenceSink};
use tokio::sync::broadcast;

/// Cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub session_id: String,
    pub monitor: MonitorHandle,
    pub sink: Arc<dyn PersistenceSink>,
    pub stats: Arc<RwLock<ServerStats>>,
    pub shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    /// Session id is taken from the monitor.
    pub fn new(
        monitor: MonitorHandle,
        sink: Arc<dyn PersistenceSink>,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        Self {
            session_id: monitor.session_id().to_string(),
            monitor,
            sink,
            stats: Arc::new(RwLock::new(ServerStats::new())),
            shutdown_tx,
        }
    }

    /// Bumps the request counters; a poisoned lock skips the update.
    pub fn record_request(&self, route: &str) {
        if let Ok(mut stats) = self.stats.write() {
            stats.increment_request(route);
        }
    }

    /// Counts a handler failure (I/O, not validation).
    pub fn record_error(&self) {
        if let Ok(mut stats) = self.stats.write() {
            stats.increment_error();
        }
    }
}

/// Request counters reported by `GET /health`.
#[derive(Debug)]
pub struct ServerStats {
    started_at: Instant,
    pub requests_total: u64,
    pub errors_total: u64,
    pub per_route: HashMap<String, u64>,
}

impl ServerStats {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            requests_total: 0,
            errors_total: 0,
            per_route: HashMap::new(),
        }
    }

    pub fn increment_request(&mut self, route: &str) {
        self.requests_total += 1;
        *self.per_route.entry(route.to_string()).or_insert(0) += 1;
    }

    pub fn increment_error(&mut self) {
        self.errors_total += 1;
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}
