//! Application state shared by the HTTP handlers and the sampler.
//!
//! One registry per process. It is created here and handed explicitly to the
//! sampler (through [`ExporterMetrics`]) and to the handlers.

use prometheus::Registry;
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::ExporterMetrics;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Process-wide state: the registry and the gauges registered in it.
pub struct AppState {
    pub registry: Registry,
    pub metrics: ExporterMetrics,
    /// Server start time for uptime reporting.
    pub start_time: Instant,
}

impl AppState {
    /// Creates the registry and registers every exported gauge.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let metrics = ExporterMetrics::new(&registry)?;
        Ok(Self {
            registry,
            metrics,
            start_time: Instant::now(),
        })
    }

    pub fn shared() -> Result<SharedState, prometheus::Error> {
        Self::new().map(Arc::new)
    }
}
