//! Prometheus metrics definitions for simple-metrics-exporter.
//!
//! One synthetic gauge without labels plus six host/process gauges labeled by
//! `host` and `env`. All of them are created and registered once at startup.

use prometheus::{Gauge, GaugeVec, Opts, Registry};

use crate::labels::{HostLabels, LABEL_NAMES};

/// Collection of gauges written by the sampler and exposed on `/metrics`.
#[derive(Clone)]
pub struct ExporterMetrics {
    // ========== Synthetic ==========
    pub simple_dummy_metric: Gauge,

    // ========== CPU ==========
    pub system_cpu_usage_percent: GaugeVec, // labels: host, env
    pub system_cpu_free_percent: GaugeVec,  // labels: host, env

    // ========== Memory ==========
    pub system_memory_used_bytes: GaugeVec, // labels: host, env
    pub process_memory_rss_bytes: GaugeVec, // labels: host, env

    // ========== Disk / Load ==========
    pub system_disk_free_bytes: GaugeVec, // labels: host, env
    pub system_load_avg_1min: GaugeVec,   // labels: host, env
}

fn host_gauge(name: &str, help: &str) -> Result<GaugeVec, prometheus::Error> {
    GaugeVec::new(Opts::new(name, help), &LABEL_NAMES)
}

impl ExporterMetrics {
    /// Creates and registers all metrics with the registry.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let simple_dummy_metric = Gauge::new(
            "simple_dummy_metric",
            "Simple dummy metric for Dynatrace testing",
        )?;

        let system_cpu_usage_percent = host_gauge(
            "system_cpu_usage_percent",
            "System CPU usage percentage (0-100)",
        )?;
        let system_cpu_free_percent = host_gauge(
            "system_cpu_free_percent",
            "System CPU free percentage (0-100)",
        )?;
        let system_memory_used_bytes =
            host_gauge("system_memory_used_bytes", "System memory used in bytes")?;
        let process_memory_rss_bytes = host_gauge(
            "process_memory_rss_bytes",
            "Resident Set Size (RSS) memory used by this process in bytes",
        )?;
        let system_disk_free_bytes = host_gauge(
            "system_disk_free_bytes",
            "System disk free space in bytes (root)",
        )?;
        let system_load_avg_1min =
            host_gauge("system_load_avg_1min", "System load average (1 min)")?;

        registry.register(Box::new(simple_dummy_metric.clone()))?;
        registry.register(Box::new(system_cpu_usage_percent.clone()))?;
        registry.register(Box::new(system_cpu_free_percent.clone()))?;
        registry.register(Box::new(system_memory_used_bytes.clone()))?;
        registry.register(Box::new(process_memory_rss_bytes.clone()))?;
        registry.register(Box::new(system_disk_free_bytes.clone()))?;
        registry.register(Box::new(system_load_avg_1min.clone()))?;

        Ok(Self {
            simple_dummy_metric,
            system_cpu_usage_percent,
            system_cpu_free_percent,
            system_memory_used_bytes,
            process_memory_rss_bytes,
            system_disk_free_bytes,
            system_load_avg_1min,
        })
    }

    /// Sets one labeled gauge for the given label values.
    pub fn set_labeled(gauge: &GaugeVec, labels: &HostLabels, value: f64) {
        gauge.with_label_values(&labels.values()).set(value);
    }
}
