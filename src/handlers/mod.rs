//! HTTP endpoint handlers for the exporter.
//!
//! This module provides handlers for the two HTTP endpoints:
//! - `/`: Fixed informational text
//! - `/metrics`: Prometheus metrics endpoint

pub mod metrics;
pub mod root;

// Re-export handlers
pub use metrics::{metrics_handler, METRICS_CONTENT_TYPE};
pub use root::{root_handler, ROOT_TEXT};
