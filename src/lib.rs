//! Simple Metrics Exporter Library
//!
//! A minimal Prometheus exporter. A background [`sampler::Sampler`] refreshes a
//! fixed set of gauges every two seconds and the HTTP server built by
//! [`server::build_router`] serves the latest values on `/metrics`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use simple_metrics_exporter::config::Config;
//! use simple_metrics_exporter::sampler::Sampler;
//! use simple_metrics_exporter::server::build_router;
//! use simple_metrics_exporter::state::AppState;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let state = AppState::shared()?;
//!
//! let sampler = Sampler::new(state.metrics.clone(), &config).spawn(config.sample_interval);
//! let app = build_router(state);
//! let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
//! axum::serve(listener, app).await?;
//! sampler.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod labels;
pub mod metrics;
pub mod sampler;
pub mod server;
pub mod state;
pub mod system;

// Re-export main types for convenience
pub use config::{Config, EnvOverrides, EnvSource};
pub use error::SampleError;
pub use sampler::{Sampler, SamplerHandle};
pub use state::{AppState, SharedState};
