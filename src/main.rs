//! simple-metrics-exporter - version 0.1.0
//!
//! Samples host statistics in the background and serves them on `/metrics`.
//! This is the main entry point that wires the sampler and the HTTP server.

use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

use simple_metrics_exporter::config::{resolve_config, validate_effective_config, Config};
use simple_metrics_exporter::sampler::Sampler;
use simple_metrics_exporter::server::{build_router, serve};
use simple_metrics_exporter::state::AppState;

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let Some(level) = config.log_level.as_tracing_level() else {
        return Ok(());
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Logging initialized with level: {:?}", config.log_level);
    if let Some(raw) = &config.invalid_log_level {
        warn!("Unknown LOG_LEVEL {:?}, using info", raw);
    }
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config();
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }

    setup_logging(&config)?;

    info!("Starting simple-metrics-exporter");

    let state = AppState::shared()?;

    let sampler = Sampler::new(state.metrics.clone(), &config).spawn(config.sample_interval);

    let listener = TcpListener::bind(config.listen_addr()).await?;
    let app = build_router(state.clone());

    serve(listener, app, shutdown_signal()).await?;

    sampler.shutdown().await?;

    info!(
        "simple-metrics-exporter stopped gracefully after {:?}",
        state.start_time.elapsed()
    );
    Ok(())
}
