//! Configuration for simple-metrics-exporter.
//!
//! The exporter has no config file and no CLI flags. Process-level settings
//! come from defaults plus `LOG_LEVEL`; the per-tick overrides (`METRIC_VALUE`,
//! `HOSTNAME`, `ENV`) are re-read by the sampler on every tick through an
//! [`EnvSource`].

use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SAMPLE_INTERVAL_SECS: u64 = 2;
pub const DEFAULT_PROC_ROOT: &str = "/proc";
pub const DEFAULT_DISK_PATH: &str = "/";
pub const DEFAULT_ENV_LABEL: &str = "dev";

/// Environment variable names.
pub const ENV_METRIC_VALUE: &str = "METRIC_VALUE";
pub const ENV_HOSTNAME: &str = "HOSTNAME";
pub const ENV_ENV: &str = "ENV";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

/// Log level options accepted in `LOG_LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Parses a level name case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" => Some(LogLevel::Off),
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    /// Maximum tracing level for the subscriber. `None` disables output.
    pub fn as_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// Effective process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    pub sample_interval: Duration,
    /// Root of the procfs tree the sampler reads from.
    pub proc_root: PathBuf,
    /// Filesystem path whose free space is reported.
    pub disk_path: PathBuf,
    pub log_level: LogLevel,
    /// Set when `LOG_LEVEL` held something unrecognized. Reported once logging is up.
    pub invalid_log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            sample_interval: Duration::from_secs(DEFAULT_SAMPLE_INTERVAL_SECS),
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
            disk_path: PathBuf::from(DEFAULT_DISK_PATH),
            log_level: LogLevel::Info,
            invalid_log_level: None,
        }
    }
}

impl Config {
    /// Socket address string for the HTTP listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Resolves the effective configuration: defaults, then `LOG_LEVEL`.
pub fn resolve_config() -> Config {
    apply_log_level(Config::default(), std::env::var(ENV_LOG_LEVEL).ok())
}

fn apply_log_level(mut config: Config, raw: Option<String>) -> Config {
    if let Some(raw) = raw {
        match LogLevel::parse(&raw) {
            Some(level) => config.log_level = level,
            None => config.invalid_log_level = Some(raw),
        }
    }
    config
}

/// Validate effective config (used at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if cfg.sample_interval.is_zero() {
        return Err("sample_interval must be greater than zero".into());
    }

    if cfg.disk_path.as_os_str().is_empty() {
        return Err("disk_path must not be empty".into());
    }

    if cfg.bind.trim().is_empty() {
        return Err("bind address must not be empty".into());
    }

    Ok(())
}

/// Per-tick environment overrides, captured as raw strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub metric_value: Option<String>,
    pub hostname: Option<String>,
    pub env: Option<String>,
}

impl EnvOverrides {
    /// Snapshot of the current process environment.
    pub fn from_process_env() -> Self {
        Self {
            metric_value: std::env::var(ENV_METRIC_VALUE).ok(),
            hostname: std::env::var(ENV_HOSTNAME).ok(),
            env: std::env::var(ENV_ENV).ok(),
        }
    }
}

/// Where the sampler reads its per-tick overrides from.
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    /// Re-read the process environment on every tick.
    #[default]
    Process,
    /// Always use the given values.
    Fixed(EnvOverrides),
}

impl EnvSource {
    pub fn current(&self) -> EnvOverrides {
        match self {
            EnvSource::Process => EnvOverrides::from_process_env(),
            EnvSource::Fixed(overrides) => overrides.clone(),
        }
    }
}
