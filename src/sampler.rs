//! Background sampling loop.
//!
//! Every tick writes a fresh synthetic value, then samples CPU, process RSS,
//! used memory, disk free space and load average into the labeled gauges.
//! The host samples share one failure boundary: the first failing read ends
//! the tick, gauges written before it keep their new values and the rest keep
//! the previous tick's values. Errors are logged and the loop carries on.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, instrument, warn};

use crate::config::{Config, EnvOverrides, EnvSource};
use crate::error::SampleError;
use crate::labels::HostLabels;
use crate::metrics::ExporterMetrics;
use crate::system::{self, CpuUsageTracker, ProcReader};

/// Range of the random base used when `METRIC_VALUE` is not set.
pub const SYNTHETIC_BASE_RANGE: (f64, f64) = (10.0, 100.0);
/// Jitter added to the synthetic base on every tick.
pub const SYNTHETIC_JITTER: f64 = 3.0;

/// Parses a `METRIC_VALUE` override. Returns `None` for unparsable or non-finite input.
pub fn parse_metric_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Computes the synthetic gauge value: override or random base, plus jitter.
pub fn synthetic_value<R: Rng + ?Sized>(base: Option<f64>, rng: &mut R) -> f64 {
    let base =
        base.unwrap_or_else(|| rng.gen_range(SYNTHETIC_BASE_RANGE.0..=SYNTHETIC_BASE_RANGE.1));
    base + rng.gen_range(-SYNTHETIC_JITTER..=SYNTHETIC_JITTER)
}

/// Owns the gauges and the OS readers for the sampling loop.
pub struct Sampler {
    metrics: ExporterMetrics,
    reader: ProcReader,
    disk_path: PathBuf,
    env_source: EnvSource,
    cpu: CpuUsageTracker,
    rng: StdRng,
    rejected_metric_value: Option<String>,
}

impl Sampler {
    /// Creates a sampler for the configured procfs root and disk path.
    ///
    /// The first tick reports 0.0 CPU usage and records the baseline for the next one.
    pub fn new(metrics: ExporterMetrics, config: &Config) -> Self {
        Self {
            metrics,
            reader: ProcReader::new(&config.proc_root),
            disk_path: config.disk_path.clone(),
            env_source: EnvSource::Process,
            cpu: CpuUsageTracker::new(),
            rng: StdRng::from_entropy(),
            rejected_metric_value: None,
        }
    }

    /// Replaces where per-tick overrides are read from.
    pub fn with_env_source(mut self, env_source: EnvSource) -> Self {
        self.env_source = env_source;
        self
    }

    /// Replaces the random source for the synthetic gauge.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Runs one tick. The synthetic gauge is always written; the returned error
    /// is the host sample that ended the tick early, if any.
    #[instrument(skip(self))]
    pub fn tick(&mut self) -> Result<(), SampleError> {
        let overrides = self.env_source.current();

        let base = self.metric_base(overrides.metric_value.as_deref());
        let value = synthetic_value(base, &mut self.rng);
        self.metrics.simple_dummy_metric.set(value);

        self.sample_host(&overrides)
    }

    /// Resolves the override base, warning once per distinct rejected value.
    fn metric_base(&mut self, raw: Option<&str>) -> Option<f64> {
        let Some(raw) = raw else {
            self.rejected_metric_value = None;
            return None;
        };
        match parse_metric_value(raw) {
            Some(v) => {
                self.rejected_metric_value = None;
                Some(v)
            }
            None => {
                if self.note_rejected(raw) {
                    warn!("Ignoring invalid METRIC_VALUE {:?}, using random base", raw);
                }
                None
            }
        }
    }

    /// Records a rejected override. Returns true when it differs from the last one.
    fn note_rejected(&mut self, raw: &str) -> bool {
        if self.rejected_metric_value.as_deref() == Some(raw) {
            return false;
        }
        self.rejected_metric_value = Some(raw.to_string());
        true
    }

    fn sample_host(&mut self, overrides: &EnvOverrides) -> Result<(), SampleError> {
        let labels = HostLabels::resolve(overrides)?;
        let m = &self.metrics;

        let cpu_percent = self.cpu.update(self.reader.read_cpu_times()?);
        ExporterMetrics::set_labeled(&m.system_cpu_usage_percent, &labels, cpu_percent);
        ExporterMetrics::set_labeled(&m.system_cpu_free_percent, &labels, 100.0 - cpu_percent);

        let rss = self.reader.read_self_rss_bytes()?;
        ExporterMetrics::set_labeled(&m.process_memory_rss_bytes, &labels, rss as f64);

        let memory = self.reader.read_memory_info()?;
        ExporterMetrics::set_labeled(
            &m.system_memory_used_bytes,
            &labels,
            memory.used_bytes() as f64,
        );

        let disk_free = system::disk_free_bytes(&self.disk_path)?;
        ExporterMetrics::set_labeled(&m.system_disk_free_bytes, &labels, disk_free as f64);

        let load_1 = self.reader.read_load_average()?.unwrap_or(0.0);
        ExporterMetrics::set_labeled(&m.system_load_avg_1min, &labels, load_1);

        debug!(
            "Sampled host={} env={}: cpu={:.1}% rss={} used={} disk_free={} load1={:.2}",
            labels.host,
            labels.env,
            cpu_percent,
            rss,
            memory.used_bytes(),
            disk_free,
            load_1
        );
        Ok(())
    }

    /// Ticks every `interval` until `shutdown` flips or its sender is dropped.
    pub async fn run(mut self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        info!("Sampler started with {:?} interval", interval);

        loop {
            if let Err(e) = self.tick() {
                error!("Error collecting metrics: {}", e);
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.changed() => {
                    break;
                }
            }
        }

        info!("Sampler stopped");
    }

    /// Spawns the loop on the runtime and returns a handle owning its cancellation signal.
    pub fn spawn(self, interval: Duration) -> SamplerHandle {
        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(self.run(interval, rx));
        SamplerHandle { shutdown: tx, task }
    }
}

/// Handle to a running sampler task.
pub struct SamplerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SamplerHandle {
    /// Signals cancellation and waits for the loop to leave its sleep.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        // The receiver only goes away if the task already ended
        let _ = self.shutdown.send(true);
        self.task.await
    }
}
