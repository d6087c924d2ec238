//! Shared fixtures for integration tests: a fake procfs tree on disk.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use simple_metrics_exporter::config::{Config, EnvOverrides, EnvSource};

pub const TEST_HOST: &str = "testhost";

/// Baseline `cpu` line: total 1000 ticks, 200 busy.
pub const STAT_BASELINE: &str = "cpu  100 0 100 800 0 0 0 0 0 0\ncpu0 100 0 100 800 0 0 0 0 0 0\n";
/// 100 more ticks, 25 of them busy.
pub const STAT_NEXT: &str = "cpu  125 0 100 875 0 0 0 0 0 0\ncpu0 125 0 100 875 0 0 0 0 0 0\n";

pub const MEMINFO: &str = "MemTotal:       16000 kB\n\
MemFree:         4000 kB\n\
MemAvailable:    9000 kB\n\
Buffers:          500 kB\n\
Cached:          3000 kB\n\
SReclaimable:     500 kB\n";
pub const MEMINFO_USED_BYTES: f64 = (8000 * 1024) as f64;

pub const LOADAVG: &str = "0.52 0.58 0.59 2/1190 12345\n";
pub const STATM: &str = "10000 256 100 10 0 500 0\n";
pub const STATM_RESIDENT_PAGES: u64 = 256;

/// Temporary directory laid out like /proc.
pub struct FakeProc {
    dir: TempDir,
}

impl FakeProc {
    pub fn new() -> Self {
        let fake = Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        };
        fake.write("stat", STAT_BASELINE);
        fake.write("meminfo", MEMINFO);
        fake.write("loadavg", LOADAVG);
        fake.write("self/statm", STATM);
        fake
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(path, content).expect("Failed to write fake proc file");
    }

    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.dir.path().join(relative)).expect("Failed to remove fake proc file");
    }

    /// Config reading from this tree; disk free space is taken from the temp dir itself.
    pub fn config(&self) -> Config {
        Config {
            proc_root: self.path().to_path_buf(),
            disk_path: self.path().to_path_buf(),
            ..Config::default()
        }
    }

    pub fn config_with_disk(&self, disk_path: PathBuf) -> Config {
        Config {
            disk_path,
            ..self.config()
        }
    }
}

/// Fixed overrides: host `testhost`, env `dev`, `METRIC_VALUE=42`.
pub fn fixed_env() -> EnvSource {
    EnvSource::Fixed(EnvOverrides {
        metric_value: Some("42".into()),
        hostname: Some(TEST_HOST.into()),
        env: None,
    })
}

pub const LABELS: [&str; 2] = [TEST_HOST, "dev"];
