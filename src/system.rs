//! Host and process statistics collection from the /proc filesystem.
//!
//! This module reads the handful of values the sampler exports: aggregate CPU
//! times, memory usage, the exporter's own RSS, root filesystem free space and
//! the 1-minute load average.

use once_cell::sync::Lazy;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::SampleError;

/// Get system page size in bytes.
fn get_page_size() -> u64 {
    #[cfg(unix)]
    {
        // SAFETY: sysconf is safe to call with _SC_PAGESIZE
        unsafe {
            let size = libc::sysconf(libc::_SC_PAGESIZE);
            if size > 0 {
                return size as u64;
            }
        }
    }
    4096
}

/// Cached page size, resolved on first use.
pub static PAGE_SIZE: Lazy<u64> = Lazy::new(get_page_size);

/// The /proc/meminfo fields needed to derive used memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryInfo {
    pub total_bytes: u64,
    pub free_bytes: u64,
    pub buffers_bytes: u64,
    pub cached_bytes: u64,
    pub sreclaimable_bytes: u64,
}

impl MemoryInfo {
    /// Used memory: total minus free, buffers and reclaimable cache.
    ///
    /// Containers can report cache figures larger than their own total; in
    /// that case only free memory is subtracted.
    pub fn used_bytes(&self) -> u64 {
        let reclaimable = self
            .free_bytes
            .saturating_add(self.buffers_bytes)
            .saturating_add(self.cached_bytes)
            .saturating_add(self.sreclaimable_bytes);
        self.total_bytes
            .checked_sub(reclaimable)
            .unwrap_or_else(|| self.total_bytes.saturating_sub(self.free_bytes))
    }
}

/// Aggregate CPU times from the `cpu` line of /proc/stat, in clock ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTimes {
    /// Calculate total CPU time (all fields).
    pub fn total(&self) -> u64 {
        self.user
            + self.nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
    }

    /// Calculate non-active time (idle + iowait).
    pub fn idle_total(&self) -> u64 {
        self.idle + self.iowait
    }
}

/// Point-in-time CPU utilization computed against the previous observation.
///
/// Each call to [`CpuUsageTracker::update`] returns the busy percentage since
/// the last call without waiting, then remembers the new times as baseline.
#[derive(Debug, Default)]
pub struct CpuUsageTracker {
    previous: Option<CpuTimes>,
}

impl CpuUsageTracker {
    pub fn new() -> Self {
        Self { previous: None }
    }

    /// Tracker with an initial baseline, so the first update reports real usage.
    pub fn with_baseline(baseline: CpuTimes) -> Self {
        Self {
            previous: Some(baseline),
        }
    }

    /// Returns busy percent (0.0-100.0, one decimal) and stores `current` as baseline.
    ///
    /// Reports 0.0 when there is no baseline yet or no time has elapsed.
    pub fn update(&mut self, current: CpuTimes) -> f64 {
        let percent = match self.previous {
            Some(previous) => busy_percent(&previous, &current),
            None => 0.0,
        };
        self.previous = Some(current);
        percent
    }
}

fn busy_percent(previous: &CpuTimes, current: &CpuTimes) -> f64 {
    let delta_total = current.total().saturating_sub(previous.total());
    if delta_total == 0 {
        return 0.0;
    }
    let busy_prev = previous.total().saturating_sub(previous.idle_total());
    let busy_now = current.total().saturating_sub(current.idle_total());
    let delta_busy = busy_now.saturating_sub(busy_prev);

    let percent = (delta_busy as f64 / delta_total as f64 * 100.0).clamp(0.0, 100.0);
    (percent * 10.0).round() / 10.0
}

/// Reader for a procfs tree. Production uses `/proc`; tests point it at a fake tree.
#[derive(Debug, Clone)]
pub struct ProcReader {
    root: PathBuf,
}

impl ProcReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, relative: &str) -> Result<(PathBuf, String), SampleError> {
        let path = self.root.join(relative);
        match fs::read_to_string(&path) {
            Ok(content) => Ok((path, content)),
            Err(e) => Err(SampleError::io(path, e)),
        }
    }

    /// Reads aggregate CPU times from `stat`.
    pub fn read_cpu_times(&self) -> Result<CpuTimes, SampleError> {
        let (path, content) = self.read("stat")?;
        parse_cpu_times(&content, &path)
    }

    /// Reads memory fields from `meminfo`.
    pub fn read_memory_info(&self) -> Result<MemoryInfo, SampleError> {
        let (path, content) = self.read("meminfo")?;
        parse_meminfo(&content, &path)
    }

    /// Reads resident memory of the current process from `self/statm`, in bytes.
    pub fn read_self_rss_bytes(&self) -> Result<u64, SampleError> {
        let (path, content) = self.read("self/statm")?;
        // Format: "size resident shared text lib data dt" (pages)
        let field = content
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| SampleError::missing(&path, "resident"))?;
        let pages = field
            .parse::<u64>()
            .map_err(|_| SampleError::parse(&path, "resident", field))?;
        Ok(pages * *PAGE_SIZE)
    }

    /// Reads the 1-minute load average. Returns `Ok(None)` when the kernel does not expose it.
    pub fn read_load_average(&self) -> Result<Option<f64>, SampleError> {
        let path = self.root.join("loadavg");
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SampleError::io(path, e)),
        };
        parse_load_average(&content, &path).map(Some)
    }
}

/// Parses the aggregate `cpu` line of /proc/stat.
///
/// Format: "cpu  user nice system idle iowait irq softirq steal guest guest_nice"
pub fn parse_cpu_times(content: &str, path: &Path) -> Result<CpuTimes, SampleError> {
    let line = content
        .lines()
        .find(|l| l.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| SampleError::missing(path, "cpu"))?;

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 5 {
        return Err(SampleError::parse(path, "cpu", line));
    }

    let field = |idx: usize| -> Result<u64, SampleError> {
        match parts.get(idx) {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| SampleError::parse(path, "cpu", raw)),
            // Older kernels omit the trailing columns
            None => Ok(0),
        }
    };

    Ok(CpuTimes {
        user: field(1)?,
        nice: field(2)?,
        system: field(3)?,
        idle: field(4)?,
        iowait: field(5)?,
        irq: field(6)?,
        softirq: field(7)?,
        steal: field(8)?,
    })
}

/// Parses the /proc/meminfo fields used by [`MemoryInfo`]. Values are in kB.
pub fn parse_meminfo(content: &str, path: &Path) -> Result<MemoryInfo, SampleError> {
    let mut total: Option<u64> = None;
    let mut free: Option<u64> = None;
    let mut buffers: Option<u64> = None;
    let mut cached: Option<u64> = None;
    let mut sreclaimable: Option<u64> = None;

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(raw)) = (parts.next(), parts.next()) else {
            continue;
        };
        let slot = match key {
            "MemTotal:" => &mut total,
            "MemFree:" => &mut free,
            "Buffers:" => &mut buffers,
            "Cached:" => &mut cached,
            "SReclaimable:" => &mut sreclaimable,
            _ => continue,
        };
        let kb = raw
            .parse::<u64>()
            .map_err(|_| SampleError::parse(path, "meminfo value", raw))?;
        *slot = Some(kb * 1024);
    }

    Ok(MemoryInfo {
        total_bytes: total.ok_or_else(|| SampleError::missing(path, "MemTotal"))?,
        free_bytes: free.ok_or_else(|| SampleError::missing(path, "MemFree"))?,
        buffers_bytes: buffers.unwrap_or(0),
        cached_bytes: cached.unwrap_or(0),
        sreclaimable_bytes: sreclaimable.unwrap_or(0),
    })
}

/// Parses the 1-minute column of /proc/loadavg. Later columns are not read.
///
/// Format: "0.00 0.01 0.05 1/234 5678"
pub fn parse_load_average(content: &str, path: &Path) -> Result<f64, SampleError> {
    let raw = content
        .split_whitespace()
        .next()
        .ok_or_else(|| SampleError::missing(path, "1min load average"))?;
    raw.parse::<f64>()
        .map_err(|_| SampleError::parse(path, "1min load average", raw))
}

/// Free space available to unprivileged users on the filesystem holding `path`.
pub fn disk_free_bytes(path: &Path) -> Result<u64, SampleError> {
    use std::ffi::CString;
    use std::mem;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|e| SampleError::Statvfs {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, e),
    })?;

    // SAFETY: statvfs only writes into the zeroed struct we own, and c_path
    // is a valid NUL-terminated string for the duration of the call.
    let stat = unsafe {
        let mut stat: libc::statvfs = mem::zeroed();
        if libc::statvfs(c_path.as_ptr(), &mut stat) != 0 {
            return Err(SampleError::Statvfs {
                path: path.to_path_buf(),
                source: io::Error::last_os_error(),
            });
        }
        stat
    };

    Ok(stat.f_bavail as u64 * stat.f_frsize as u64)
}

/// Node name of this host, as reported by uname(2).
pub fn node_name() -> Result<String, SampleError> {
    use std::ffi::CStr;
    use std::mem;

    // SAFETY: libc::utsname is a C struct with only arrays of c_char
    // which are valid for zeroed memory initialization
    unsafe {
        let mut utsname: libc::utsname = mem::zeroed();
        if libc::uname(&mut utsname) != 0 {
            return Err(SampleError::Uname(io::Error::last_os_error()));
        }
        Ok(CStr::from_ptr(utsname.nodename.as_ptr())
            .to_string_lossy()
            .into_owned())
    }
}
