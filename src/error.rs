//! Error types for host statistics sampling.

use std::io;
use std::path::PathBuf;

/// Failure while reading one host or process statistic.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {field} from {}: {value:?}", path.display())]
    Parse {
        path: PathBuf,
        field: &'static str,
        value: String,
    },

    #[error("Missing {field} in {}", path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("statvfs failed for {}: {source}", path.display())]
    Statvfs {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("uname failed: {0}")]
    Uname(#[source] io::Error),
}

impl SampleError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SampleError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, field: &'static str, value: &str) -> Self {
        SampleError::Parse {
            path: path.into(),
            field,
            value: value.to_string(),
        }
    }

    pub(crate) fn missing(path: impl Into<PathBuf>, field: &'static str) -> Self {
        SampleError::MissingField {
            path: path.into(),
            field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_path() {
        let err = SampleError::io(
            "/proc/loadavg",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "Failed to read /proc/loadavg: denied");

        let err = SampleError::parse("/proc/meminfo", "MemTotal", "abc");
        assert_eq!(
            err.to_string(),
            "Failed to parse MemTotal from /proc/meminfo: \"abc\""
        );

        let err = SampleError::missing("/proc/stat", "cpu");
        assert_eq!(err.to_string(), "Missing cpu in /proc/stat");
    }
}
