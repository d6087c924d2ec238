//! Host and environment label resolution.

use crate::config::{EnvOverrides, DEFAULT_ENV_LABEL};
use crate::error::SampleError;
use crate::system;

/// Label names shared by every labeled gauge, in declaration order.
pub const LABEL_NAMES: [&str; 2] = ["host", "env"];

/// Values for the `host` and `env` labels of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostLabels {
    pub host: String,
    pub env: String,
}

impl HostLabels {
    /// Resolves labels from the overrides, falling back to the node name and `"dev"`.
    pub fn resolve(overrides: &EnvOverrides) -> Result<Self, SampleError> {
        let host = match &overrides.hostname {
            Some(host) => host.clone(),
            None => system::node_name()?,
        };
        let env = overrides
            .env
            .clone()
            .unwrap_or_else(|| DEFAULT_ENV_LABEL.to_string());
        Ok(Self { host, env })
    }

    /// Label values in the same order as [`LABEL_NAMES`].
    pub fn values(&self) -> [&str; 2] {
        [&self.host, &self.env]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win() {
        let overrides = EnvOverrides {
            metric_value: None,
            hostname: Some("myhost".into()),
            env: Some("prod".into()),
        };
        let labels = HostLabels::resolve(&overrides).unwrap();
        assert_eq!(labels.values(), ["myhost", "prod"]);
    }

    #[test]
    fn test_defaults() {
        let labels = HostLabels::resolve(&EnvOverrides::default()).unwrap();
        assert_eq!(labels.env, "dev");
        assert_eq!(labels.host, system::node_name().unwrap());
    }
}
