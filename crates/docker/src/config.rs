//! Manager configuration
//!
//! [`ManagerConfig`] is derived from the core [`DockerConfig`](hoist_core::config::DockerConfig)
//! and holds the settings [`DockerManager`](crate::manager::DockerManager) uses.
//!
//! # Example
//! ```ignore
//! use hoist_core::config::HoistConfig;
//! use hoist_docker::config::ManagerConfig;
//!
//! let core_config = HoistConfig::default();
//! let config = ManagerConfig::from_core(&core_config.docker);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Upper bounds for configuration values
const MAX_CONNECT_TIMEOUT_SECS: u64 = 3600;
const MAX_CONCURRENT_INSPECTIONS: usize = 256;

/// Query manager configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Docker socket path
    pub socket: String,
    /// Engine request timeout in seconds
    pub connect_timeout_secs: u64,
    /// Maximum concurrent inspect calls during network lookups
    pub max_concurrent_inspections: usize,
    /// Hostname used to find our own container (OS hostname when unset)
    pub hostname: Option<String>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            socket: "/var/run/docker.sock".to_owned(),
            connect_timeout_secs: 120,
            max_concurrent_inspections: 16,
            hostname: None,
        }
    }
}

impl ManagerConfig {
    /// Builds the manager configuration from the core `DockerConfig`.
    pub fn from_core(core: &hoist_core::config::DockerConfig) -> Self {
        Self {
            socket: core.socket.clone(),
            connect_timeout_secs: core.connect_timeout_secs,
            max_concurrent_inspections: core.max_concurrent_inspections,
            hostname: core.hostname.clone(),
        }
    }

    /// Validates the configured values.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.socket.is_empty() {
            return Err(EngineError::Config {
                field: "socket".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > MAX_CONNECT_TIMEOUT_SECS {
            return Err(EngineError::Config {
                field: "connect_timeout_secs".to_owned(),
                reason: format!("must be 1-{MAX_CONNECT_TIMEOUT_SECS}"),
            });
        }

        if self.max_concurrent_inspections == 0
            || self.max_concurrent_inspections > MAX_CONCURRENT_INSPECTIONS
        {
            return Err(EngineError::Config {
                field: "max_concurrent_inspections".to_owned(),
                reason: format!("must be 1-{MAX_CONCURRENT_INSPECTIONS}"),
            });
        }

        if self.hostname.as_deref().is_some_and(str::is_empty) {
            return Err(EngineError::Config {
                field: "hostname".to_owned(),
                reason: "must not be empty when set".to_owned(),
            });
        }

        Ok(())
    }
}

/// Builder for [`ManagerConfig`]
#[derive(Default)]
pub struct ManagerConfigBuilder {
    config: ManagerConfig,
}

impl ManagerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn socket(mut self, socket: impl Into<String>) -> Self {
        self.config.socket = socket.into();
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = secs;
        self
    }

    pub fn max_concurrent_inspections(mut self, max: usize) -> Self {
        self.config.max_concurrent_inspections = max;
        self
    }

    /// Pins the hostname used to find our own container.
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.config.hostname = Some(hostname.into());
        self
    }

    /// Validates and builds the `ManagerConfig`.
    pub fn build(self) -> Result<ManagerConfig, EngineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        ManagerConfig::default().validate().unwrap();
    }

    #[test]
    fn from_core_preserves_values() {
        let core = hoist_core::config::DockerConfig {
            socket: "/run/user/1000/docker.sock".to_owned(),
            connect_timeout_secs: 30,
            max_concurrent_inspections: 4,
            hostname: Some("builder-7".to_owned()),
        };
        let config = ManagerConfig::from_core(&core);
        assert_eq!(config.socket, "/run/user/1000/docker.sock");
        assert_eq!(config.connect_timeout_secs, 30);
        assert_eq!(config.max_concurrent_inspections, 4);
        assert_eq!(config.hostname.as_deref(), Some("builder-7"));
    }

    #[test]
    fn validate_rejects_empty_socket() {
        let config = ManagerConfig {
            socket: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let config = ManagerConfig {
            connect_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_excessive_inspections() {
        let config = ManagerConfig {
            max_concurrent_inspections: MAX_CONCURRENT_INSPECTIONS + 1,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_concurrent_inspections"));
    }

    #[test]
    fn validate_rejects_empty_hostname() {
        let config = ManagerConfig {
            hostname: Some(String::new()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn builder_sets_fields() {
        let config = ManagerConfigBuilder::new()
            .socket("/tmp/docker.sock")
            .connect_timeout_secs(10)
            .max_concurrent_inspections(2)
            .hostname("ci-runner")
            .build()
            .unwrap();
        assert_eq!(config.socket, "/tmp/docker.sock");
        assert_eq!(config.max_concurrent_inspections, 2);
        assert_eq!(config.hostname.as_deref(), Some("ci-runner"));
    }

    #[test]
    fn builder_rejects_invalid() {
        assert!(
            ManagerConfigBuilder::new()
                .max_concurrent_inspections(0)
                .build()
                .is_err()
        );
    }
}
