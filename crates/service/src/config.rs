//! Service configuration.
//!
//! Parsed from `fahrplan.toml` with environment variable overrides
//! following the `FAHRPLAN_SECTION_KEY` convention.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::transport::{Transport, DEFAULT_PORT};

/// Full configuration for the scheduling service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Request/reply channel endpoint settings.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Client-side reply timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Transport section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Transport type: "tcp" or "ipc".
    #[serde(default = "default_kind")]
    pub kind: String,

    /// TCP bind host (kind = "tcp").
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port (kind = "tcp").
    #[serde(default = "default_port")]
    pub port: u16,

    /// IPC socket name (kind = "ipc").
    #[serde(default = "default_ipc_name")]
    pub ipc_name: String,
}

fn default_kind() -> String {
    "tcp".into()
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_ipc_name() -> String {
    "fahrplan".into()
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            host: default_host(),
            port: default_port(),
            ipc_name: default_ipc_name(),
        }
    }
}

impl ServiceConfig {
    /// Parse config from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ServiceError> {
        let mut config: Self = toml::from_str(toml_str)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Resolve the configured endpoint to a [`Transport`].
    pub fn resolve_transport(&self) -> Transport {
        match self.transport.kind.as_str() {
            "ipc" => Transport::ipc(&self.transport.ipc_name),
            _ => Transport::tcp(&self.transport.host, self.transport.port),
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Convention: `FAHRPLAN_SECTION_KEY` overrides `section.key`.
    /// Examples:
    /// - `FAHRPLAN_TRANSPORT_KIND` -> `transport.kind`
    /// - `FAHRPLAN_TRANSPORT_HOST` -> `transport.host`
    /// - `FAHRPLAN_TRANSPORT_PORT` -> `transport.port`
    /// - `FAHRPLAN_TRANSPORT_IPC_NAME` -> `transport.ipc_name`
    /// - `FAHRPLAN_REQUEST_TIMEOUT_SECS` -> `request_timeout_secs`
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("FAHRPLAN_TRANSPORT_KIND") {
            self.transport.kind = v;
        }
        if let Ok(v) = std::env::var("FAHRPLAN_TRANSPORT_HOST") {
            self.transport.host = v;
        }
        if let Ok(v) = std::env::var("FAHRPLAN_TRANSPORT_PORT") {
            if let Ok(port) = v.parse::<u16>() {
                self.transport.port = port;
            }
        }
        if let Ok(v) = std::env::var("FAHRPLAN_TRANSPORT_IPC_NAME") {
            self.transport.ipc_name = v;
        }
        if let Ok(v) = std::env::var("FAHRPLAN_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = v.parse::<u64>() {
                self.request_timeout_secs = secs;
            }
        }
    }

    /// Reject configurations the transport layer cannot bind.
    pub fn validate(&self) -> Result<(), ServiceError> {
        match self.transport.kind.as_str() {
            "tcp" | "ipc" => {}
            other => {
                return Err(ServiceError::Config(format!(
                    "unknown transport kind: {other}"
                )))
            }
        }
        if self.transport.kind == "tcp" && self.transport.port == 0 {
            return Err(ServiceError::Config("transport.port must be non-zero".into()));
        }
        if self.transport.kind == "ipc" && self.transport.ipc_name.trim().is_empty() {
            return Err(ServiceError::Config(
                "transport.ipc_name must not be empty".into(),
            ));
        }
        Ok(())
    }
}
