//! Network configuration
//!
//! Values come from defaults, then an optional JSON file, then
//! `AGENTNET_*` environment variables.

use crate::error::{ConfigError, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const ENV_PREFIX: &str = "AGENTNET_";

/// Settings shared by the host, discovery client and orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkConfig {
    /// Interface agent listeners bind to
    pub bind_host: String,
    /// Host name written into endpoints
    pub advertise_host: String,
    pub port_range_start: u16,
    pub port_range_end: u16,
    pub max_port_attempts: u32,
    pub ready_timeout_ms: u64,
    pub shutdown_timeout_ms: u64,
    pub probe_timeout_ms: u64,
    pub request_timeout_ms: u64,
    /// Agent used when no candidate matches a query
    pub default_agent: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_host: "127.0.0.1".to_string(),
            advertise_host: "localhost".to_string(),
            port_range_start: 49152,
            port_range_end: 65535,
            max_port_attempts: 64,
            ready_timeout_ms: 2_000,
            shutdown_timeout_ms: 2_000,
            probe_timeout_ms: 2_000,
            request_timeout_ms: 30_000,
            default_agent: None,
        }
    }
}

impl NetworkConfig {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("agentnet").join("config.json"))
    }

    /// Load from an explicit file, or the default location when present,
    /// then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading config: {:?}", path);
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(ConfigError::Load {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            Error::Config(ConfigError::Load {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        })
    }

    /// Apply `AGENTNET_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(host) = var("BIND_HOST") {
            self.bind_host = host;
        }
        if let Some(host) = var("ADVERTISE_HOST") {
            self.advertise_host = host;
        }
        if let Some(range) = var("PORT_RANGE") {
            let (start, end) = parse_port_range(&range)?;
            self.port_range_start = start;
            self.port_range_end = end;
        }
        if let Some(ms) = var("PROBE_TIMEOUT_MS") {
            self.probe_timeout_ms = parse_number("AGENTNET_PROBE_TIMEOUT_MS", &ms)?;
        }
        if let Some(ms) = var("REQUEST_TIMEOUT_MS") {
            self.request_timeout_ms = parse_number("AGENTNET_REQUEST_TIMEOUT_MS", &ms)?;
        }
        if let Some(agent) = var("DEFAULT_AGENT") {
            self.default_agent = Some(agent).filter(|a| !a.is_empty());
        }

        debug!("Effective config: {:?}", self);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.port_range_start == 0 || self.port_range_start > self.port_range_end {
            return Err(invalid(
                "portRange",
                format!("{}-{} is empty", self.port_range_start, self.port_range_end),
            ));
        }
        if self.max_port_attempts == 0 {
            return Err(invalid("maxPortAttempts", "must be at least 1"));
        }
        let timeouts = [
            ("readyTimeoutMs", self.ready_timeout_ms),
            ("shutdownTimeoutMs", self.shutdown_timeout_ms),
            ("probeTimeoutMs", self.probe_timeout_ms),
            ("requestTimeoutMs", self.request_timeout_ms),
        ];
        for (key, value) in timeouts {
            if value == 0 {
                return Err(invalid(key, "timeouts must be non-zero"));
            }
        }
        Ok(())
    }

    pub fn contains_port(&self, port: u16) -> bool {
        (self.port_range_start..=self.port_range_end).contains(&port)
    }

    pub fn endpoint_for(&self, port: u16) -> String {
        format!("http://{}:{}", self.advertise_host, port)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> Error {
    Error::Config(ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    })
}

fn parse_number(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| invalid(key, format!("{:?} is not a number", raw)))
}

fn parse_port_range(raw: &str) -> Result<(u16, u16)> {
    let (start, end) = raw
        .split_once('-')
        .ok_or_else(|| invalid("AGENTNET_PORT_RANGE", "expected start-end"))?;
    let start = start
        .trim()
        .parse()
        .map_err(|_| invalid("AGENTNET_PORT_RANGE", format!("bad start {:?}", start)))?;
    let end = end
        .trim()
        .parse()
        .map_err(|_| invalid("AGENTNET_PORT_RANGE", format!("bad end {:?}", end)))?;
    Ok((start, end))
}
