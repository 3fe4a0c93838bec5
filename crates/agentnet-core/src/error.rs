//! Error types for AgentNet Core

use thiserror::Error;

/// Main error type for AgentNet operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Agent lookup and lifecycle errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Agent not found: {0}")]
    NotFound(String),

    #[error("Agent already running: {0}")]
    AlreadyRunning(String),

    #[error("Agent not running: {0}")]
    NotRunning(String),

    #[error("Agent is still starting: {0}")]
    Busy(String),

    #[error("Invalid agent configuration: {0}")]
    InvalidConfig(String),

    #[error("Agent {agent} failed to handle request: {reason}")]
    Handler { agent: String, reason: String },
}

/// Errors raised while bringing an agent listener up or down
#[derive(Error, Debug)]
pub enum HostError {
    #[error("No free port in {start}-{end} after {attempts} attempts")]
    PortExhausted { start: u16, end: u16, attempts: u32 },

    #[error("Listener for {agent} failed to bind: {reason}")]
    BindFailed { agent: String, reason: String },

    #[error("Listener for {agent} stopped unexpectedly: {reason}")]
    ListenerFailed { agent: String, reason: String },
}

/// Point-to-point call failures
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request to {endpoint} timed out")]
    Timeout { endpoint: String },

    #[error("Connection to {endpoint} failed: {reason}")]
    Connection { endpoint: String, reason: String },

    #[error("Agent returned error {code}: {message}")]
    Remote { code: i32, message: String },

    #[error("Malformed response: {0}")]
    Protocol(String),
}

/// Query routing errors
#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("No agents available for routing")]
    NoAgents,

    #[error("No agent matches query: {0}")]
    NoMatch(String),
}

/// Workflow validation errors
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Workflow has no steps")]
    Empty,

    #[error("Unknown agent in workflow at step {step}: {agent}")]
    UnknownAgent { step: usize, agent: String },
}

/// Configuration and input parsing errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port specification: {spec} ({reason})")]
    InvalidPortSpec { spec: String, reason: String },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to read config {path}: {reason}")]
    Load { path: String, reason: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        if err.is_timeout() {
            TransportError::Timeout { endpoint }
        } else if err.is_decode() {
            TransportError::Protocol(err.to_string())
        } else {
            TransportError::Connection {
                endpoint,
                reason: err.to_string(),
            }
        }
    }
}

impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_step() {
        let err: Error = WorkflowError::UnknownAgent {
            step: 1,
            agent: "doesNotExist".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Workflow error: Unknown agent in workflow at step 1: doesNotExist"
        );
    }

    #[test]
    fn test_error_serializes_as_string() {
        let err = Error::Routing(RoutingError::NoAgents);
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Routing error: No agents available for routing\"");
    }
}
