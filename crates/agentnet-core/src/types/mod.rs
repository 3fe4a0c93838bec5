//! Core type definitions for AgentNet
//!
//! This module contains all shared types used across the crate,
//! including agent descriptors, messages, tasks and JSON-RPC envelopes.

mod agent_types;
mod message_types;
mod rpc_types;
mod task_types;

pub use agent_types::*;
pub use message_types::*;
pub use rpc_types::*;
pub use task_types::*;

use serde::{Deserialize, Serialize};

/// Payload carried by a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: String },
    Data { data: serde_json::Value },
    Error { message: String },
}

impl MessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Text view used for routing and forwarding.
    ///
    /// Structured data is rendered as compact JSON; error content has no text.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text { text } => Some(text.clone()),
            Self::Data { data } => Some(data.to_string()),
            Self::Error { .. } => None,
        }
    }
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::text("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_tagging() {
        let json = serde_json::to_value(MessageContent::text("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "text", "text": "hi"}));

        let back: MessageContent =
            serde_json::from_value(serde_json::json!({"type": "error", "message": "boom"})).unwrap();
        assert_eq!(back, MessageContent::error("boom"));
        assert_eq!(back.as_text(), None);
    }

    #[test]
    fn test_data_content_renders_as_json() {
        let content = MessageContent::Data {
            data: serde_json::json!({"city": "Tokyo"}),
        };
        assert_eq!(content.as_text().unwrap(), r#"{"city":"Tokyo"}"#);
    }
}
