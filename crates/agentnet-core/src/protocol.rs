//! JSON-RPC message handling for the agent wire protocol

use crate::error::{Error, Result, TransportError};
use crate::types::{
    AgentDescriptor, JsonRpcRequest, JsonRpcResponse, Message, Task, METHOD_AGENT_CARD,
    METHOD_MESSAGE_SEND, METHOD_TASKS_SEND, PARSE_ERROR,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{trace, warn};

/// Builds requests and interprets responses on both sides of the wire
#[derive(Debug)]
pub struct ProtocolHandler {
    request_id: AtomicU64,
}

impl ProtocolHandler {
    pub fn new() -> Self {
        Self {
            request_id: AtomicU64::new(1),
        }
    }

    /// Generate next request ID
    pub fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Create message/send request
    pub fn create_message_send_request(&self, message: &Message) -> Result<JsonRpcRequest> {
        Ok(JsonRpcRequest::new(
            self.next_id(),
            METHOD_MESSAGE_SEND,
            Some(serde_json::to_value(message)?),
        ))
    }

    /// Create tasks/send request
    pub fn create_task_send_request(&self, task: &Task) -> Result<JsonRpcRequest> {
        Ok(JsonRpcRequest::new(
            self.next_id(),
            METHOD_TASKS_SEND,
            Some(serde_json::to_value(task)?),
        ))
    }

    /// Create agent/card request
    pub fn create_card_request(&self) -> JsonRpcRequest {
        JsonRpcRequest::new(self.next_id(), METHOD_AGENT_CARD, None)
    }

    pub fn parse_message_response(&self, response: JsonRpcResponse) -> Result<Message> {
        self.parse_result(response)
    }

    pub fn parse_task_response(&self, response: JsonRpcResponse) -> Result<Task> {
        self.parse_result(response)
    }

    pub fn parse_card_response(&self, response: JsonRpcResponse) -> Result<AgentDescriptor> {
        self.parse_result(response)
    }

    fn parse_result<T: DeserializeOwned>(&self, response: JsonRpcResponse) -> Result<T> {
        if let Some(error) = response.error {
            warn!("Agent returned error {}: {}", error.code, error.message);
            return Err(Error::Transport(TransportError::Remote {
                code: error.code,
                message: error.message,
            }));
        }

        let result = response.result.ok_or_else(|| {
            Error::Transport(TransportError::Protocol(
                "response has neither result nor error".to_string(),
            ))
        })?;

        serde_json::from_value(result)
            .map_err(|e| Error::Transport(TransportError::Protocol(e.to_string())))
    }

    /// Decode an inbound request, or the error response to send back
    pub fn parse_request(&self, body: &[u8]) -> std::result::Result<JsonRpcRequest, JsonRpcResponse> {
        serde_json::from_slice(body).map_err(|e| {
            trace!("Unparseable request: {}", e);
            self.create_error_response(None, PARSE_ERROR, &e.to_string())
        })
    }

    /// Create a success response carrying `result`
    pub fn create_success_response<T: Serialize>(
        &self,
        id: Option<serde_json::Value>,
        result: &T,
    ) -> Result<JsonRpcResponse> {
        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }

    /// Create an error response
    pub fn create_error_response(
        &self,
        id: Option<serde_json::Value>,
        code: i32,
        message: &str,
    ) -> JsonRpcResponse {
        JsonRpcResponse::failure(id, code, message)
    }
}

impl Default for ProtocolHandler {
    fn default() -> Self {
        Self::new()
    }
}
