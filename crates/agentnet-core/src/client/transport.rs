//! Point-to-point calls to agent endpoints

use crate::config::NetworkConfig;
use crate::error::{Error, Result, TransportError};
use crate::protocol::ProtocolHandler;
use crate::types::{AgentDescriptor, JsonRpcRequest, JsonRpcResponse, Message, Task, AGENT_CARD_PATH};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace};

/// Calls a single agent endpoint
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AgentTransport: Send + Sync {
    /// Fetch the descriptor an agent serves at its well-known path
    async fn fetch_descriptor(&self, endpoint: &str) -> Result<AgentDescriptor>;

    /// `message/send`
    async fn send_message(&self, endpoint: &str, message: Message) -> Result<Message>;

    /// `tasks/send`
    async fn send_task(&self, endpoint: &str, task: Task) -> Result<Task>;
}

/// JSON-RPC over HTTP POST
pub struct HttpTransport {
    client: reqwest::Client,
    protocol: ProtocolHandler,
    probe_timeout: Duration,
    request_timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            protocol: ProtocolHandler::new(),
            probe_timeout: config.probe_timeout(),
            request_timeout: config.request_timeout(),
        })
    }

    async fn call(&self, endpoint: &str, request: JsonRpcRequest) -> Result<JsonRpcResponse> {
        let url = format!("{}/", endpoint.trim_end_matches('/'));
        debug!("-> {} {}", url, request.method);

        bounded(endpoint, self.request_timeout, async {
            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(transport_error)?
                .error_for_status()
                .map_err(transport_error)?;
            let body: JsonRpcResponse = response.json().await.map_err(transport_error)?;
            trace!("<- {} {:?}", url, body.id);
            Ok(body)
        })
        .await
    }
}

#[async_trait]
impl AgentTransport for HttpTransport {
    async fn fetch_descriptor(&self, endpoint: &str) -> Result<AgentDescriptor> {
        let url = format!("{}{}", endpoint.trim_end_matches('/'), AGENT_CARD_PATH);
        trace!("Probing {}", url);

        bounded(endpoint, self.probe_timeout, async {
            self.client
                .get(&url)
                .send()
                .await
                .map_err(transport_error)?
                .error_for_status()
                .map_err(transport_error)?
                .json::<AgentDescriptor>()
                .await
                .map_err(transport_error)
        })
        .await
    }

    async fn send_message(&self, endpoint: &str, message: Message) -> Result<Message> {
        let request = self.protocol.create_message_send_request(&message)?;
        let response = self.call(endpoint, request).await?;
        self.protocol.parse_message_response(response)
    }

    async fn send_task(&self, endpoint: &str, task: Task) -> Result<Task> {
        let request = self.protocol.create_task_send_request(&task)?;
        let response = self.call(endpoint, request).await?;
        self.protocol.parse_task_response(response)
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    Error::Transport(TransportError::from(err))
}

/// Run `fut`, failing with `Timeout` once `limit` elapses
/// Run `fut`, mapping an elapsed `limit` to `TransportError::Timeout`
pub(crate) async fn bounded<T, F>(endpoint: &str, limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::Transport(TransportError::Timeout {
            endpoint: endpoint.to_string(),
        })),
    }
}
