//! HTTP listener for one hosted agent

use super::registry::AgentRegistry;
use crate::agent::Agent;
use crate::error::{HostError, Result};
use crate::protocol::ProtocolHandler;
use crate::types::{
    AgentDescriptor, JsonRpcRequest, JsonRpcResponse, Message, Task, AGENT_CARD_PATH,
    INTERNAL_ERROR, INVALID_PARAMS, METHOD_AGENT_CARD, METHOD_MESSAGE_SEND, METHOD_NOT_FOUND,
    METHOD_TASKS_SEND,
};
use axum::{body::Bytes, extract::State, routing::get, routing::post, Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

#[derive(Clone)]
struct ServerState {
    name: Arc<str>,
    agent: Arc<dyn Agent>,
    descriptor: Arc<AgentDescriptor>,
    protocol: Arc<ProtocolHandler>,
}

/// Routes for the descriptor and the JSON-RPC endpoint
pub(crate) fn router(name: &str, agent: Arc<dyn Agent>, descriptor: Arc<AgentDescriptor>) -> Router {
    let state = ServerState {
        name: Arc::from(name),
        agent,
        descriptor,
        protocol: Arc::new(ProtocolHandler::new()),
    };

    Router::new()
        .route(AGENT_CARD_PATH, get(agent_card))
        .route("/", post(handle_rpc))
        .with_state(state)
}

/// Serve `app` on an already bound listener.
///
/// The task reports its address on `ready_tx` before serving and runs until
/// `shutdown_rx` fires or its sender is dropped. If serving fails the agent's
/// handle is removed from `registry`.
pub(crate) fn spawn_listener(
    name: String,
    listener: TcpListener,
    app: Router,
    ready_tx: oneshot::Sender<SocketAddr>,
    shutdown_rx: oneshot::Receiver<()>,
    registry: AgentRegistry,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(e) => {
                error!("Listener for {} has no local address: {}", name, e);
                return;
            }
        };

        info!("Starting {} agent server on {}", name, addr);
        if ready_tx.send(addr).is_err() {
            debug!("Starter for {} gave up before ready", name);
            return;
        }

        let shutdown = async move {
            let _ = shutdown_rx.await;
        };

        match axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
            Ok(()) => info!("{} agent server stopped", name),
            Err(e) => {
                let failure = HostError::ListenerFailed {
                    agent: name.clone(),
                    reason: e.to_string(),
                };
                error!("{}", failure);
                registry.remove_if(&name, |h| h.info.port == addr.port());
            }
        }
    })
}

async fn agent_card(State(state): State<ServerState>) -> Json<AgentDescriptor> {
    Json(state.descriptor.as_ref().clone())
}

async fn handle_rpc(State(state): State<ServerState>, body: Bytes) -> Json<JsonRpcResponse> {
    let request = match state.protocol.parse_request(&body) {
        Ok(request) => request,
        Err(response) => return Json(response),
    };
    debug!("[{}] {} id={:?}", state.name, request.method, request.id);

    Json(dispatch(&state, request).await)
}

async fn dispatch(state: &ServerState, request: JsonRpcRequest) -> JsonRpcResponse {
    let id = request.id;
    let params = request.params.unwrap_or(serde_json::Value::Null);

    match request.method.as_str() {
        METHOD_MESSAGE_SEND => match serde_json::from_value::<Message>(params) {
            Ok(message) => respond(state, id, state.agent.handle_message(message).await),
            Err(e) => invalid_params(state, id, e),
        },
        METHOD_TASKS_SEND => match serde_json::from_value::<Task>(params) {
            Ok(task) => respond(state, id, state.agent.handle_task(task).await),
            Err(e) => invalid_params(state, id, e),
        },
        METHOD_AGENT_CARD => respond(state, id, Ok(state.descriptor.as_ref())),
        other => state.protocol.create_error_response(
            id,
            METHOD_NOT_FOUND,
            &format!("Unsupported method: {}", other),
        ),
    }
}

fn respond<T: Serialize>(
    state: &ServerState,
    id: Option<serde_json::Value>,
    outcome: Result<T>,
) -> JsonRpcResponse {
    match outcome.and_then(|value| state.protocol.create_success_response(id.clone(), &value)) {
        Ok(response) => response,
        Err(e) => {
            error!("[{}] request failed: {}", state.name, e);
            state
                .protocol
                .create_error_response(id, INTERNAL_ERROR, &e.to_string())
        }
    }
}

fn invalid_params(
    state: &ServerState,
    id: Option<serde_json::Value>,
    err: serde_json::Error,
) -> JsonRpcResponse {
    state
        .protocol
        .create_error_response(id, INVALID_PARAMS, &format!("Invalid params: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::WeatherAgent;
    use crate::types::{MessageContent, TaskState};

    fn state() -> ServerState {
        let agent: Arc<dyn Agent> = Arc::new(WeatherAgent::new());
        let mut descriptor = agent.descriptor();
        descriptor.url = "http://localhost:50000".to_string();
        ServerState {
            name: Arc::from("weather"),
            agent,
            descriptor: Arc::new(descriptor),
            protocol: Arc::new(ProtocolHandler::new()),
        }
    }

    #[tokio::test]
    async fn test_dispatch_message() {
        let state = state();
        let question = Message::user("What's the weather in Tokyo?");
        let request = state.protocol.create_message_send_request(&question).unwrap();

        let response = dispatch(&state, request).await;
        let reply = state.protocol.parse_message_response(response).unwrap();
        assert!(reply.text().unwrap().contains("Tokyo"));
        assert_eq!(reply.parent_message_id, Some(question.message_id));
    }

    #[tokio::test]
    async fn test_dispatch_task() {
        let state = state();
        let request = state
            .protocol
            .create_task_send_request(&Task::new(Message::user("forecast for Paris")))
            .unwrap();

        let task = state
            .protocol
            .parse_task_response(dispatch(&state, request).await)
            .unwrap();
        assert_eq!(task.status.state, TaskState::Completed);
        assert!(task.first_text().unwrap().contains("Paris"));
    }

    #[tokio::test]
    async fn test_dispatch_card_is_bound() {
        let state = state();
        let response = dispatch(&state, state.protocol.create_card_request()).await;
        let card = state.protocol.parse_card_response(response).unwrap();
        assert_eq!(card.url, "http://localhost:50000");
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let state = state();
        let request = JsonRpcRequest::new(1, "tasks/cancel", None);
        let response = dispatch(&state, request).await;
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_params() {
        let state = state();
        let request = JsonRpcRequest::new(
            1,
            METHOD_MESSAGE_SEND,
            Some(serde_json::to_value(MessageContent::text("bare content")).unwrap()),
        );
        let response = dispatch(&state, request).await;
        assert_eq!(response.error.unwrap().code, INVALID_PARAMS);
    }
}
