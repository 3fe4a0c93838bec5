//! Mode-transparent invocation of a discovered agent

use super::discovery::DiscoveredAgent;
use super::transport::AgentTransport;
use crate::error::{AgentError, Error, Result, TransportError};
use crate::types::{InvocationMode, Message, MessageContent, Task};
use tracing::debug;

/// Send `message` to `agent`, preferring message mode.
///
/// Agents that only take tasks get the message wrapped in a task; the first
/// text artifact of the finished task becomes the reply. Error content in
/// the reply is returned as `AgentError::Handler`.
pub async fn invoke(
    transport: &dyn AgentTransport,
    agent: &DiscoveredAgent,
    message: Message,
) -> Result<Message> {
    let descriptor = agent
        .descriptor
        .as_ref()
        .filter(|_| agent.available)
        .ok_or_else(|| Error::Agent(AgentError::NotRunning(agent.name.clone())))?;

    let reply = if descriptor.supports(InvocationMode::Message) {
        debug!("Sending message to {} at {}", agent.name, agent.endpoint);
        transport.send_message(&agent.endpoint, message).await?
    } else if descriptor.supports(InvocationMode::Task) {
        debug!("Sending task to {} at {}", agent.name, agent.endpoint);
        let sent = message.clone();
        let task = transport.send_task(&agent.endpoint, Task::new(message)).await?;
        let content = task.into_reply().ok_or_else(|| {
            Error::Transport(TransportError::Protocol(format!(
                "task returned by {} is not finished",
                agent.name
            )))
        })?;
        sent.reply(content)
    } else {
        return Err(Error::Transport(TransportError::Protocol(format!(
            "{} advertises no invocation mode",
            agent.name
        ))));
    };

    if let MessageContent::Error { message } = &reply.content {
        return Err(Error::Agent(AgentError::Handler {
            agent: agent.name.clone(),
            reason: message.clone(),
        }));
    }
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::MockAgentTransport;
    use crate::types::{AgentDescriptor, Artifact, TaskState};

    fn agent(modes: Vec<InvocationMode>) -> DiscoveredAgent {
        let descriptor = AgentDescriptor::new("Echo", "", "1.0.0").with_modes(modes);
        DiscoveredAgent::available("echo", "http://localhost:50001", Some(50001), descriptor)
    }

    #[tokio::test]
    async fn test_message_mode_preferred() {
        let mut mock = MockAgentTransport::new();
        mock.expect_send_message()
            .times(1)
            .returning(|_, message| Ok(message.reply(MessageContent::text("pong"))));
        mock.expect_send_task().never();

        let both = agent(vec![InvocationMode::Message, InvocationMode::Task]);
        let reply = invoke(&mock, &both, Message::user("ping")).await.unwrap();
        assert_eq!(reply.text().as_deref(), Some("pong"));
    }

    #[tokio::test]
    async fn test_task_only_agent_gets_task() {
        let mut mock = MockAgentTransport::new();
        mock.expect_send_message().never();
        mock.expect_send_task().times(1).returning(|_, mut task| {
            task.complete(vec![Artifact::text("pong")]);
            Ok(task)
        });

        let question = Message::user("ping");
        let reply = invoke(&mock, &agent(vec![InvocationMode::Task]), question.clone())
            .await
            .unwrap();
        assert_eq!(reply.text().as_deref(), Some("pong"));
        assert_eq!(reply.parent_message_id, Some(question.message_id));
    }

    #[tokio::test]
    async fn test_unfinished_task_is_protocol_error() {
        let mut mock = MockAgentTransport::new();
        mock.expect_send_task().returning(|_, task| Ok(task));

        let result = invoke(&mock, &agent(vec![InvocationMode::Task]), Message::user("ping")).await;
        assert!(matches!(result, Err(Error::Transport(TransportError::Protocol(_)))));
    }

    #[tokio::test]
    async fn test_failed_task_is_handler_error() {
        let mut mock = MockAgentTransport::new();
        mock.expect_send_task().returning(|_, mut task| {
            task.fail("no data");
            assert_eq!(task.status.state, TaskState::Failed);
            Ok(task)
        });

        let result = invoke(&mock, &agent(vec![InvocationMode::Task]), Message::user("ping")).await;
        assert!(matches!(result, Err(Error::Agent(AgentError::Handler { .. }))));
    }

    #[tokio::test]
    async fn test_error_content_is_handler_error() {
        let mut mock = MockAgentTransport::new();
        mock.expect_send_message()
            .returning(|_, message| Ok(message.reply(MessageContent::error("boom"))));

        let result = invoke(&mock, &agent(vec![InvocationMode::Message]), Message::user("ping")).await;
        match result {
            Err(Error::Agent(AgentError::Handler { agent, reason })) => {
                assert_eq!(agent, "echo");
                assert_eq!(reason, "boom");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unavailable_agent_not_called() {
        let mut mock = MockAgentTransport::new();
        mock.expect_send_message().never();
        let offline = DiscoveredAgent::unavailable("echo", "http://localhost:50001", Some(50001), "refused");

        let result = invoke(&mock, &offline, Message::user("ping")).await;
        assert!(matches!(result, Err(Error::Agent(AgentError::NotRunning(_)))));
    }
}
