//! Contract implemented by every hosted agent

use crate::error::Result;
use crate::types::{AgentDescriptor, Artifact, Message, MessageContent, Part, Task, TaskState, TaskStatus};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// A leaf service answering messages and tasks.
///
/// Agents carry no orchestration logic. The host serves them over HTTP and
/// owns the bound copy of their descriptor.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Capability metadata, with an unbound endpoint
    fn descriptor(&self) -> AgentDescriptor;

    /// Answer a single message
    async fn handle_message(&self, message: Message) -> Result<Message>;

    /// Process a task in place.
    ///
    /// The default runs the task's input through `handle_message` and stores
    /// the reply as the task's only artifact.
    async fn handle_task(&self, mut task: Task) -> Result<Task> {
        let Some(input) = task.message.clone() else {
            task.fail("task has no input message");
            return Ok(task);
        };

        task.status = TaskStatus::new(TaskState::Working);
        debug!("Task {} working", task.id);

        match self.handle_message(input).await {
            Ok(reply) => match reply.content {
                MessageContent::Text { text } => task.complete(vec![Artifact::text(text)]),
                MessageContent::Data { data } => task.complete(vec![Artifact {
                    parts: vec![Part::Data { data }],
                }]),
                MessageContent::Error { message } => task.fail(message),
            },
            Err(e) => task.fail(e.to_string()),
        }

        Ok(task)
    }
}

/// Builds a fresh agent instance for the host
pub type AgentFactory = Arc<dyn Fn() -> Arc<dyn Agent> + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AgentError, Error};

    struct Upper;

    #[async_trait]
    impl Agent for Upper {
        fn descriptor(&self) -> AgentDescriptor {
            AgentDescriptor::new("Upper", "Uppercases text", "0.1.0")
        }

        async fn handle_message(&self, message: Message) -> Result<Message> {
            match message.text() {
                Some(text) if !text.is_empty() => {
                    Ok(message.reply(MessageContent::text(text.to_uppercase())))
                }
                _ => Err(Error::Agent(AgentError::Handler {
                    agent: "Upper".to_string(),
                    reason: "empty input".to_string(),
                })),
            }
        }
    }

    #[tokio::test]
    async fn test_default_task_handler_completes() {
        let task = Upper.handle_task(Task::new(Message::user("hello"))).await.unwrap();
        assert_eq!(task.status.state, TaskState::Completed);
        assert_eq!(task.first_text(), Some("HELLO"));
    }

    #[tokio::test]
    async fn test_default_task_handler_records_failure() {
        let task = Upper.handle_task(Task::new(Message::user(""))).await.unwrap();
        assert_eq!(task.status.state, TaskState::Failed);
        assert!(task.status.message.unwrap().contains("empty input"));
        assert!(task.artifacts.is_empty());
    }

    #[tokio::test]
    async fn test_task_without_input_fails() {
        let mut task = Task::new(Message::user("x"));
        task.message = None;
        let task = Upper.handle_task(task).await.unwrap();
        assert_eq!(task.status.state, TaskState::Failed);
    }
}
