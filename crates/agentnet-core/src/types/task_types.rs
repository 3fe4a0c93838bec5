//! Task-mode invocation types

use super::{Message, MessageContent};
use serde::{Deserialize, Serialize};

/// Task lifecycle state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Submitted,
    Working,
    Completed,
    Failed,
}

impl Default for TaskState {
    fn default() -> Self {
        Self::Submitted
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl TaskStatus {
    pub fn new(state: TaskState) -> Self {
        Self {
            state,
            message: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// One piece of task output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    Text { text: String },
    Data { data: serde_json::Value },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Artifact {
    pub parts: Vec<Part>,
}

impl Artifact {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::Text { text: text.into() }],
        }
    }
}

/// Unit of work for agents invoked in task mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

impl Task {
    pub fn new(message: Message) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            status: TaskStatus::new(TaskState::Submitted),
            message: Some(message),
            artifacts: Vec::new(),
        }
    }


    /// First text part across all artifacts
    pub fn first_text(&self) -> Option<&str> {
        self.artifacts
            .iter()
            .flat_map(|a| a.parts.iter())
            .find_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                Part::Data { .. } => None,
            })
    }

    pub fn complete(&mut self, artifacts: Vec<Artifact>) {
        self.artifacts = artifacts;
        self.status = TaskStatus::new(TaskState::Completed);
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        let mut status = TaskStatus::new(TaskState::Failed);
        status.message = Some(reason.into());
        self.status = status;
    }

    /// Convert a finished task into the reply it represents
    pub fn into_reply(self) -> Option<MessageContent> {
        match self.status.state {
            TaskState::Completed => Some(MessageContent::text(self.first_text().unwrap_or_default())),
            TaskState::Failed => Some(MessageContent::error(
                self.status.message.unwrap_or_else(|| "task failed".to_string()),
            )),
            TaskState::Submitted | TaskState::Working => None,
        }
    }
}
