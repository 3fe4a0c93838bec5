//! Message and conversation types

use super::MessageContent;
use serde::{Deserialize, Serialize};

/// Who authored a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Agent,
}

/// A single message exchanged with an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: MessageRole,
    pub content: MessageContent,
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl Message {
    pub fn new(role: MessageRole, content: MessageContent) -> Self {
        Self {
            role,
            content,
            message_id: uuid::Uuid::new_v4().to_string(),
            parent_message_id: None,
            conversation_id: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, MessageContent::text(text))
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Agent, MessageContent::text(text))
    }

    /// Build an agent reply linked to `self`
    pub fn reply(&self, content: MessageContent) -> Self {
        Self {
            role: MessageRole::Agent,
            content,
            message_id: uuid::Uuid::new_v4().to_string(),
            parent_message_id: Some(self.message_id.clone()),
            conversation_id: self.conversation_id.clone(),
        }
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn text(&self) -> Option<String> {
        self.content.as_text()
    }
}

/// Causally linked, append-only sequence of messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub conversation_id: String,
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            messages: Vec::new(),
        }
    }

    /// Append a message, stamping the conversation id and parent link
    ///
    /// The first message keeps whatever parent it carries; every later one
    /// is linked to its predecessor.
    pub fn append(&mut self, mut message: Message) -> &Message {
        message.conversation_id = Some(self.conversation_id.clone());
        if let Some(last) = self.messages.last() {
            message.parent_message_id = Some(last.message_id.clone());
        }
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether every message shares the conversation id and links to its predecessor
    pub fn is_causally_linked(&self) -> bool {
        self.messages.iter().enumerate().all(|(i, message)| {
            let same_conversation =
                message.conversation_id.as_deref() == Some(self.conversation_id.as_str());
            let linked = i == 0
                || message.parent_message_id.as_deref()
                    == Some(self.messages[i - 1].message_id.as_str());
            same_conversation && linked
        })
    }
}
