//! Agent descriptor and runtime state types

use serde::{Deserialize, Serialize};

/// Endpoint advertised by a descriptor before a host binds it
pub const UNBOUND_ENDPOINT: &str = "http://localhost:0";

/// A capability advertised by an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

impl Skill {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            tags: Vec::new(),
            examples: Vec::new(),
        }
    }

    /// Set tags, dropping duplicates while keeping first-seen order
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.clear();
        for tag in tags {
            let tag = tag.into();
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
        self
    }

    pub fn with_examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.examples = examples.into_iter().map(Into::into).collect();
        self
    }
}

/// How an agent can be invoked
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InvocationMode {
    /// `Message -> Message`
    Message,
    /// `Task -> Task`
    Task,
}

fn default_modes() -> Vec<InvocationMode> {
    vec![InvocationMode::Message, InvocationMode::Task]
}

/// Capability metadata served by every agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDescriptor {
    pub name: String,
    pub description: String,
    pub version: String,
    pub url: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default = "default_modes")]
    pub modes: Vec<InvocationMode>,
}

impl AgentDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: version.into(),
            url: UNBOUND_ENDPOINT.to_string(),
            skills: Vec::new(),
            modes: default_modes(),
        }
    }

    pub fn with_skill(mut self, skill: Skill) -> Self {
        self.skills.push(skill);
        self
    }

    pub fn with_modes(mut self, modes: Vec<InvocationMode>) -> Self {
        self.modes = modes;
        self
    }

    pub fn supports(&self, mode: InvocationMode) -> bool {
        self.modes.contains(&mode)
    }

    pub fn is_bound(&self) -> bool {
        self.url != UNBOUND_ENDPOINT
    }
}

/// Agent runtime status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// Port claimed, listener not yet confirmed
    Starting,
    /// Listener is serving requests
    Running,
    /// Agent is not running
    Stopped,
}

impl Default for AgentStatus {
    fn default() -> Self {
        Self::Stopped
    }
}

/// Read-only view of a hosted agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInfo {
    pub name: String,
    pub port: u16,
    pub endpoint: String,
    pub status: AgentStatus,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_defaults() {
        let descriptor = AgentDescriptor::new("Echo", "Echoes input", "1.0.0");
        assert!(!descriptor.is_bound());
        assert!(descriptor.supports(InvocationMode::Message));
        assert!(descriptor.supports(InvocationMode::Task));
    }

    #[test]
    fn test_descriptor_missing_modes_defaults_to_both() {
        let json = serde_json::json!({
            "name": "Echo",
            "description": "Echoes input",
            "version": "1.0.0",
            "url": "http://localhost:5000"
        });
        let descriptor: AgentDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(descriptor.modes.len(), 2);
        assert!(descriptor.skills.is_empty());
        assert!(descriptor.is_bound());
    }

    #[test]
    fn test_skill_tags_are_a_set() {
        let skill = Skill::new("Weather", "Weather lookups").with_tags(["weather", "rain", "weather"]);
        assert_eq!(skill.tags, vec!["weather", "rain"]);
    }
}
