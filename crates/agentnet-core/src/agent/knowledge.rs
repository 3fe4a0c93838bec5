//! Knowledge agent answering from a small fact table

use super::traits::Agent;
use crate::error::Result;
use crate::types::{AgentDescriptor, Message, MessageContent, Skill};
use async_trait::async_trait;
use tracing::info;

/// (topic, fact) pairs, matched in order
const FACTS: &[(&str, &str)] = &[
    ("tokyo", "Tokyo is the capital of Japan and the most populous metropolitan area in the world."),
    ("paris", "Paris is the capital of France, known for the Eiffel Tower completed in 1889."),
    ("london", "London is the capital of the United Kingdom and sits on the River Thames."),
    ("new york", "New York City is the most populous city in the United States."),
    ("sydney", "Sydney is the largest city in Australia, famous for its Opera House."),
    ("rome", "Rome was founded, according to legend, in 753 BC."),
    ("berlin", "Berlin has been the capital of reunified Germany since 1990."),
    ("python", "Python is a programming language first released in 1991."),
    ("rust", "Rust is a systems programming language focused on safety and performance."),
];

const FALLBACK: &str = "I don't have specific information about that topic.";

/// Looks up short facts about places and topics
#[derive(Debug, Default)]
pub struct KnowledgeAgent;

impl KnowledgeAgent {
    pub fn new() -> Self {
        Self
    }

    fn lookup(query: &str) -> Vec<&'static str> {
        let query = query.to_lowercase();
        FACTS
            .iter()
            .filter(|(topic, _)| query.contains(topic))
            .map(|(_, fact)| *fact)
            .collect()
    }
}

#[async_trait]
impl Agent for KnowledgeAgent {
    fn descriptor(&self) -> AgentDescriptor {
        AgentDescriptor::new(
            "Knowledge Agent",
            "Answers general knowledge questions about places, history and science",
            "1.0.0",
        )
        .with_skill(
            Skill::new("General Knowledge", "Look up facts about a topic")
                .with_tags(["facts", "history", "knowledge", "information", "capital"])
                .with_examples([
                    "Tell me about the history of Rome",
                    "What is the capital of Japan?",
                ]),
        )
    }

    async fn handle_message(&self, message: Message) -> Result<Message> {
        let query = message.text().unwrap_or_default();
        let facts = Self::lookup(&query);
        info!("[Knowledge Agent] {} fact(s) found", facts.len());

        let answer = if facts.is_empty() {
            FALLBACK.to_string()
        } else {
            facts.join("\n")
        };
        Ok(message.reply(MessageContent::text(answer)))
    }
}
