//! Hosted agents
//!
//! This module holds:
//! - The `Agent` contract every hosted service implements
//! - Demo agents (weather, knowledge) used by the CLI and tests

mod knowledge;
mod traits;
mod weather;

pub use knowledge::KnowledgeAgent;
pub use traits::{Agent, AgentFactory};
pub use weather::WeatherAgent;

use std::sync::Arc;

/// Factory for a built-in agent type by short name
pub fn builtin_factory(kind: &str) -> Option<AgentFactory> {
    match kind {
        "weather" => Some(Arc::new(|| Arc::new(WeatherAgent::new()) as Arc<dyn Agent>)),
        "knowledge" => Some(Arc::new(|| Arc::new(KnowledgeAgent::new()) as Arc<dyn Agent>)),
        _ => None,
    }
}

/// Short names accepted by `builtin_factory`
pub const BUILTIN_AGENTS: &[&str] = &["weather", "knowledge"];
