//! Keyword routing of free-text queries to agents

use crate::error::{Error, Result, RoutingError};
use crate::types::{AgentDescriptor, Skill};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::debug;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+").unwrap());

/// Words too common to identify a skill from its examples
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "what", "whats", "with", "will", "how", "who", "when", "where", "which",
    "does", "about", "tell", "you", "are", "can", "this", "that", "there", "from", "into", "your",
];

/// Selected agent for a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub agent: String,
    pub score: usize,
    /// Chosen as the configured default rather than by score
    pub fallback: bool,
}

/// Deterministic skill-keyword router
#[derive(Debug, Clone, Default)]
pub struct KeywordRouter {
    default_agent: Option<String>,
}

impl KeywordRouter {
    pub fn new(default_agent: Option<String>) -> Self {
        Self { default_agent }
    }

    /// Pick the best candidate for `query`.
    ///
    /// Candidates are scored in order and the first highest score wins.
    pub fn select(&self, query: &str, candidates: &[(&str, &AgentDescriptor)]) -> Result<RouteMatch> {
        if candidates.is_empty() {
            return Err(Error::Routing(RoutingError::NoAgents));
        }

        let normalized = normalize(query);
        let mut best: Option<(&str, usize)> = None;
        for (name, descriptor) in candidates {
            let score = score_normalized(&normalized, descriptor);
            debug!("Route score for {}: {}", name, score);
            if score > 0 && best.map(|(_, s)| score > s).unwrap_or(true) {
                best = Some((name, score));
            }
        }

        if let Some((agent, score)) = best {
            return Ok(RouteMatch {
                agent: agent.to_string(),
                score,
                fallback: false,
            });
        }

        match &self.default_agent {
            Some(default) if candidates.iter().any(|(name, _)| name == default) => {
                debug!("No skill matched, falling back to {}", default);
                Ok(RouteMatch {
                    agent: default.clone(),
                    score: 0,
                    fallback: true,
                })
            }
            _ => Err(Error::Routing(RoutingError::NoMatch(query.to_string()))),
        }
    }
}

/// Number of skill terms found in `query`, summed over skills
pub fn score(query: &str, descriptor: &AgentDescriptor) -> usize {
    score_normalized(&normalize(query), descriptor)
}

fn score_normalized(query: &str, descriptor: &AgentDescriptor) -> usize {
    descriptor
        .skills
        .iter()
        .map(|skill| {
            skill_terms(skill)
                .iter()
                .filter(|term| query.contains(term.as_str()))
                .count()
        })
        .sum()
}

fn skill_terms(skill: &Skill) -> BTreeSet<String> {
    let mut terms: BTreeSet<String> = skill
        .tags
        .iter()
        .map(|tag| normalize(tag))
        .filter(|tag| !tag.is_empty())
        .collect();

    for example in &skill.examples {
        let lowered = example.to_lowercase();
        terms.extend(
            TOKEN
                .find_iter(&lowered)
                .map(|m| m.as_str())
                .filter(|word| word.len() >= 3 && !STOPWORDS.contains(word))
                .map(str::to_string),
        );
    }

    terms
}

/// Lowercase alphanumeric tokens joined by single spaces
fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    TOKEN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
