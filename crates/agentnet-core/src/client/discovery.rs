//! Agent discovery
//!
//! Candidates come from port hints and the shared registry. Each one is
//! probed concurrently; an agent that does not answer stays listed as
//! unavailable instead of failing the whole pass.

use super::hints::PortHints;
use super::transport::{bounded, AgentTransport};
use crate::config::NetworkConfig;
use crate::host::AgentRegistry;
use crate::types::AgentDescriptor;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of probing one candidate
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredAgent {
    pub name: String,
    pub endpoint: String,
    pub port: Option<u16>,
    pub available: bool,
    pub descriptor: Option<AgentDescriptor>,
    pub error: Option<String>,
}

impl DiscoveredAgent {
    pub fn available(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        port: Option<u16>,
        descriptor: AgentDescriptor,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            port,
            available: true,
            descriptor: Some(descriptor),
            error: None,
        }
    }

    pub fn unavailable(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        port: Option<u16>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            port,
            available: false,
            descriptor: None,
            error: Some(error.into()),
        }
    }
}

/// What `list_agents` reports for each candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentListing {
    pub name: String,
    pub endpoint: String,
    pub port: Option<u16>,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Ordered outcome of a discovery pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveredAgents {
    agents: Vec<DiscoveredAgent>,
}

impl DiscoveredAgents {
    pub fn get(&self, name: &str) -> Option<&DiscoveredAgent> {
        self.agents.iter().find(|a| a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiscoveredAgent> {
        self.agents.iter()
    }

    /// Live agents in discovery order
    pub fn available(&self) -> impl Iterator<Item = &DiscoveredAgent> {
        self.agents.iter().filter(|a| a.available)
    }

    /// Routing candidates: live agents with their descriptors
    pub fn candidates(&self) -> Vec<(&str, &AgentDescriptor)> {
        self.available()
            .filter_map(|a| a.descriptor.as_ref().map(|d| (a.name.as_str(), d)))
            .collect()
    }

    pub fn listings(&self) -> Vec<AgentListing> {
        self.agents
            .iter()
            .map(|a| AgentListing {
                name: a.name.clone(),
                endpoint: a.endpoint.clone(),
                port: a.port,
                available: a.available,
                error: a.error.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl From<Vec<DiscoveredAgent>> for DiscoveredAgents {
    fn from(agents: Vec<DiscoveredAgent>) -> Self {
        Self { agents }
    }
}

struct Candidate {
    name: String,
    endpoint: String,
    port: Option<u16>,
}

/// Probes hinted and registered agents
pub struct DiscoveryClient {
    transport: Arc<dyn AgentTransport>,
    registry: Option<AgentRegistry>,
    config: NetworkConfig,
}

impl DiscoveryClient {
    pub fn new(
        transport: Arc<dyn AgentTransport>,
        registry: Option<AgentRegistry>,
        config: NetworkConfig,
    ) -> Self {
        Self {
            transport,
            registry,
            config,
        }
    }

    fn candidates(&self, hints: Option<&PortHints>) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = hints
            .into_iter()
            .flat_map(|h| h.iter())
            .map(|(name, port)| Candidate {
                name: name.to_string(),
                endpoint: self.config.endpoint_for(port),
                port: Some(port),
            })
            .collect();

        if let Some(registry) = &self.registry {
            for info in registry.infos() {
                if hints.map(|h| h.contains(&info.name)).unwrap_or(false) {
                    debug!("Hint overrides registry entry for {}", info.name);
                    continue;
                }
                candidates.push(Candidate {
                    name: info.name,
                    endpoint: info.endpoint,
                    port: Some(info.port),
                });
            }
        }

        candidates
    }

    /// Probe every candidate, preserving candidate order.
    ///
    /// Each descriptor fetch is capped at `probe_timeout`, whatever the transport.
    pub async fn discover(&self, hints: Option<&PortHints>) -> DiscoveredAgents {
        let candidates = self.candidates(hints);
        debug!("Discovering {} candidate agent(s)", candidates.len());

        let limit = self.config.probe_timeout();
        let probes = candidates.into_iter().map(|candidate| {
            let transport = Arc::clone(&self.transport);
            async move {
                let fetched = bounded(
                    &candidate.endpoint,
                    limit,
                    transport.fetch_descriptor(&candidate.endpoint),
                )
                .await;
                match fetched {
                    Ok(descriptor) => {
                        info!("Discovered {} at {}", candidate.name, candidate.endpoint);
                        DiscoveredAgent::available(
                            candidate.name,
                            candidate.endpoint,
                            candidate.port,
                            descriptor,
                        )
                    }
                    Err(e) => {
                        warn!("Could not reach {} at {}: {}", candidate.name, candidate.endpoint, e);
                        DiscoveredAgent::unavailable(
                            candidate.name,
                            candidate.endpoint,
                            candidate.port,
                            e.to_string(),
                        )
                    }
                }
            }
        });

        DiscoveredAgents::from(join_all(probes).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, KnowledgeAgent, WeatherAgent};
    use crate::client::transport::MockAgentTransport;
    use crate::host::AgentHost;
    use crate::error::{Error, Result, TransportError};
    use crate::types::{Message, Skill, Task};
    use async_trait::async_trait;
    use std::time::{Duration, Instant};

    fn descriptor(name: &str, endpoint: &str) -> AgentDescriptor {
        let mut descriptor = AgentDescriptor::new(name, "test agent", "1.0.0")
            .with_skill(Skill::new(name, "test").with_tags([name.to_lowercase()]));
        descriptor.url = endpoint.to_string();
        descriptor
    }

    fn config() -> NetworkConfig {
        NetworkConfig::default()
    }

    #[tokio::test]
    async fn test_unreachable_agent_stays_listed() {
        let mut mock = MockAgentTransport::new();
        mock.expect_fetch_descriptor().times(2).returning(|endpoint| {
            if endpoint.ends_with(":50001") {
                Ok(descriptor("Weather Agent", endpoint))
            } else {
                Err(Error::Transport(TransportError::Timeout {
                    endpoint: endpoint.to_string(),
                }))
            }
        });

        let client = DiscoveryClient::new(Arc::new(mock), None, config());
        let hints = PortHints::parse(["weather:50001", "travel:50002"]).unwrap();
        let agents = client.discover(Some(&hints)).await;

        assert_eq!(agents.len(), 2);
        let listings = agents.listings();
        assert_eq!(listings[0].name, "weather");
        assert!(listings[0].available);
        assert_eq!(listings[1].name, "travel");
        assert!(!listings[1].available);
        assert!(listings[1].error.as_deref().unwrap().contains("timed out"));

        let names: Vec<_> = agents.available().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["weather"]);
        assert_eq!(agents.candidates().len(), 1);
    }

    #[tokio::test]
    async fn test_hints_take_precedence_over_registry() {
        let registry = AgentRegistry::new();
        let host = AgentHost::new(config(), registry.clone()).unwrap();
        let weather = host
            .start("weather", || Arc::new(WeatherAgent::new()) as Arc<dyn Agent>)
            .await
            .unwrap();
        let knowledge = host
            .start("knowledge", || Arc::new(KnowledgeAgent::new()) as Arc<dyn Agent>)
            .await
            .unwrap();

        let hinted_endpoint = config().endpoint_for(50999);
        let expected = hinted_endpoint.clone();
        let mut mock = MockAgentTransport::new();
        mock.expect_fetch_descriptor()
            .times(2)
            .returning(|endpoint| Ok(descriptor("any", endpoint)));

        let client = DiscoveryClient::new(Arc::new(mock), Some(registry), config());
        let hints = PortHints::parse(["knowledge:50999"]).unwrap();
        let agents = client.discover(Some(&hints)).await;

        let order: Vec<_> = agents.iter().map(|a| (a.name.as_str(), a.endpoint.as_str())).collect();
        assert_eq!(
            order,
            vec![("knowledge", expected.as_str()), ("weather", weather.endpoint.as_str())]
        );
        assert_ne!(knowledge.endpoint, hinted_endpoint);

        host.stop_all().await.unwrap();
    }

    /// Answers descriptor requests, stalling on `stalled_port`
    struct StallingTransport {
        stalled_port: u16,
        stall: Duration,
    }

    #[async_trait]
    impl AgentTransport for StallingTransport {
        async fn fetch_descriptor(&self, endpoint: &str) -> Result<AgentDescriptor> {
            if endpoint.ends_with(&format!(":{}", self.stalled_port)) {
                tokio::time::sleep(self.stall).await;
            }
            Ok(descriptor("any", endpoint))
        }

        async fn send_message(&self, _endpoint: &str, message: Message) -> Result<Message> {
            Ok(message)
        }

        async fn send_task(&self, _endpoint: &str, task: Task) -> Result<Task> {
            Ok(task)
        }
    }

    #[tokio::test]
    async fn test_stalled_agent_bounded_by_one_timeout() {
        let config = NetworkConfig {
            probe_timeout_ms: 200,
            ..Default::default()
        };
        let transport = StallingTransport {
            stalled_port: 50002,
            stall: Duration::from_secs(10),
        };
        let client = DiscoveryClient::new(Arc::new(transport), None, config);
        let hints = PortHints::parse(["weather:50001", "slow:50002", "knowledge:50003"]).unwrap();

        let started = Instant::now();
        let agents = client.discover(Some(&hints)).await;
        let elapsed = started.elapsed();

        assert!(elapsed < Duration::from_secs(2), "discovery took {:?}", elapsed);
        assert!(agents.get("weather").unwrap().available);
        assert!(agents.get("knowledge").unwrap().available);

        let slow = agents.get("slow").unwrap();
        assert!(!slow.available);
        assert!(slow.error.as_deref().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_no_candidates() {
        let mut mock = MockAgentTransport::new();
        mock.expect_fetch_descriptor().never();

        let client = DiscoveryClient::new(Arc::new(mock), Some(AgentRegistry::new()), config());
        let agents = client.discover(None).await;
        assert!(agents.is_empty());
        assert!(agents.candidates().is_empty());
    }
}
