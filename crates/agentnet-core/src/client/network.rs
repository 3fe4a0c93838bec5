//! Caller-facing facade over discovery, routing and workflows

use super::discovery::{AgentListing, DiscoveredAgent, DiscoveredAgents, DiscoveryClient};
use super::hints::PortHints;
use super::invoke::invoke;
use super::router::{KeywordRouter, RouteMatch};
use super::transport::{AgentTransport, HttpTransport};
use super::workflow::{WorkflowOrchestrator, WorkflowRun};
use crate::config::NetworkConfig;
use crate::error::{AgentError, Error, Result, TransportError};
use crate::host::AgentRegistry;
use crate::types::{Message, Task};
use std::sync::Arc;
use tracing::{debug, info};

/// Entry point for listing, querying and chaining agents
pub struct NetworkClient {
    transport: Arc<dyn AgentTransport>,
    discovery: DiscoveryClient,
    router: KeywordRouter,
    orchestrator: WorkflowOrchestrator,
    agents: DiscoveredAgents,
}

impl NetworkClient {
    /// Client over HTTP. Pass the host's registry to see in-process agents.
    pub fn new(config: NetworkConfig, registry: Option<AgentRegistry>) -> Result<Self> {
        let transport: Arc<dyn AgentTransport> = Arc::new(HttpTransport::new(&config)?);
        Ok(Self::with_transport(config, registry, transport))
    }

    pub fn with_transport(
        config: NetworkConfig,
        registry: Option<AgentRegistry>,
        transport: Arc<dyn AgentTransport>,
    ) -> Self {
        Self {
            router: KeywordRouter::new(config.default_agent.clone()),
            discovery: DiscoveryClient::new(Arc::clone(&transport), registry, config),
            orchestrator: WorkflowOrchestrator::new(Arc::clone(&transport)),
            transport,
            agents: DiscoveredAgents::default(),
        }
    }

    /// Refresh the discovered view
    pub async fn discover(&mut self, hints: Option<&PortHints>) -> &DiscoveredAgents {
        self.agents = self.discovery.discover(hints).await;
        info!(
            "Discovered {} agent(s), {} available",
            self.agents.len(),
            self.agents.available().count()
        );
        &self.agents
    }

    /// Result of the last discovery pass
    pub fn agents(&self) -> &DiscoveredAgents {
        &self.agents
    }

    pub fn list_agents(&self) -> Vec<AgentListing> {
        self.agents.listings()
    }

    /// Route `query` over the available agents
    pub fn route(&self, query: &str) -> Result<RouteMatch> {
        self.router.select(query, &self.agents.candidates())
    }

    fn resolve(&self, agent: &str) -> Result<&DiscoveredAgent> {
        let found = self
            .agents
            .get(agent)
            .ok_or_else(|| Error::Agent(AgentError::NotFound(agent.to_string())))?;
        if !found.available {
            return Err(Error::Agent(AgentError::NotRunning(agent.to_string())));
        }
        Ok(found)
    }

    /// Send to `agent`, or to the routed agent when none is named
    pub async fn send_message(&self, message: Message, agent: Option<&str>) -> Result<Message> {
        let target = match agent {
            Some(name) => self.resolve(name)?,
            None => {
                let query = message.text().unwrap_or_default();
                let route = self.route(&query)?;
                debug!("Routed query to {} (score {})", route.agent, route.score);
                self.resolve(&route.agent)?
            }
        };

        invoke(self.transport.as_ref(), target, message).await
    }

    /// Send a task to a named agent in task mode
    pub async fn send_task(&self, task: Task, agent: &str) -> Result<Task> {
        let target = self.resolve(agent)?;
        self.transport.send_task(&target.endpoint, task).await
    }

    /// Ask a single agent and return the reply text
    pub async fn query_agent(&self, query: &str, agent: Option<&str>) -> Result<String> {
        let reply = self.send_message(Message::user(query), agent).await?;
        reply.text().ok_or_else(|| {
            Error::Transport(TransportError::Protocol(
                "reply carries no text".to_string(),
            ))
        })
    }

    pub async fn run_workflow(&self, query: &str, workflow: &[String]) -> Result<WorkflowRun> {
        self.orchestrator
            .run(Message::user(query), workflow, &self.agents)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, KnowledgeAgent, WeatherAgent};
    use crate::error::RoutingError;
    use crate::host::AgentHost;
    use crate::types::TaskState;

    fn weather() -> Arc<dyn Agent> {
        Arc::new(WeatherAgent::new())
    }

    fn knowledge() -> Arc<dyn Agent> {
        Arc::new(KnowledgeAgent::new())
    }

    async fn hosted() -> (AgentHost, NetworkClient) {
        let registry = AgentRegistry::new();
        let host = AgentHost::new(NetworkConfig::default(), registry.clone()).unwrap();
        host.start("weather", weather).await.unwrap();
        host.start("knowledge", knowledge).await.unwrap();

        let mut client = NetworkClient::new(NetworkConfig::default(), Some(registry)).unwrap();
        client.discover(None).await;
        (host, client)
    }

    #[tokio::test]
    async fn test_routed_query_reaches_weather_agent() {
        let (host, client) = hosted().await;

        let names: Vec<_> = client.list_agents().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["weather", "knowledge"]);

        let answer = client
            .query_agent("What's the weather in Tokyo?", None)
            .await
            .unwrap();
        assert!(answer.contains("Tokyo"), "{}", answer);

        host.stop_all().await.unwrap();
    }

    #[tokio::test]
    async fn test_named_query_and_task_mode() {
        let (host, client) = hosted().await;

        let answer = client
            .query_agent("Tell me about the history of Rome", Some("knowledge"))
            .await
            .unwrap();
        assert!(answer.contains("Rome"), "{}", answer);

        let task = client
            .send_task(Task::new(Message::user("forecast for Paris")), "weather")
            .await
            .unwrap();
        assert_eq!(task.status.state, TaskState::Completed);
        assert!(task.first_text().unwrap().contains("Paris"));

        host.stop_all().await.unwrap();
    }

    #[tokio::test]
    async fn test_workflow_over_hosted_agents() {
        let (host, client) = hosted().await;

        let run = client
            .run_workflow(
                "What's the weather in London?",
                &["weather".to_string(), "knowledge".to_string()],
            )
            .await
            .unwrap();
        assert!(run.is_complete());
        assert_eq!(run.conversation.len(), 4);
        assert!(run.conversation.is_causally_linked());

        host.stop_all().await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_and_stopped_agents() {
        let (host, mut client) = hosted().await;

        assert!(matches!(
            client.query_agent("hi", Some("travel")).await,
            Err(Error::Agent(AgentError::NotFound(_)))
        ));

        host.stop("weather").await.unwrap();
        let hints = PortHints::parse(["weather:1"]).unwrap();
        client.discover(Some(&hints)).await;
        assert!(matches!(
            client.query_agent("weather", Some("weather")).await,
            Err(Error::Agent(AgentError::NotRunning(_)))
        ));

        host.stop_all().await.unwrap();
    }

    #[tokio::test]
    async fn test_no_agents_discovered() {
        let mut client = NetworkClient::new(NetworkConfig::default(), None).unwrap();
        client.discover(None).await;
        assert!(matches!(
            client.query_agent("What's the weather in Tokyo?", None).await,
            Err(Error::Routing(RoutingError::NoAgents))
        ));
    }

    #[tokio::test]
    async fn test_hints_without_registry() {
        let registry = AgentRegistry::new();
        let host = AgentHost::new(NetworkConfig::default(), registry).unwrap();
        let info = host.start("weather", weather).await.unwrap();

        let mut client = NetworkClient::new(NetworkConfig::default(), None).unwrap();
        let hints = PortHints::parse([format!("weather:{}", info.port)]).unwrap();
        let agents = client.discover(Some(&hints)).await;
        assert_eq!(agents.available().count(), 1);

        let answer = client.query_agent("rain in Berlin", None).await.unwrap();
        assert!(!answer.is_empty());

        host.stop_all().await.unwrap();
    }
}
