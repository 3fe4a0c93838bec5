//! Subcommand implementations

use agentnet_core::{
    builtin_factory, AgentHost, AgentListing, AgentRegistry, MessageContent, MessageRole,
    NetworkClient, NetworkConfig, PortHints, WorkflowStatus,
};
use anyhow::{anyhow, Context};
use tracing::info;

/// Shown by `list` when discovery found nothing
const NO_AGENTS_HINT: &str = "No agents found. `list` only sees agents named with \
--agent-ports name:port; agents started by another `agentnet start` process are \
not visible otherwise.";

/// Display name for a built-in agent kind
fn title(kind: &str) -> &str {
    match kind {
        "weather" => "Weather Agent",
        "knowledge" => "Knowledge Agent",
        other => other,
    }
}

pub async fn start(config: NetworkConfig) -> anyhow::Result<()> {
    let host = AgentHost::new(config, AgentRegistry::new())?;

    for kind in ["weather", "knowledge"] {
        let factory = builtin_factory(kind).ok_or_else(|| anyhow!("unknown agent kind {}", kind))?;
        let info = host
            .start(kind, || factory())
            .await
            .with_context(|| format!("failed to start {}", kind))?;
        println!("Started {} on port {}", title(kind), info.port);
    }

    println!("Agents are running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    println!("\nStopping agents...");
    host.stop_all().await?;
    info!("All agents stopped");
    Ok(())
}

async fn connect(config: NetworkConfig, agent_ports: &[String]) -> anyhow::Result<NetworkClient> {
    let hints = PortHints::parse(agent_ports)?;
    let mut client = NetworkClient::new(config, None)?;
    client.discover(Some(&hints)).await;
    Ok(client)
}

fn print_listings(listings: &[AgentListing]) {
    println!("Available agents:");
    for agent in listings {
        let status = if agent.available {
            "Available"
        } else {
            "Not available"
        };
        println!("- {}: {} ({})", agent.name, agent.endpoint, status);
    }
}

fn render(content: &MessageContent) -> String {
    match content {
        MessageContent::Error { message } => format!("Error: {}", message),
        other => other.as_text().unwrap_or_default(),
    }
}

pub async fn list(config: NetworkConfig, agent_ports: &[String]) -> anyhow::Result<()> {
    let client = connect(config, agent_ports).await?;
    let listings = client.list_agents();
    if listings.is_empty() {
        println!("{}", NO_AGENTS_HINT);
        return Ok(());
    }
    print_listings(&listings);
    Ok(())
}

pub async fn query(
    config: NetworkConfig,
    agent: Option<&str>,
    agent_ports: &[String],
    query: &str,
) -> anyhow::Result<()> {
    let client = connect(config, agent_ports).await?;
    if client.agents().is_empty() {
        return Err(anyhow!(
            "No agents available. Use 'start' command first, or specify agent ports."
        ));
    }
    print_listings(&client.list_agents());

    match agent {
        Some(name) => println!("Querying {} agent...", name),
        None => println!("Routing query to the most appropriate agent..."),
    }
    let answer = client.query_agent(query, agent).await?;

    println!("\nResult:");
    println!("{}", answer);
    Ok(())
}

pub async fn conversation(
    config: NetworkConfig,
    workflow: &[String],
    agent_ports: &[String],
    query: &str,
) -> anyhow::Result<()> {
    let client = connect(config, agent_ports).await?;
    print_listings(&client.list_agents());

    println!("Starting multi-agent conversation...");
    let run = client.run_workflow(query, workflow).await?;

    println!("\nConversation History:");
    for message in run.conversation.messages() {
        let role = match message.role {
            MessageRole::User => "user",
            MessageRole::Agent => "agent",
        };
        println!("[{}]: {}\n", role, render(&message.content));
    }

    match (&run.status, run.result()) {
        (WorkflowStatus::Completed, Some(last)) => {
            println!("\nFinal Result:");
            println!("{}", render(&last.content));
            Ok(())
        }
        (WorkflowStatus::Incomplete { step, agent, error }, _) => Err(anyhow!(
            "Workflow stopped at step {} ({}): {}",
            step + 1,
            agent,
            error
        )),
        _ => {
            println!("\nNo result produced.");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_error_content() {
        assert_eq!(render(&MessageContent::error("boom")), "Error: boom");
        assert_eq!(render(&MessageContent::text("sunny")), "sunny");
    }

    #[test]
    fn test_titles() {
        assert_eq!(title("weather"), "Weather Agent");
        assert_eq!(title("custom"), "custom");
    }

    #[test]
    fn test_empty_list_points_at_agent_ports() {
        assert!(NO_AGENTS_HINT.contains("--agent-ports"));
        assert!(NO_AGENTS_HINT.contains("another `agentnet start` process"));
    }

    #[tokio::test]
    async fn test_connect_without_hints_finds_nothing() {
        let client = connect(NetworkConfig::default(), &[]).await.unwrap();
        assert!(client.list_agents().is_empty());
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_hint() {
        let result = connect(NetworkConfig::default(), &["weather".to_string()]).await;
        assert!(result.is_err());
    }
}
