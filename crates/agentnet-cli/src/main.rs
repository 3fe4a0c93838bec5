//! AgentNet command line entry point
//!
//! Hosts the demo agents, lists them, and sends queries or workflows
//! through the network client.

use agentnet_core::NetworkConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

/// Agent network command-line interface
#[derive(Debug, Parser)]
#[command(name = "agentnet", about = "Host, discover and query a local agent network")]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Agent used when no skill matches a query
    #[arg(long, global = true)]
    default_agent: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the weather and knowledge agents and run until Ctrl+C
    Start,

    /// List reachable agents
    List {
        /// Agent locations as name:port
        #[arg(long, num_args = 1..)]
        agent_ports: Vec<String>,
    },

    /// Query one agent, or let the router pick one
    Query {
        /// Agent to query by name
        #[arg(long)]
        agent: Option<String>,

        /// Agent locations as name:port
        #[arg(long, num_args = 1..)]
        agent_ports: Vec<String>,

        /// The query text
        query: String,
    },

    /// Pass a query through several agents in order
    Conversation {
        /// Comma-separated agent names in workflow order
        #[arg(long, value_delimiter = ',', required = true)]
        workflow: Vec<String>,

        /// Agent locations as name:port
        #[arg(long, num_args = 1..)]
        agent_ports: Vec<String>,

        /// The initial query text
        query: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = NetworkConfig::load(cli.config.as_deref())?;
    if cli.default_agent.is_some() {
        config.default_agent = cli.default_agent;
    }

    match cli.command {
        Command::Start => commands::start(config).await,
        Command::List { agent_ports } => commands::list(config, &agent_ports).await,
        Command::Query {
            agent,
            agent_ports,
            query,
        } => commands::query(config, agent.as_deref(), &agent_ports, &query).await,
        Command::Conversation {
            workflow,
            agent_ports,
            query,
        } => commands::conversation(config, &workflow, &agent_ports, &query).await,
    }
}
