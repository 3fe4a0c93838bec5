//! AgentNet Core Library
//!
//! This crate provides the core functionality for AgentNet, including:
//! - Hosting agents as HTTP JSON-RPC services on ephemeral ports
//! - A shared registry of running agents
//! - Discovery, keyword routing and sequential workflows on the caller side
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      agentnet-core                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  agent/        - Agent contract and demo agents             │
//! │  host/         - Port allocation, listeners, registry       │
//! │  client/       - Transport, discovery, router, workflows    │
//! │  protocol.rs   - JSON-RPC request/response handling         │
//! │  config.rs     - Network configuration                      │
//! │  types/        - Shared type definitions                    │
//! │  error.rs      - Error types                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod agent;
pub mod client;
pub mod config;
pub mod error;
pub mod host;
pub mod protocol;
pub mod types;

// Re-export commonly used types
pub use config::NetworkConfig;
pub use error::{Error, Result};
pub use types::*;

// Re-export agent components
pub use agent::{builtin_factory, Agent, AgentFactory, KnowledgeAgent, WeatherAgent, BUILTIN_AGENTS};

// Re-export host components
pub use host::{AgentHandle, AgentHost, AgentRegistry, PortAllocator};

// Re-export client components
pub use client::{
    AgentListing, AgentTransport, DiscoveredAgent, DiscoveredAgents, DiscoveryClient,
    HttpTransport, KeywordRouter, NetworkClient, PortHints, RouteMatch, WorkflowOrchestrator,
    WorkflowRun, WorkflowStatus,
};
pub use protocol::ProtocolHandler;
