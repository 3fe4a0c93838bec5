//! Caller side of the agent network
//!
//! Discovery probes hinted and registered agents, the router picks an agent
//! for a free-text query, and the orchestrator chains agents into a
//! workflow. `NetworkClient` ties these together.

mod discovery;
mod hints;
mod invoke;
mod network;
pub mod router;
mod transport;
mod workflow;

pub use discovery::{AgentListing, DiscoveredAgent, DiscoveredAgents, DiscoveryClient};
pub use hints::PortHints;
pub use invoke::invoke;
pub use network::NetworkClient;
pub use router::{KeywordRouter, RouteMatch};
pub use transport::{AgentTransport, HttpTransport};
pub use workflow::{WorkflowOrchestrator, WorkflowRun, WorkflowStatus};
