//! Agent runtime hosting
//!
//! This module handles:
//! - Port allocation from the configured ephemeral range
//! - Per-agent HTTP listeners with a ready handshake
//! - The shared registry of running agents

mod manager;
mod ports;
mod registry;
mod server;

pub use manager::AgentHost;
pub use ports::PortAllocator;
pub use registry::{AgentHandle, AgentRegistry};
