//! Registry of hosted agents
//!
//! One registry lives for the whole orchestrator process. It is handed to
//! the host and the discovery client explicitly; clones share state.

use crate::error::{AgentError, Error, Result};
use crate::types::{AgentDescriptor, AgentInfo, AgentStatus};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Runtime entry for a started agent
pub struct AgentHandle {
    pub(crate) info: AgentInfo,
    pub(crate) descriptor: Arc<AgentDescriptor>,
    pub(crate) shutdown_tx: Option<oneshot::Sender<()>>,
    pub(crate) task: Option<JoinHandle<()>>,
}

impl AgentHandle {
    pub fn info(&self) -> &AgentInfo {
        &self.info
    }
}

#[derive(Default)]
struct RegistryInner {
    /// Published names in insertion order
    order: Vec<String>,
    handles: HashMap<String, AgentHandle>,
    /// Names reserved by an in-flight start
    starting: HashSet<String>,
}

/// Shared name -> handle map
#[derive(Clone, Default)]
pub struct AgentRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name` for a start in progress
    pub(crate) fn reserve(&self, name: &str) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.handles.contains_key(name) || inner.starting.contains(name) {
            return Err(Error::Agent(AgentError::AlreadyRunning(name.to_string())));
        }
        inner.starting.insert(name.to_string());
        Ok(())
    }

    /// Drop a reservation after a failed start
    pub(crate) fn release(&self, name: &str) {
        self.inner.write().starting.remove(name);
    }

    /// Publish a fully constructed handle, clearing its reservation
    pub(crate) fn publish(&self, handle: AgentHandle) {
        let mut inner = self.inner.write();
        let name = handle.info.name.clone();
        inner.starting.remove(&name);
        if inner.handles.insert(name.clone(), handle).is_none() {
            inner.order.push(name);
        }
    }

    pub(crate) fn remove(&self, name: &str) -> Option<AgentHandle> {
        self.remove_if(name, |_| true)
    }

    /// Remove `name` only when `pred` holds for its handle
    pub(crate) fn remove_if<F>(&self, name: &str, pred: F) -> Option<AgentHandle>
    where
        F: FnOnce(&AgentHandle) -> bool,
    {
        let mut inner = self.inner.write();
        if !inner.handles.get(name).map(pred).unwrap_or(false) {
            return None;
        }
        inner.order.retain(|n| n != name);
        inner.handles.remove(name)
    }

    pub fn is_starting(&self, name: &str) -> bool {
        self.inner.read().starting.contains(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().handles.contains_key(name)
    }

    pub fn status(&self, name: &str) -> AgentStatus {
        let inner = self.inner.read();
        if inner.starting.contains(name) {
            AgentStatus::Starting
        } else {
            inner
                .handles
                .get(name)
                .map(|h| h.info.status)
                .unwrap_or(AgentStatus::Stopped)
        }
    }

    /// Whether any published handle holds `port`
    pub fn port_in_use(&self, port: u16) -> bool {
        self.inner.read().handles.values().any(|h| h.info.port == port)
    }

    /// Published names in insertion order
    pub fn names(&self) -> Vec<String> {
        self.inner.read().order.clone()
    }

    pub fn info(&self, name: &str) -> Option<AgentInfo> {
        self.inner.read().handles.get(name).map(|h| h.info.clone())
    }

    /// Views of every published handle in insertion order
    pub fn infos(&self) -> Vec<AgentInfo> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|name| inner.handles.get(name))
            .map(|h| h.info.clone())
            .collect()
    }

    pub fn descriptor(&self, name: &str) -> Option<Arc<AgentDescriptor>> {
        self.inner
            .read()
            .handles
            .get(name)
            .map(|h| Arc::clone(&h.descriptor))
    }

    pub fn len(&self) -> usize {
        self.inner.read().handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, WeatherAgent};

    fn handle(name: &str, port: u16) -> AgentHandle {
        let agent = WeatherAgent::new();
        AgentHandle {
            info: AgentInfo {
                name: name.to_string(),
                port,
                endpoint: format!("http://localhost:{}", port),
                status: AgentStatus::Running,
                started_at: chrono::Utc::now(),
            },
            descriptor: Arc::new(agent.descriptor()),
            shutdown_tx: None,
            task: None,
        }
    }

    #[test]
    fn test_insertion_order_preserved() {
        let registry = AgentRegistry::new();
        for (name, port) in [("weather", 50001), ("knowledge", 50002), ("alpha", 50003)] {
            registry.reserve(name).unwrap();
            registry.publish(handle(name, port));
        }
        assert_eq!(registry.names(), vec!["weather", "knowledge", "alpha"]);

        registry.remove("knowledge");
        assert_eq!(registry.names(), vec!["weather", "alpha"]);
        assert!(registry.info("knowledge").is_none());
    }

    #[test]
    fn test_reserve_rejects_duplicates() {
        let registry = AgentRegistry::new();
        registry.reserve("weather").unwrap();
        assert_eq!(registry.status("weather"), AgentStatus::Starting);
        assert!(registry.reserve("weather").is_err());

        registry.publish(handle("weather", 50001));
        assert_eq!(registry.status("weather"), AgentStatus::Running);
        assert!(!registry.is_starting("weather"));
        assert!(matches!(
            registry.reserve("weather"),
            Err(Error::Agent(AgentError::AlreadyRunning(_)))
        ));
    }

    #[test]
    fn test_release_frees_name() {
        let registry = AgentRegistry::new();
        registry.reserve("weather").unwrap();
        registry.release("weather");
        assert_eq!(registry.status("weather"), AgentStatus::Stopped);
        assert!(registry.reserve("weather").is_ok());
    }

    #[test]
    fn test_clones_share_state() {
        let registry = AgentRegistry::new();
        let view = registry.clone();
        registry.publish(handle("weather", 50001));

        assert!(view.contains("weather"));
        assert!(view.port_in_use(50001));
        assert!(!view.port_in_use(50002));
        assert_eq!(view.descriptor("weather").unwrap().name, "Weather Agent");
    }

    #[test]
    fn test_remove_if_checks_predicate() {
        let registry = AgentRegistry::new();
        registry.publish(handle("weather", 50001));

        assert!(registry.remove_if("weather", |h| h.info.port == 50002).is_none());
        assert!(registry.contains("weather"));
        assert!(registry.remove_if("weather", |h| h.info.port == 50001).is_some());
        assert!(registry.is_empty());
    }
}
