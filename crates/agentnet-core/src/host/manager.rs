//! Agent lifecycle manager

use super::ports::PortAllocator;
use super::registry::{AgentHandle, AgentRegistry};
use super::server;
use crate::agent::Agent;
use crate::config::NetworkConfig;
use crate::error::{AgentError, Error, HostError, Result};
use crate::types::{AgentInfo, AgentStatus};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Starts and stops agent listeners, publishing them to a registry
pub struct AgentHost {
    config: NetworkConfig,
    registry: AgentRegistry,
    ports: PortAllocator,
}

impl AgentHost {
    /// Create a host over `registry`.
    ///
    /// Fails when `config` does not pass `NetworkConfig::validate`.
    pub fn new(config: NetworkConfig, registry: AgentRegistry) -> Result<Self> {
        config.validate()?;
        let ports = PortAllocator::new(&config);
        Ok(Self {
            config,
            registry,
            ports,
        })
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Start an agent under `name` on a free port.
    ///
    /// Returns once the listener has reported ready. The agent may still be
    /// unreachable for a moment afterwards; callers that need liveness probe.
    pub async fn start<F>(&self, name: &str, factory: F) -> Result<AgentInfo>
    where
        F: FnOnce() -> Arc<dyn Agent>,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Agent(AgentError::InvalidConfig(
                "agent name must not be empty".to_string(),
            )));
        }

        self.registry.reserve(name)?;

        match self.launch(name, factory).await {
            Ok(info) => Ok(info),
            Err(e) => {
                self.registry.release(name);
                error!("Failed to start agent {}: {}", name, e);
                Err(e)
            }
        }
    }

    async fn launch<F>(&self, name: &str, factory: F) -> Result<AgentInfo>
    where
        F: FnOnce() -> Arc<dyn Agent>,
    {
        let registry = &self.registry;
        let listener = self
            .ports
            .claim(&self.config.bind_host, |port| registry.port_in_use(port))
            .await?;
        let port = listener.local_addr()?.port();

        let instance = factory();
        let endpoint = self.config.endpoint_for(port);
        let mut descriptor = instance.descriptor();
        descriptor.url = endpoint.clone();
        let descriptor = Arc::new(descriptor);

        let app = server::router(name, instance, Arc::clone(&descriptor));
        let (ready_tx, ready_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = server::spawn_listener(
            name.to_string(),
            listener,
            app,
            ready_tx,
            shutdown_rx,
            self.registry.clone(),
        );

        match tokio::time::timeout(self.config.ready_timeout(), ready_rx).await {
            Ok(Ok(addr)) => debug!("Listener for {} ready on {}", name, addr),
            Ok(Err(_)) => {
                task.abort();
                return Err(Error::Host(HostError::BindFailed {
                    agent: name.to_string(),
                    reason: "listener exited before becoming ready".to_string(),
                }));
            }
            Err(_) => {
                task.abort();
                return Err(Error::Host(HostError::BindFailed {
                    agent: name.to_string(),
                    reason: format!(
                        "listener not ready within {}ms",
                        self.config.ready_timeout_ms
                    ),
                }));
            }
        }

        let info = AgentInfo {
            name: name.to_string(),
            port,
            endpoint,
            status: AgentStatus::Running,
            started_at: chrono::Utc::now(),
        };

        self.registry.publish(AgentHandle {
            info: info.clone(),
            descriptor,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        });

        info!("Started {} agent on port {}", name, port);
        Ok(info)
    }

    /// Stop a running agent.
    ///
    /// Returns `Ok(false)` when no agent is registered under `name`, and
    /// `AgentError::Busy` while a start for `name` is still in flight.
    pub async fn stop(&self, name: &str) -> Result<bool> {
        if self.registry.is_starting(name) {
            return Err(Error::Agent(AgentError::Busy(name.to_string())));
        }

        let Some(mut handle) = self.registry.remove(name) else {
            warn!("Agent {} not found in running agents", name);
            return Ok(false);
        };

        info!("Stopping {} agent server", name);
        handle.info.status = AgentStatus::Stopped;

        if let Some(tx) = handle.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(task) = handle.task.take() {
            let abort = task.abort_handle();
            match tokio::time::timeout(self.config.shutdown_timeout(), task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Listener task for {} ended abnormally: {}", name, e),
                Err(_) => {
                    warn!(
                        "Listener for {} did not stop within {}ms, aborting",
                        name, self.config.shutdown_timeout_ms
                    );
                    abort.abort();
                }
            }
        }

        info!("Agent stopped: {}", name);
        Ok(true)
    }

    /// Names of running agents in start order
    pub fn list(&self) -> Vec<String> {
        self.registry.names()
    }

    pub fn info(&self, name: &str) -> Option<AgentInfo> {
        self.registry.info(name)
    }

    pub fn status(&self, name: &str) -> AgentStatus {
        self.registry.status(name)
    }

    /// Stop all running agents
    pub async fn stop_all(&self) -> Result<()> {
        for name in self.list() {
            if let Err(e) = self.stop(&name).await {
                error!("Error stopping agent {}: {}", name, e);
            }
        }
        Ok(())
    }
}
