//! Sequential multi-agent workflows
//!
//! Each agent's reply is forwarded to the next agent in the list. The whole
//! exchange is recorded as one causally linked conversation.

use super::discovery::DiscoveredAgents;
use super::invoke::invoke;
use super::transport::AgentTransport;
use crate::error::{Error, Result, WorkflowError};
use crate::types::{Conversation, Message, MessageRole};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How a workflow run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkflowStatus {
    Completed,
    /// Hop `step` (zero-based) failed; later hops were not attempted
    Incomplete {
        step: usize,
        agent: String,
        error: String,
    },
}

/// Transcript and outcome of a workflow
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRun {
    pub conversation: Conversation,
    pub status: WorkflowStatus,
}

impl WorkflowRun {
    pub fn is_complete(&self) -> bool {
        self.status == WorkflowStatus::Completed
    }

    /// Final reply of a completed run
    pub fn result(&self) -> Option<&Message> {
        if self.is_complete() {
            self.conversation.last()
        } else {
            None
        }
    }

    pub fn failed_step(&self) -> Option<usize> {
        match &self.status {
            WorkflowStatus::Incomplete { step, .. } => Some(*step),
            WorkflowStatus::Completed => None,
        }
    }
}

pub struct WorkflowOrchestrator {
    transport: Arc<dyn AgentTransport>,
}

impl WorkflowOrchestrator {
    pub fn new(transport: Arc<dyn AgentTransport>) -> Self {
        Self { transport }
    }

    /// Run `initial` through `workflow` in order.
    ///
    /// Every step is validated against `agents` before the first send. A
    /// failing hop ends the run with the transcript gathered so far.
    pub async fn run(
        &self,
        initial: Message,
        workflow: &[String],
        agents: &DiscoveredAgents,
    ) -> Result<WorkflowRun> {
        if workflow.is_empty() {
            return Err(Error::Workflow(WorkflowError::Empty));
        }

        let mut steps = Vec::with_capacity(workflow.len());
        for (step, name) in workflow.iter().enumerate() {
            match agents.get(name).filter(|a| a.available) {
                Some(agent) => steps.push(agent),
                None => {
                    return Err(Error::Workflow(WorkflowError::UnknownAgent {
                        step,
                        agent: name.clone(),
                    }))
                }
            }
        }

        let conversation_id = initial
            .conversation_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let mut conversation = Conversation::new(conversation_id);
        info!(
            "Starting workflow {} over {} agent(s): {}",
            conversation.conversation_id,
            steps.len(),
            workflow.join(" -> ")
        );

        let mut outgoing = initial;
        for (step, agent) in steps.into_iter().enumerate() {
            let sent = conversation.append(outgoing).clone();
            debug!("Step {}: sending to {}", step, agent.name);

            let mut reply = match invoke(self.transport.as_ref(), agent, sent.clone()).await {
                Ok(reply) => reply,
                Err(e) => {
                    warn!("Workflow stopped at step {} ({}): {}", step, agent.name, e);
                    return Ok(WorkflowRun {
                        conversation,
                        status: WorkflowStatus::Incomplete {
                            step,
                            agent: agent.name.clone(),
                            error: e.to_string(),
                        },
                    });
                }
            };

            reply.role = MessageRole::Agent;
            if reply.message_id == sent.message_id {
                reply.message_id = uuid::Uuid::new_v4().to_string();
            }
            let reply = conversation.append(reply);

            outgoing = Message::new(MessageRole::User, reply.content.clone());
        }

        info!("Workflow {} completed", conversation.conversation_id);
        Ok(WorkflowRun {
            conversation,
            status: WorkflowStatus::Completed,
        })
    }
}
