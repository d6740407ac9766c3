//! Sub-agent launchers: delegate a task description to a separate worker.
//!
//! [`LlmSubAgent`] runs each task as a `tokio::spawn` task with:
//! - Its own task-focused prompt, independent of the main turn's context
//! - The model provider it was built with (usually the parent's, or the
//!   `subagent.model` override)
//! - A wall-clock timeout, after which the task is aborted
//!
//! Running tasks are tracked by id so callers can inspect what is in flight.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use switchboard_core::error::{Collaborator, CollaboratorError, CollaboratorResult};
use switchboard_core::utils::{timestamp, truncate_string};
use switchboard_providers::LlmProvider;

/// Result of the offline sub-agent.
pub const STUB_SUB_AGENT_RESULT: &str = "Sub-agent finished its task and returned this result.";

/// Returned when the sub-agent model answers with blank text.
const EMPTY_RESULT: &str = "Sub-agent completed its task but produced no output.";

/// Length of the display label derived from the task text.
const LABEL_LEN: usize = 30;

/// Turns a task description into a result string.
#[async_trait]
pub trait SubAgentLauncher: Send + Sync {
    async fn launch_sub_agent(&self, task: &str) -> CollaboratorResult<String>;
}

fn unavailable(reason: impl Into<String>) -> CollaboratorError {
    CollaboratorError::unavailable(Collaborator::SubAgent, reason)
}

// ─────────────────────────────────────────────
// TaskInfo
// ─────────────────────────────────────────────

/// Metadata about a running sub-agent task.
#[derive(Clone, Debug)]
pub struct TaskInfo {
    /// Unique task identifier (UUID v4).
    pub id: String,
    /// Short display label for the task.
    pub label: String,
    /// Full task description sent to the sub-agent.
    pub task: String,
    /// RFC 3339 start time.
    pub started_at: String,
}

// ─────────────────────────────────────────────
// LlmSubAgent
// ─────────────────────────────────────────────

/// Runs each task through a model on its own tokio task.
pub struct LlmSubAgent {
    provider: Arc<dyn LlmProvider>,
    timeout: Duration,
    /// Currently running tasks, keyed by task ID.
    running_tasks: RwLock<HashMap<String, TaskInfo>>,
}

impl LlmSubAgent {
    pub fn new(provider: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self {
            provider,
            timeout,
            running_tasks: RwLock::new(HashMap::new()),
        }
    }

    /// Get info about currently running tasks.
    pub async fn running_tasks(&self) -> Vec<TaskInfo> {
        let tasks = self.running_tasks.read().await;
        tasks.values().cloned().collect()
    }

    /// Get the number of running tasks.
    pub async fn task_count(&self) -> usize {
        let tasks = self.running_tasks.read().await;
        tasks.len()
    }

    async fn run_task(&self, task_id: &str, task: &str) -> CollaboratorResult<String> {
        let provider = Arc::clone(&self.provider);
        let prompt = build_subagent_prompt(task);
        let mut handle = tokio::spawn(async move { provider.get_response(&prompt).await });

        match tokio::time::timeout(self.timeout, &mut handle).await {
            Ok(Ok(Ok(result))) if result.trim().is_empty() => {
                warn!(task_id = %task_id, "sub-agent returned no output");
                Ok(EMPTY_RESULT.to_string())
            }
            Ok(Ok(Ok(result))) => Ok(result),
            Ok(Ok(Err(e))) => Err(unavailable(format!("task {task_id} failed: {e}"))),
            Ok(Err(join_err)) => Err(unavailable(format!(
                "task {task_id} did not complete: {join_err}"
            ))),
            Err(_) => {
                handle.abort();
                Err(unavailable(format!(
                    "task {task_id} timed out after {}s",
                    self.timeout.as_secs_f64()
                )))
            }
        }
    }
}

#[async_trait]
impl SubAgentLauncher for LlmSubAgent {
    async fn launch_sub_agent(&self, task: &str) -> CollaboratorResult<String> {
        let task_id = uuid::Uuid::new_v4().to_string();
        let info = TaskInfo {
            id: task_id.clone(),
            label: truncate_string(task, LABEL_LEN),
            task: task.to_string(),
            started_at: timestamp(),
        };

        info!(task_id = %task_id, label = %info.label, "sub-agent starting");
        {
            let mut tasks = self.running_tasks.write().await;
            tasks.insert(task_id.clone(), info);
        }

        let result = self.run_task(&task_id, task).await;

        {
            let mut tasks = self.running_tasks.write().await;
            tasks.remove(&task_id);
        }

        match &result {
            Ok(r) => info!(task_id = %task_id, result_len = r.len(), "sub-agent finished"),
            Err(e) => error!(task_id = %task_id, error = %e, "sub-agent task failed"),
        }
        debug!(task_id = %task_id, "sub-agent task cleaned up");
        result
    }
}

/// Build the sub-agent's prompt around the delegated task.
fn build_subagent_prompt(task: &str) -> String {
    format!(
        "# Sub-agent\n\
         You are a sub-agent launched by the main agent to complete a specific task.\n\n\
         ## Your Task\n\
         {task}\n\n\
         ## Rules\n\
         1. Stay focused: complete only the assigned task\n\
         2. Your final response will be reported back to the main agent\n\
         3. Do not initiate conversations or take on side tasks\n\
         4. Be concise but informative"
    )
}

// ─────────────────────────────────────────────
// StubSubAgent
// ─────────────────────────────────────────────

/// Offline launcher that always reports the same result.
#[derive(Clone, Copy, Debug, Default)]
pub struct StubSubAgent;

#[async_trait]
impl SubAgentLauncher for StubSubAgent {
    async fn launch_sub_agent(&self, _task: &str) -> CollaboratorResult<String> {
        Ok(STUB_SUB_AGENT_RESULT.to_string())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
