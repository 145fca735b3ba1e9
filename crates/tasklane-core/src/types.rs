//! Types shared between the core and build hosts

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque handle a host hands back when a task is declared
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHandle(String);

impl TaskHandle {
    /// Create a handle from any host-side identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The host-side identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a single task run by a host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Task completed successfully
    Success,
    /// Task failed
    Failed(String),
    /// Task was not executed
    Skipped(String),
}

impl TaskStatus {
    /// Check if this status represents success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Result of a single task execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// Name of the task that was executed
    pub task: String,
    /// Whether the task succeeded
    pub status: TaskStatus,
    /// How long the task took
    pub duration: Duration,
}

impl TaskResult {
    /// Result for a task that was never started
    pub fn skipped(task: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            status: TaskStatus::Skipped(reason.into()),
            duration: Duration::ZERO,
        }
    }
}

/// Report returned by a host after running a target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Target that was requested
    pub target: String,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Per-task results in execution order
    pub results: Vec<TaskResult>,
}

impl ExecutionReport {
    /// Create an empty report for a target
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            started_at: Utc::now(),
            results: Vec::new(),
        }
    }

    /// Whether every task that ran succeeded
    pub fn succeeded(&self) -> bool {
        self.results
            .iter()
            .all(|r| !matches!(r.status, TaskStatus::Failed(_)))
    }

    /// Tasks that failed
    pub fn failures(&self) -> Vec<&TaskResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.status, TaskStatus::Failed(_)))
            .collect()
    }

    /// Total time spent in tasks
    pub fn duration(&self) -> Duration {
        self.results.iter().map(|r| r.duration).sum()
    }
}
