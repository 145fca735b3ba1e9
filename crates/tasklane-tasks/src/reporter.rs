//! Progress events raised while a host runs a target

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, error, info, trace};

use tasklane_core::{ExecutionReport, TaskStatus};

/// Something that happened while running a target
#[derive(Debug, Clone)]
pub enum TaskEvent {
    /// A target was planned. Every task in a wave depends only on earlier waves.
    PlanReady {
        target: String,
        waves: Vec<Vec<String>>,
    },
    Started {
        task: String,
        command: String,
    },
    /// One line of a task's stdout or stderr
    Output {
        task: String,
        line: String,
        is_stderr: bool,
    },
    Completed {
        task: String,
        duration: Duration,
    },
    Failed {
        task: String,
        duration: Duration,
        error: String,
    },
    /// The task was not run (no action, dry run, earlier failure)
    Skipped {
        task: String,
        reason: String,
    },
    /// Every task of the plan has been handled
    Finished(RunSummary),
}

impl TaskEvent {
    /// Task the event is about; `None` for plan-level events
    pub fn task(&self) -> Option<&str> {
        match self {
            Self::Started { task, .. }
            | Self::Output { task, .. }
            | Self::Completed { task, .. }
            | Self::Failed { task, .. }
            | Self::Skipped { task, .. } => Some(task.as_str()),
            Self::PlanReady { .. } | Self::Finished(_) => None,
        }
    }
}

/// Counts for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration: Duration,
}

impl RunSummary {
    pub fn from_report(report: &ExecutionReport, duration: Duration) -> Self {
        let mut summary = Self {
            total: report.results.len(),
            duration,
            ..Self::default()
        };
        for result in &report.results {
            match result.status {
                TaskStatus::Success => summary.succeeded += 1,
                TaskStatus::Failed(_) => summary.failed += 1,
                TaskStatus::Skipped(_) => summary.skipped += 1,
            }
        }
        summary
    }
}

/// Receives progress events from a host
pub trait TaskReporter: Send + Sync {
    fn report(&self, event: &TaskEvent);
}

/// Writes events to the tracing subscriber as structured records
#[derive(Debug, Default)]
pub struct TracingReporter;

impl TaskReporter for TracingReporter {
    fn report(&self, event: &TaskEvent) {
        match event {
            TaskEvent::PlanReady { target, waves } => {
                let tasks: usize = waves.iter().map(Vec::len).sum();
                info!(target_name = %target, waves = waves.len(), tasks, "target planned");
            }
            TaskEvent::Started { task, command } => info!(task = %task, command = %command, "task started"),
            TaskEvent::Output { task, line, is_stderr } => {
                if *is_stderr {
                    debug!(task = %task, stream = "stderr", "{}", line);
                } else {
                    trace!(task = %task, stream = "stdout", "{}", line);
                }
            }
            TaskEvent::Completed { task, duration } => {
                info!(task = %task, duration_ms = duration.as_millis() as u64, "task completed");
            }
            TaskEvent::Failed { task, duration, error } => {
                error!(task = %task, duration_ms = duration.as_millis() as u64, error = %error, "task failed");
            }
            TaskEvent::Skipped { task, reason } => debug!(task = %task, reason = %reason, "task skipped"),
            TaskEvent::Finished(summary) => info!(
                total = summary.total,
                succeeded = summary.succeeded,
                failed = summary.failed,
                skipped = summary.skipped,
                duration_ms = summary.duration.as_millis() as u64,
                "run finished"
            ),
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<TaskEvent>>,
}

impl CollectingReporter {
    pub fn events(&self) -> Vec<TaskEvent> {
        self.lock().clone()
    }

    /// Names of the tasks that started, in start order
    pub fn started(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                TaskEvent::Started { task, .. } => Some(task.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<TaskEvent>> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl TaskReporter for CollectingReporter {
    fn report(&self, event: &TaskEvent) {
        self.lock().push(event.clone());
    }
}

/// Forwards every event to each of its reporters, in order
pub struct Reporters {
    reporters: Vec<Arc<dyn TaskReporter>>,
}

impl Reporters {
    /// Starts with a [`TracingReporter`]
    pub fn new() -> Self {
        Self::empty().with(TracingReporter)
    }

    pub fn empty() -> Self {
        Self {
            reporters: Vec::new(),
        }
    }

    pub fn with<R: TaskReporter + 'static>(mut self, reporter: R) -> Self {
        self.push(Arc::new(reporter));
        self
    }

    pub fn push(&mut self, reporter: Arc<dyn TaskReporter>) {
        self.reporters.push(reporter);
    }

    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }
}

impl Default for Reporters {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskReporter for Reporters {
    fn report(&self, event: &TaskEvent) {
        for reporter in &self.reporters {
            reporter.report(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklane_core::TaskResult;

    #[test]
    fn test_event_task() {
        let started = TaskEvent::Started {
            task: "Build-Sln".to_string(),
            command: "cargo build".to_string(),
        };
        assert_eq!(started.task(), Some("Build-Sln"));
        assert_eq!(TaskEvent::Finished(RunSummary::default()).task(), None);
    }

    #[test]
    fn test_summary_counts_statuses() {
        let mut report = ExecutionReport::new("Build-All");
        report.results.push(TaskResult {
            task: "Build-Sln".to_string(),
            status: TaskStatus::Success,
            duration: Duration::from_millis(5),
        });
        report.results.push(TaskResult {
            task: "Test-Unit-Sln".to_string(),
            status: TaskStatus::Failed("exit 1".to_string()),
            duration: Duration::from_millis(5),
        });
        report.results.push(TaskResult::skipped("Build-All", "no action"));

        let summary = RunSummary::from_report(&report, Duration::from_secs(1));
        assert_eq!(
            summary,
            RunSummary {
                total: 3,
                succeeded: 1,
                failed: 1,
                skipped: 1,
                duration: Duration::from_secs(1),
            }
        );
    }

    #[test]
    fn test_fan_out_reaches_every_reporter() {
        let first = Arc::new(CollectingReporter::default());
        let second = Arc::new(CollectingReporter::default());
        let mut reporters = Reporters::new();
        reporters.push(first.clone());
        reporters.push(second.clone());
        assert_eq!(reporters.len(), 3);

        reporters.report(&TaskEvent::PlanReady {
            target: "Build-All".to_string(),
            waves: vec![vec!["Clean-Build-Sln".to_string()], vec!["Build-Sln".to_string()]],
        });
        reporters.report(&TaskEvent::Started {
            task: "Clean-Build-Sln".to_string(),
            command: "cargo clean".to_string(),
        });

        assert_eq!(first.events().len(), 2);
        assert_eq!(second.started(), vec!["Clean-Build-Sln"]);
        assert!(Reporters::empty().is_empty());
    }
}
