//! Execution bridge: the boundary to the build host

use std::sync::Arc;

use tracing::debug;

use tasklane_core::{require_non_blank, ExecutionReport, HelperError, HelperSettings, Result, TaskHandle};

use crate::task::Task;

/// Adapter that turns registry requests into calls of the host's functions
#[derive(Debug, Clone)]
pub struct ExecutionBridge {
    settings: Arc<HelperSettings>,
}

impl ExecutionBridge {
    pub fn new(settings: Arc<HelperSettings>) -> Self {
        Self { settings }
    }

    /// Settings the bridge reads its host functions from
    pub fn settings(&self) -> &Arc<HelperSettings> {
        &self.settings
    }

    /// Declare a task with the host
    pub fn declare(&self, name: &str) -> Result<TaskHandle> {
        let declare = self.settings.declare_task().ok_or_else(|| {
            HelperError::invalid_argument("declare_task", "no declare-task function is configured")
        })?;
        let handle = declare(name);
        debug!(task = name, handle = %handle, "task declared with host");
        Ok(handle)
    }

    /// Ask the host to run a target and its dependencies
    pub fn run_target(&self, name: &str) -> Result<ExecutionReport> {
        require_non_blank("target", name)?;
        let run = self.settings.run_target().ok_or_else(|| {
            HelperError::invalid_argument("run_target", "no run-target function is configured")
        })?;
        debug!(target_name = name, "running target through host");
        run(name)
    }

    /// Run a registered task by its name
    pub fn run_task(&self, task: &Task) -> Result<ExecutionReport> {
        self.run_target(task.name())
    }
}
