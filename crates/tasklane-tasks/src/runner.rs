//! Local host: declares tasks and runs their shell commands in dependency order

use std::collections::HashSet;
use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, instrument};

use tasklane_core::{ExecutionReport, HelperError, Result, TaskHandle, TaskResult, TaskStatus};

use crate::plan::ExecutionPlan;
use crate::registry::TaskRegistry;
use crate::reporter::{RunSummary, TaskEvent, TaskReporter};

/// Options for the local host
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Keep running tasks that do not depend on a failed one
    pub continue_on_error: bool,
    /// Report every task as skipped instead of running it
    pub dry_run: bool,
    /// Working directory for task commands
    pub root_dir: std::path::PathBuf,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            continue_on_error: false,
            dry_run: false,
            root_dir: std::env::current_dir().unwrap_or_default(),
        }
    }
}

/// A build host that keeps a shell command per task and runs targets sequentially
pub struct LocalHost {
    commands: DashMap<String, String>,
    next_handle: AtomicU64,
    options: RunnerOptions,
    reporter: Arc<dyn TaskReporter>,
}

impl LocalHost {
    pub fn new(options: RunnerOptions, reporter: Arc<dyn TaskReporter>) -> Self {
        Self {
            commands: DashMap::new(),
            next_handle: AtomicU64::new(1),
            options,
            reporter,
        }
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Declare a task; every call returns a fresh handle
    pub fn declare(&self, name: &str) -> TaskHandle {
        let id = self.next_handle.fetch_add(1, Ordering::SeqCst);
        debug!(task = name, id, "declared task on local host");
        TaskHandle::new(format!("local-{}", id))
    }

    /// Attach the shell command a task runs
    pub fn set_command(&self, task: &str, command: impl Into<String>) {
        self.commands.insert(task.to_string(), command.into());
    }

    pub fn command(&self, task: &str) -> Option<String> {
        self.commands.get(task).map(|c| c.value().clone())
    }

    /// Plan a target against the registry
    pub fn plan(&self, registry: &TaskRegistry, target: &str) -> Result<ExecutionPlan> {
        ExecutionPlan::for_target(registry, target).map_err(|e| HelperError::Execution {
            target: target.to_string(),
            reason: e.to_string(),
        })
    }

    /// Human readable plan for a target
    pub fn describe(&self, registry: &TaskRegistry, target: &str) -> Result<String> {
        let plan = self.plan(registry, target)?;
        Ok(plan.execution_plan(|name| self.command(name)))
    }

    /// Run a target and everything it depends on
    pub fn run(&self, registry: &TaskRegistry, target: &str) -> Result<ExecutionReport> {
        let plan = self.plan(registry, target)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(runtime.block_on(self.execute(&plan)))
    }

    /// Execute a plan one task at a time
    #[instrument(skip_all, fields(target_name = plan.target(), tasks = plan.len()))]
    pub async fn execute(&self, plan: &ExecutionPlan) -> ExecutionReport {
        let start = Instant::now();
        let mut report = ExecutionReport::new(plan.target());
        let mut blocked: HashSet<&str> = HashSet::new();

        self.reporter.report(&TaskEvent::PlanReady {
            target: plan.target().to_string(),
            waves: plan.waves().to_vec(),
        });

        for name in plan.sorted() {
            let depends_on_failure = plan
                .get(name)
                .is_some_and(|node| node.dependencies.iter().any(|d| blocked.contains(d.as_str())));
            let stop = !blocked.is_empty() && !self.options.continue_on_error;

            if stop || depends_on_failure {
                let reason = "an earlier task failed";
                self.reporter.report(&TaskEvent::Skipped {
                    task: name.clone(),
                    reason: reason.to_string(),
                });
                report.results.push(TaskResult::skipped(name, reason));
                blocked.insert(name.as_str());
                continue;
            }

            let result = self.execute_task(name).await;
            if matches!(result.status, TaskStatus::Failed(_)) {
                blocked.insert(name.as_str());
            }
            report.results.push(result);
        }

        self.reporter
            .report(&TaskEvent::Finished(RunSummary::from_report(&report, start.elapsed())));

        report
    }

    async fn execute_task(&self, name: &str) -> TaskResult {
        let Some(command) = self.command(name) else {
            self.reporter.report(&TaskEvent::Skipped {
                task: name.to_string(),
                reason: "no action".to_string(),
            });
            return TaskResult::skipped(name, "no action");
        };

        if self.options.dry_run {
            self.reporter.report(&TaskEvent::Skipped {
                task: name.to_string(),
                reason: "dry run".to_string(),
            });
            return TaskResult::skipped(name, "dry run");
        }

        let start = Instant::now();
        self.reporter.report(&TaskEvent::Started {
            task: name.to_string(),
            command: command.clone(),
        });

        let result = run_shell_command(name, &command, &self.options.root_dir, self.reporter.as_ref()).await;
        let duration = start.elapsed();

        match result {
            Ok(()) => {
                self.reporter.report(&TaskEvent::Completed {
                    task: name.to_string(),
                    duration,
                });
                TaskResult {
                    task: name.to_string(),
                    status: TaskStatus::Success,
                    duration,
                }
            }
            Err(e) => {
                self.reporter.report(&TaskEvent::Failed {
                    task: name.to_string(),
                    duration,
                    error: e.clone(),
                });
                TaskResult {
                    task: name.to_string(),
                    status: TaskStatus::Failed(e),
                    duration,
                }
            }
        }
    }
}

impl std::fmt::Debug for LocalHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalHost")
            .field("commands", &self.commands.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Run a shell command, streaming its output to the reporter
async fn run_shell_command(
    task: &str,
    cmd: &str,
    root_dir: &Path,
    reporter: &dyn TaskReporter,
) -> std::result::Result<(), String> {
    let (shell, flag) = if cfg!(windows) { ("cmd", "/C") } else { ("sh", "-c") };
    let mut child = Command::new(shell)
        .arg(flag)
        .arg(cmd)
        .current_dir(root_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to spawn: {}", e))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (_, stderr_lines) = tokio::join!(
        forward_lines(task, stdout, false, reporter),
        forward_lines(task, stderr, true, reporter),
    );

    let status = child
        .wait()
        .await
        .map_err(|e| format!("Failed to wait: {}", e))?;

    if status.success() {
        Ok(())
    } else {
        let code = status.code().unwrap_or(-1);
        Err(format!(
            "Command exited with code {}: {}",
            code,
            stderr_lines.join("\n")
        ))
    }
}

async fn forward_lines<R>(
    task: &str,
    stream: Option<R>,
    is_stderr: bool,
    reporter: &dyn TaskReporter,
) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let mut collected = Vec::new();
    let Some(stream) = stream else {
        return collected;
    };

    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        reporter.report(&TaskEvent::Output {
            task: task.to_string(),
            line: line.clone(),
            is_stderr,
        });
        collected.push(line);
    }
    collected
}
