//! CLI definition and command handling

pub mod init;
pub mod output;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, warn};

use tasklane_command::CommandDispatcherScope;
use tasklane_core::config::{load_config, load_config_or_default, Config};
use tasklane_core::{ArgumentMap, BuildContext, ExecutionReport, HelperError, HelperScope, HelperSettings};
use tasklane_tasks::{LocalHost, Reporters, RunnerOptions, TaskHelper, TaskHelperScope, TaskReporter};

use output::{ConsoleDiagnostics, ConsoleReporter};

/// tasklane - convention-driven build task runner
///
/// Everything after the options is handed to the build script as actions,
/// for example `tasklane --run=Build-All` or `tasklane -at`.
#[derive(Debug, Parser)]
#[command(name = "tasklane")]
#[command(author, version, about, long_about = None)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Task file to load instead of searching for one
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,

    /// Working directory
    #[arg(short = 'C', long)]
    pub directory: Option<PathBuf>,

    /// Show the execution plan instead of running commands
    #[arg(long)]
    pub dry_run: bool,

    /// Keep running tasks that do not depend on a failed one
    #[arg(long)]
    pub continue_on_error: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format for run summaries
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Write a starter tasklane.toml and exit
    #[arg(long)]
    pub init: bool,

    /// Overwrite an existing task file with --init
    #[arg(long, requires = "init")]
    pub force: bool,

    /// Build script actions (--support|-h, --available-targets|-at, --run|-r=<target>, ...)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    pub actions: Vec<String>,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

impl Cli {
    /// Execute the command line
    pub fn execute(self) -> anyhow::Result<()> {
        if let Some(ref dir) = self.directory {
            std::env::set_current_dir(dir)
                .with_context(|| format!("cannot change directory to {}", dir.display()))?;
        }
        let cwd = std::env::current_dir()?;

        if self.init {
            init::write_template(&cwd, self.force)?;
            return Ok(());
        }

        let (config, config_path) = self.load_config(&cwd)?;
        let root_dir = config_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or(cwd);

        let host = Arc::new(LocalHost::new(
            RunnerOptions {
                continue_on_error: self.continue_on_error,
                dry_run: self.dry_run,
                root_dir,
            },
            self.reporter(),
        ));

        let settings = HelperSettings::from_config(&config.script);
        let declaring = Arc::clone(&host);
        settings.set_declare_task(Arc::new(move |name: &str| declaring.declare(name)));

        let context = BuildContext::new(
            Arc::new(ArgumentMap::parse(&self.actions)),
            Arc::new(ConsoleDiagnostics::new(self.verbose, self.quiet)),
        );
        let scope = HelperScope::new(context, settings);
        let tasks = scope.task_helper()?;
        self.install_runner(&scope, &tasks, &host);

        register_tasks(&tasks, &host, &config)?;

        let dispatcher = scope.command_dispatcher()?;
        dispatcher.set_script_description(config.script.description.clone());
        if let Some(ref target) = config.script.default_target {
            dispatcher.set_default_target(target.clone());
        }
        for argument in &config.arguments {
            let added = match argument.target {
                Some(ref target) => {
                    dispatcher.add_target_argument(&argument.name, &argument.short, &argument.description, target)
                }
                None => dispatcher.add_argument(&argument.name, &argument.short, &argument.description),
            };
            if added.is_none() {
                warn!(argument = %argument.name, "skipping incomplete argument definition");
            }
        }

        let outcome = scope.run_command();
        scope.clear();
        let outcome = outcome?;
        debug!(?outcome, "dispatch finished");
        Ok(())
    }

    /// Load the task file named with `--file`, or the nearest one found
    fn load_config(&self, cwd: &Path) -> anyhow::Result<(Config, Option<PathBuf>)> {
        if let Some(ref file) = self.file {
            let config = load_config(file)
                .with_context(|| format!("failed to load task file {}", file.display()))?;
            return Ok((config, Some(file.clone())));
        }

        load_config_or_default(cwd).context("failed to load task file")
    }

    fn reporter(&self) -> Arc<dyn TaskReporter> {
        let reporters = Reporters::new();
        if self.quiet || self.format == OutputFormat::Json {
            return Arc::new(reporters);
        }
        Arc::new(reporters.with(ConsoleReporter::new(self.verbose)))
    }

    /// Route run requests from the scope to the local host
    fn install_runner(&self, scope: &HelperScope, tasks: &Arc<TaskHelper>, host: &Arc<LocalHost>) {
        let tasks = Arc::downgrade(tasks);
        let host = Arc::clone(host);
        let dry_run = self.dry_run;
        let format = self.format;

        scope.settings().set_run_target(Arc::new(move |target: &str| -> tasklane_core::Result<ExecutionReport> {
            let tasks = tasks
                .upgrade()
                .ok_or_else(|| HelperError::other("task helper is no longer available"))?;

            if dry_run && format == OutputFormat::Text {
                println!("{}", output::header(&format!("Plan for {}", target)));
                println!("{}", host.describe(tasks.registry(), target)?);
                output::info("[DRY RUN - no tasks will be executed]");
            }

            let report = host.run(tasks.registry(), target)?;
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&output::report_json(&report))?);
            }
            Ok(report)
        }));
    }
}

/// Register the task file's tasks and attach their commands to the host
fn register_tasks(tasks: &TaskHelper, host: &LocalHost, config: &Config) -> anyhow::Result<()> {
    for entry in &config.tasks {
        let task = tasks
            .register(entry)
            .with_context(|| format!("failed to register {} task '{}'", entry.kind, entry.name))?;
        if let Some(ref command) = entry.command {
            host.set_command(task.name(), command.clone());
        }
        debug!(task = task.name(), kind = %entry.kind, "registered task from task file");
    }
    Ok(())
}
