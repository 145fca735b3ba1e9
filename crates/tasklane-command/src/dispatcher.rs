//! Command dispatcher
//!
//! Keeps the registered actions in order and runs the first one present on the
//! command line. `--support` turns any action into a request for its help text.

use std::sync::{Arc, RwLock};

use tracing::{debug, instrument};

use tasklane_core::config::DEFAULT_SCRIPT_DESCRIPTION;
use tasklane_core::{BuildContext, HelperError, HelperScope, Result, ScopedHelper};
use tasklane_tasks::{target_listing, TaskHelper, TaskHelperScope};

use crate::argument::CommandArgument;
use crate::help::{self, AVAILABLE_TARGETS_DESCRIPTION, HELP_DESCRIPTION, NO_TARGET_MESSAGE, RUN_DESCRIPTION};

/// What a dispatch did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No action matched, or help was asked for on its own
    HelpShown,
    /// Help was asked for together with this action
    ArgumentHelpShown(String),
    /// This action ran
    ActionExecuted(String),
}

/// Registry of command-line actions
pub struct CommandDispatcher {
    tasks: Arc<TaskHelper>,
    context: RwLock<Option<BuildContext>>,
    arguments: RwLock<Vec<Arc<CommandArgument>>>,
    help: Arc<CommandArgument>,
    available_targets: Arc<CommandArgument>,
    run: Arc<CommandArgument>,
    default_target: Arc<RwLock<String>>,
    script_description: RwLock<String>,
}

impl ScopedHelper for CommandDispatcher {
    fn bind_context(&self, context: &BuildContext) {
        *self
            .context
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(context.clone());
    }
}

impl CommandDispatcher {
    /// Create a dispatcher with the help, available-targets and run actions
    pub fn new(tasks: Arc<TaskHelper>, context: BuildContext) -> Result<Self> {
        let mut arguments = Vec::new();
        let mut builtin = |name: &str, short_name: &str, description: &str| {
            upsert(&mut arguments, name, short_name, description)
                .ok_or_else(|| HelperError::other(format!("built-in action '{}' is incomplete", name)))
        };
        let help = builtin("support", "h", HELP_DESCRIPTION)?;
        let available_targets = builtin("available-targets", "at", AVAILABLE_TARGETS_DESCRIPTION)?;
        let run = builtin("run", "r", RUN_DESCRIPTION)?;

        let default_target = Arc::new(RwLock::new(String::new()));

        let listing_tasks = Arc::clone(&tasks);
        available_targets.set_action(move |_, context| {
            for line in target_listing(listing_tasks.registry()) {
                context.diagnostics().information(&line);
            }
            Ok(())
        });

        let run_tasks = Arc::clone(&tasks);
        let run_default = Arc::clone(&default_target);
        run.set_action(move |argument, context| {
            let target = argument.value(context).or_else(|| {
                let default = run_default
                    .read()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .clone();
                (!default.trim().is_empty()).then_some(default)
            });
            let Some(target) = target else {
                context.diagnostics().error(NO_TARGET_MESSAGE);
                return Err(HelperError::invalid_argument("target", NO_TARGET_MESSAGE));
            };
            run_target(&run_tasks, &target)
        });

        Ok(Self {
            tasks,
            context: RwLock::new(Some(context)),
            arguments: RwLock::new(arguments),
            help,
            available_targets,
            run,
            default_target,
            script_description: RwLock::new(DEFAULT_SCRIPT_DESCRIPTION.to_string()),
        })
    }

    fn context(&self) -> Result<BuildContext> {
        self.context
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
            .ok_or_else(|| {
                HelperError::invalid_argument(
                    "context",
                    "build context needs to be set before using any helper",
                )
            })
    }

    pub fn task_helper(&self) -> &Arc<TaskHelper> {
        &self.tasks
    }

    /// Registered actions in registration order
    pub fn arguments(&self) -> Vec<Arc<CommandArgument>> {
        self.arguments
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn help_argument(&self) -> &Arc<CommandArgument> {
        &self.help
    }

    pub fn available_targets_argument(&self) -> &Arc<CommandArgument> {
        &self.available_targets
    }

    pub fn run_argument(&self) -> &Arc<CommandArgument> {
        &self.run
    }

    /// Target `--run` uses when given no value
    pub fn default_target(&self) -> String {
        self.default_target
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn set_default_target(&self, target: impl Into<String>) {
        *self
            .default_target
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = target.into();
    }

    pub fn script_description(&self) -> String {
        self.script_description
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn set_script_description(&self, description: impl Into<String>) {
        *self
            .script_description
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = description.into();
    }

    /// Add an action, or update the one already using `name` or `short_name`.
    ///
    /// Returns `None` when any of the strings is blank.
    pub fn add_argument(&self, name: &str, short_name: &str, description: &str) -> Option<Arc<CommandArgument>> {
        let mut arguments = self
            .arguments
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let added = upsert(&mut arguments, name, short_name, description);
        if added.is_none() {
            if let Ok(context) = self.context() {
                context
                    .diagnostics()
                    .debug("Missing name, shortName, or description for command");
            }
        }
        added
    }

    /// Add an action that runs a fixed target
    pub fn add_target_argument(
        &self,
        name: &str,
        short_name: &str,
        description: &str,
        target: &str,
    ) -> Option<Arc<CommandArgument>> {
        let argument = self.add_argument(name, short_name, description)?;
        let tasks = Arc::clone(&self.tasks);
        let target = target.to_string();
        argument.set_action(move |_, _| run_target(&tasks, &target));
        Some(argument)
    }

    /// Run the first action given on the command line, or show help
    #[instrument(skip(self))]
    pub fn run(&self) -> Result<DispatchOutcome> {
        let context = self.context()?;
        let diagnostics = context.diagnostics();

        let help_requested = self.help.is_present(&context);
        diagnostics.debug(&format!("Help Set: {}", help_requested));

        let selected = self
            .arguments()
            .into_iter()
            .filter(|argument| !Arc::ptr_eq(argument, &self.help))
            .find(|argument| argument.is_present(&context));

        match selected {
            Some(argument) if help_requested => {
                help::emit(diagnostics, &argument.description());
                Ok(DispatchOutcome::ArgumentHelpShown(argument.name()))
            }
            Some(argument) => {
                debug!(action = %argument.name(), "dispatching action");
                argument.invoke(&context)?;
                Ok(DispatchOutcome::ActionExecuted(argument.name()))
            }
            None => {
                let body = help::general_help(&self.script_description(), &self.arguments(), &self.help);
                help::emit(diagnostics, &body);
                Ok(DispatchOutcome::HelpShown)
            }
        }
    }
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("arguments", &self.arguments().len())
            .field("default_target", &self.default_target())
            .finish_non_exhaustive()
    }
}

fn upsert(
    arguments: &mut Vec<Arc<CommandArgument>>,
    name: &str,
    short_name: &str,
    description: &str,
) -> Option<Arc<CommandArgument>> {
    if [name, short_name, description].iter().any(|s| s.trim().is_empty()) {
        debug!("missing name, short name or description for command");
        return None;
    }

    let argument = match arguments.iter().find(|a| a.answers_to(name, short_name)) {
        Some(existing) => Arc::clone(existing),
        None => {
            let created = Arc::new(CommandArgument::default());
            arguments.push(Arc::clone(&created));
            created
        }
    };
    argument.set_labels(name.to_string(), short_name.to_string(), description.to_string());
    Some(argument)
}

/// Run a target through the task helper; a failed task fails the action
fn run_target(tasks: &TaskHelper, target: &str) -> Result<()> {
    let report = tasks.run_target(target)?;
    let failures: Vec<&str> = report.failures().iter().map(|r| r.task.as_str()).collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(HelperError::Execution {
            target: target.to_string(),
            reason: format!("{} failed", failures.join(", ")),
        })
    }
}

/// Access to the scope's [`CommandDispatcher`]
pub trait CommandDispatcherScope {
    fn command_dispatcher(&self) -> Result<Arc<CommandDispatcher>>;

    /// Dispatch the command line of the scope's context
    fn run_command(&self) -> Result<DispatchOutcome> {
        self.command_dispatcher()?.run()
    }
}

impl CommandDispatcherScope for HelperScope {
    fn command_dispatcher(&self) -> Result<Arc<CommandDispatcher>> {
        self.get_instance(|scope, context| CommandDispatcher::new(scope.task_helper()?, context.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tasklane_core::{
        ArgumentMap, CollectingDiagnostics, ExecutionReport, HelperSettings, TaskHandle, TaskResult, TaskStatus,
        Verbosity,
    };

    struct Harness {
        scope: HelperScope,
        diagnostics: Arc<CollectingDiagnostics>,
        runs: Arc<Mutex<Vec<String>>>,
    }

    fn harness(tokens: &[&str]) -> Harness {
        let diagnostics = Arc::new(CollectingDiagnostics::default());
        let runs = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&runs);
        let settings = HelperSettings::new()
            .with_declare_task(|name| TaskHandle::new(name))
            .with_run_target(move |name| {
                recorder.lock().unwrap().push(name.to_string());
                Ok(ExecutionReport::new(name))
            });
        let context = BuildContext::new(Arc::new(ArgumentMap::parse(tokens)), diagnostics.clone());
        Harness {
            scope: HelperScope::new(context, settings),
            diagnostics,
            runs,
        }
    }

    impl Harness {
        fn runs(&self) -> Vec<String> {
            self.runs.lock().unwrap().clone()
        }
    }

    #[test]
    fn test_builtins_registered_in_order() {
        let h = harness(&[]);
        let dispatcher = h.scope.command_dispatcher().unwrap();
        let names: Vec<String> = dispatcher.arguments().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["support", "available-targets", "run"]);
        assert_eq!(dispatcher.help_argument().short_name(), "h");
        assert_eq!(dispatcher.available_targets_argument().short_name(), "at");
        assert_eq!(dispatcher.run_argument().short_name(), "r");
        assert_eq!(dispatcher.script_description(), "Build Script");
        assert_eq!(dispatcher.default_target(), "");
    }

    #[test]
    fn test_no_arguments_shows_general_help() {
        let h = harness(&[]);
        let outcome = h.scope.run_command().unwrap();

        assert_eq!(outcome, DispatchOutcome::HelpShown);
        let output = h.diagnostics.output();
        assert!(output.contains("Build Script"));
        assert!(output.contains("Available Actions:"));
        assert!(output.contains("  --support|-h"));
        assert!(output.contains("  --available-targets|-at"));
        assert!(output.contains("  --run|-r"));
        assert!(h.runs().is_empty());
    }

    #[test]
    fn test_run_with_value_runs_exactly_that_target() {
        let h = harness(&["--run=Build-All"]);
        let outcome = h.scope.run_command().unwrap();

        assert_eq!(outcome, DispatchOutcome::ActionExecuted("run".to_string()));
        assert_eq!(h.runs(), vec!["Build-All"]);
    }

    #[test]
    fn test_run_short_form_with_value() {
        let h = harness(&["-r", "Build-Sln"]);
        h.scope.run_command().unwrap();
        assert_eq!(h.runs(), vec!["Build-Sln"]);
    }

    #[test]
    fn test_run_without_target_fails() {
        let h = harness(&["--run="]);
        let err = h.scope.run_command().unwrap_err();

        assert!(err.is_invalid_argument());
        assert_eq!(h.diagnostics.at(Verbosity::Error), vec![NO_TARGET_MESSAGE]);
        assert!(h.runs().is_empty());
    }

    #[test]
    fn test_run_uses_default_target() {
        let h = harness(&["-r"]);
        let dispatcher = h.scope.command_dispatcher().unwrap();
        dispatcher.set_default_target("Build-All");

        dispatcher.run().unwrap();
        assert_eq!(h.runs(), vec!["Build-All"]);
    }

    #[test]
    fn test_run_reports_failed_tasks() {
        let diagnostics = Arc::new(CollectingDiagnostics::default());
        let settings = HelperSettings::new()
            .with_declare_task(|name| TaskHandle::new(name))
            .with_run_target(|name| {
                let mut report = ExecutionReport::new(name);
                report.results.push(TaskResult {
                    task: "Build-Sln".to_string(),
                    status: TaskStatus::Failed("exit 1".to_string()),
                    duration: std::time::Duration::ZERO,
                });
                Ok(report)
            });
        let context = BuildContext::new(Arc::new(ArgumentMap::parse(["-r=Build-All"])), diagnostics);
        let scope = HelperScope::new(context, settings);

        let err = scope.run_command().unwrap_err();
        assert!(matches!(err, HelperError::Execution { .. }));
        assert!(err.to_string().contains("Build-Sln failed"));
    }

    #[test]
    fn test_help_with_action_shows_action_help() {
        let h = harness(&["-h", "-r=Build-All"]);
        let outcome = h.scope.run_command().unwrap();

        assert_eq!(outcome, DispatchOutcome::ArgumentHelpShown("run".to_string()));
        assert!(h.diagnostics.output().contains("Description: Runs a build target"));
        assert!(h.runs().is_empty());
    }

    #[test]
    fn test_help_alone_shows_general_help() {
        let h = harness(&["--support"]);
        assert_eq!(h.scope.run_command().unwrap(), DispatchOutcome::HelpShown);
        assert!(h.diagnostics.output().contains("Available Actions:"));
    }

    #[test]
    fn test_first_registered_match_wins() {
        let h = harness(&["--deploy", "-at"]);
        let dispatcher = h.scope.command_dispatcher().unwrap();
        let deployed = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&deployed);
        dispatcher
            .add_argument("deploy", "d", "Deploys")
            .unwrap()
            .set_action(move |_, _| {
                *flag.lock().unwrap() = true;
                Ok(())
            });

        let outcome = dispatcher.run().unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome::ActionExecuted("available-targets".to_string())
        );
        assert!(!*deployed.lock().unwrap());
    }

    #[test]
    fn test_user_action_receives_argument() {
        let h = harness(&["--deploy=prod"]);
        let dispatcher = h.scope.command_dispatcher().unwrap();
        let seen = Arc::new(Mutex::new(None));
        let recorder = Arc::clone(&seen);
        dispatcher
            .add_argument("deploy", "d", "Deploys")
            .unwrap()
            .set_action(move |argument, context| {
                *recorder.lock().unwrap() = argument.value(context);
                Ok(())
            });

        dispatcher.run().unwrap();
        assert_eq!(seen.lock().unwrap().as_deref(), Some("prod"));
    }

    #[test]
    fn test_action_error_propagates() {
        let h = harness(&["-d"]);
        let dispatcher = h.scope.command_dispatcher().unwrap();
        dispatcher
            .add_argument("deploy", "d", "Deploys")
            .unwrap()
            .set_action(|_, _| Err(HelperError::other("deploy failed")));

        assert_eq!(dispatcher.run().unwrap_err().to_string(), "deploy failed");
    }

    #[test]
    fn test_add_argument_blank_soft_fails() {
        let h = harness(&[]);
        let dispatcher = h.scope.command_dispatcher().unwrap();

        assert!(dispatcher.add_argument("", "x", "desc").is_none());
        assert!(dispatcher.add_argument("name", " ", "desc").is_none());
        assert!(dispatcher.add_argument("name", "x", "").is_none());
        assert_eq!(dispatcher.arguments().len(), 3);
        assert_eq!(h.diagnostics.at(Verbosity::Debug).len(), 3);
    }

    #[test]
    fn test_add_argument_updates_by_name_or_short_name() {
        let h = harness(&[]);
        let dispatcher = h.scope.command_dispatcher().unwrap();

        let first = dispatcher.add_argument("deploy", "d", "Deploys").unwrap();
        let by_short = dispatcher.add_argument("ship", "d", "Ships").unwrap();
        assert!(Arc::ptr_eq(&first, &by_short));
        assert_eq!(first.name(), "ship");
        assert_eq!(first.description(), "Ships");

        let by_name = dispatcher.add_argument("ship", "s", "Ships it").unwrap();
        assert!(Arc::ptr_eq(&first, &by_name));
        assert_eq!(first.short_name(), "s");
        assert_eq!(dispatcher.arguments().len(), 4);
    }

    #[test]
    fn test_target_argument_runs_target() {
        let h = harness(&["--ci"]);
        let dispatcher = h.scope.command_dispatcher().unwrap();
        dispatcher
            .add_target_argument("ci", "c", "Runs CI", "Test-All")
            .unwrap();

        dispatcher.run().unwrap();
        assert_eq!(h.runs(), vec!["Test-All"]);
    }

    #[test]
    fn test_available_targets_lists_tasks() {
        let h = harness(&["-at"]);
        let tasks = h.scope.task_helper().unwrap();
        tasks.build_task("Sln", true, "").unwrap();

        h.scope.run_command().unwrap();
        let output = h.diagnostics.output();
        assert!(output.contains("2 Target Categories Available:"));
        assert!(output.contains("  Category: Build"));
        assert!(output.contains("    - Build-All\n      - Build-Sln"));
    }

    #[test]
    fn test_dispatcher_shares_task_helper_with_scope() {
        let h = harness(&[]);
        let dispatcher = h.scope.command_dispatcher().unwrap();
        let tasks = h.scope.task_helper().unwrap();
        assert!(Arc::ptr_eq(dispatcher.task_helper(), &tasks));
    }

    #[test]
    fn test_dispatcher_rebinds_context() {
        let h = harness(&[]);
        let dispatcher = h.scope.command_dispatcher().unwrap();
        h.scope.set_context(BuildContext::new(
            Arc::new(ArgumentMap::parse(["--run=Doc-All"])),
            h.diagnostics.clone(),
        ));
        let again = h.scope.command_dispatcher().unwrap();

        assert!(Arc::ptr_eq(&dispatcher, &again));
        again.run().unwrap();
        assert_eq!(h.runs(), vec!["Doc-All"]);
    }
}
