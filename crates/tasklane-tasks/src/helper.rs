//! Task helper: the scripting surface over the registry and conventions

use std::sync::Arc;

use tracing::{debug, info};

use tasklane_core::config::TaskConfig;
use tasklane_core::{ExecutionReport, HelperScope, HelperSettings, Result, ScopedHelper};

use crate::bridge::ExecutionBridge;
use crate::conventions::{Conventions, TaskKind};
use crate::registry::TaskRegistry;
use crate::task::Task;

/// Creates and wires conventionally named tasks
#[derive(Debug)]
pub struct TaskHelper {
    settings: Arc<HelperSettings>,
    registry: TaskRegistry,
}

impl ScopedHelper for TaskHelper {}

impl TaskHelper {
    pub fn new(settings: Arc<HelperSettings>) -> Self {
        let registry = TaskRegistry::new(ExecutionBridge::new(Arc::clone(&settings)));
        Self { settings, registry }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &Arc<HelperSettings> {
        &self.settings
    }

    /// Conventions using the current dependency settings
    pub fn conventions(&self) -> Conventions<'_> {
        Conventions::new(&self.registry, self.build_all_dependencies())
    }

    pub fn build_all_dependencies(&self) -> bool {
        self.settings.build_all_dependencies()
    }

    pub fn set_build_all_dependencies(&self, value: bool) {
        self.settings.set_build_all_dependencies(value);
    }

    /// Every registered task in registration order
    pub fn tasks(&self) -> Vec<Arc<Task>> {
        self.registry.all_tasks()
    }

    /// Get or create a task without touching its classification
    pub fn add_task(&self, name: &str) -> Result<Arc<Task>> {
        self.registry.ensure(name)
    }

    pub fn remove_task(&self, name: &str) -> Option<Arc<Task>> {
        self.registry.remove(name)
    }

    /// Get or create a task and set its classification
    pub fn helper_task(&self, name: &str, is_target: bool, category: &str, task_type: &str) -> Result<Arc<Task>> {
        self.registry.get(name, is_target, category, task_type)
    }

    /// Make `task` depend on the task called `dependency`
    pub fn add_task_dependency(&self, task: &Task, dependency: &str) -> Result<()> {
        self.registry.add_dependency(task, dependency)?;
        Ok(())
    }

    pub fn run_target(&self, name: &str) -> Result<ExecutionReport> {
        info!(target_name = name, "running target");
        self.registry.bridge().run_target(name)
    }

    pub fn run_task(&self, task: &Task) -> Result<ExecutionReport> {
        self.run_target(task.name())
    }

    /// Add a task of any kind
    pub fn kind_task(&self, kind: &TaskKind, target_name: &str, is_target: bool, parent_task_name: &str) -> Result<Arc<Task>> {
        self.conventions()
            .add_to_category_task(kind, target_name, is_target, parent_task_name)
    }

    pub fn clean_task(
        &self,
        target_name: &str,
        clean_category: &str,
        is_target: bool,
        parent_task_name: &str,
    ) -> Result<Arc<Task>> {
        self.kind_task(&TaskKind::clean(clean_category), target_name, is_target, parent_task_name)
    }

    pub fn build_clean_task(&self, target_name: &str, is_target: bool, parent_task_name: &str) -> Result<Arc<Task>> {
        self.kind_task(&TaskKind::build_clean(), target_name, is_target, parent_task_name)
    }

    pub fn pre_build_task(&self, target_name: &str, is_target: bool, parent_task_name: &str) -> Result<Arc<Task>> {
        self.kind_task(&TaskKind::PreBuild, target_name, is_target, parent_task_name)
    }

    pub fn build_task(&self, target_name: &str, is_target: bool, parent_task_name: &str) -> Result<Arc<Task>> {
        self.kind_task(&TaskKind::Build, target_name, is_target, parent_task_name)
    }

    /// Post-build step; depends on the build chain only when `build_all_dependencies` is on
    pub fn post_build_task(&self, target_name: &str, is_target: bool, parent_task_name: &str) -> Result<Arc<Task>> {
        self.kind_task(&TaskKind::PostBuild, target_name, is_target, parent_task_name)
    }

    pub fn test_clean_task(
        &self,
        target_name: &str,
        test_category: &str,
        is_target: bool,
        parent_task_name: &str,
    ) -> Result<Arc<Task>> {
        self.kind_task(&TaskKind::test_clean(test_category)?, target_name, is_target, parent_task_name)
    }

    pub fn test_task(
        &self,
        target_name: &str,
        test_category: &str,
        is_target: bool,
        parent_task_name: &str,
    ) -> Result<Arc<Task>> {
        self.kind_task(&TaskKind::test(test_category)?, target_name, is_target, parent_task_name)
    }

    pub fn doc_clean_task(&self, target_name: &str, is_target: bool, parent_task_name: &str) -> Result<Arc<Task>> {
        self.kind_task(&TaskKind::doc_clean(), target_name, is_target, parent_task_name)
    }

    pub fn doc_extract_task(&self, target_name: &str, is_target: bool, parent_task_name: &str) -> Result<Arc<Task>> {
        self.kind_task(&TaskKind::DocExtract, target_name, is_target, parent_task_name)
    }

    pub fn doc_build_task(&self, target_name: &str, is_target: bool, parent_task_name: &str) -> Result<Arc<Task>> {
        self.kind_task(&TaskKind::DocBuild, target_name, is_target, parent_task_name)
    }

    pub fn doc_post_build_task(&self, target_name: &str, is_target: bool, parent_task_name: &str) -> Result<Arc<Task>> {
        self.kind_task(&TaskKind::DocPostBuild, target_name, is_target, parent_task_name)
    }

    /// Register a task file entry and its extra dependencies
    pub fn register(&self, config: &TaskConfig) -> Result<Arc<Task>> {
        let parent = config.parent.as_deref().unwrap_or_default();
        let task = match TaskKind::from_config(&config.kind, config.category.as_deref())? {
            Some(kind) => self.kind_task(&kind, &config.name, config.target, parent)?,
            None => self.helper_task(
                &config.name,
                config.target,
                config.category.as_deref().unwrap_or_default(),
                config.task_type.as_deref().unwrap_or_default(),
            )?,
        };

        for dependency in &config.depends_on {
            self.add_task_dependency(&task, dependency)?;
        }
        debug!(kind = %config.kind, task = task.name(), "task file entry registered");
        Ok(task)
    }
}

/// Access to the scope's [`TaskHelper`]
pub trait TaskHelperScope {
    fn task_helper(&self) -> Result<Arc<TaskHelper>>;
}

impl TaskHelperScope for HelperScope {
    fn task_helper(&self) -> Result<Arc<TaskHelper>> {
        self.get_instance(|scope, _| Ok(TaskHelper::new(scope.settings())))
    }
}
