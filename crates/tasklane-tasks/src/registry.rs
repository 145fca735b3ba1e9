//! Task registry
//!
//! Holds every task by unique name. Creation goes through the execution bridge so the
//! host learns about each task exactly once.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use tasklane_core::{require_non_blank, HelperError, Result};

use crate::bridge::ExecutionBridge;
use crate::task::{Task, TaskClass};

/// Concurrent name -> task map
pub struct TaskRegistry {
    tasks: DashMap<String, Arc<Task>>,
    bridge: ExecutionBridge,
    next_sequence: AtomicU64,
}

impl TaskRegistry {
    pub fn new(bridge: ExecutionBridge) -> Self {
        Self {
            tasks: DashMap::new(),
            bridge,
            next_sequence: AtomicU64::new(0),
        }
    }

    /// The bridge tasks are declared through
    pub fn bridge(&self) -> &ExecutionBridge {
        &self.bridge
    }

    /// Return the task called `name`, declaring and storing it first if needed.
    ///
    /// The host's declare function runs inside the map entry, so it is called at
    /// most once per name even under concurrent registration. It must not call
    /// back into this registry.
    pub fn ensure(&self, name: &str) -> Result<Arc<Task>> {
        require_non_blank("name", name)?;

        if let Some(task) = self.lookup(name) {
            return Ok(task);
        }

        let entry = self.tasks.entry(name.to_string()).or_try_insert_with(|| {
            let handle = self.bridge.declare(name)?;
            let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
            debug!(task = name, sequence, "task registered");
            Ok::<_, HelperError>(Arc::new(Task::new(name, handle, sequence)))
        })?;
        Ok(Arc::clone(entry.value()))
    }

    /// Overwrite a task's classification
    pub fn classify(&self, task: &Task, is_target: bool, category: &str, task_type: &str) {
        let class = TaskClass::new(is_target, category, task_type);
        debug!(
            task = task.name(),
            category = %class.category,
            task_type = %class.task_type,
            is_target,
            "task classified"
        );
        task.set_class(class);
    }

    /// [`ensure`](Self::ensure) followed by [`classify`](Self::classify)
    pub fn get(&self, name: &str, is_target: bool, category: &str, task_type: &str) -> Result<Arc<Task>> {
        let task = self.ensure(name)?;
        self.classify(&task, is_target, category, task_type);
        Ok(task)
    }

    /// Find a task without creating it
    pub fn lookup(&self, name: &str) -> Option<Arc<Task>> {
        self.tasks.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Remove a task; absent names are ignored
    pub fn remove(&self, name: &str) -> Option<Arc<Task>> {
        let removed = self.tasks.remove(name).map(|(_, task)| task);
        if removed.is_some() {
            debug!(task = name, "task removed");
        }
        removed
    }

    /// Snapshot of every task in registration order
    pub fn all_tasks(&self) -> Vec<Arc<Task>> {
        let mut tasks: Vec<Arc<Task>> = self
            .tasks
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        tasks.sort_by_key(|task| task.sequence());
        tasks
    }

    /// Snapshot of the target tasks in registration order
    pub fn target_tasks(&self) -> Vec<Arc<Task>> {
        self.all_tasks()
            .into_iter()
            .filter(|task| task.is_target())
            .collect()
    }

    /// Distinct categories, sorted
    pub fn categories(&self) -> Vec<String> {
        self.tasks
            .iter()
            .map(|entry| entry.value().category())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Make `task` depend on the task called `dependency`.
    ///
    /// Returns whether a new edge was added. Existing edges and self edges are no-ops.
    pub fn add_dependency(&self, task: &Task, dependency: &str) -> Result<bool> {
        require_non_blank("dependency", dependency)?;

        if task.name() == dependency {
            debug!(task = task.name(), "ignoring self dependency");
            return Ok(false);
        }

        let added = task.push_dependency(dependency);
        if added {
            debug!(task = task.name(), dependency, "dependency added");
        }
        Ok(added)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl std::fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("tasks", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tasklane_core::{HelperSettings, TaskHandle};

    fn registry() -> TaskRegistry {
        let settings = HelperSettings::new().with_declare_task(|name| TaskHandle::new(name));
        TaskRegistry::new(ExecutionBridge::new(Arc::new(settings)))
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let registry = registry();
        let first = registry.ensure("Build-All").unwrap();
        let second = registry.ensure("Build-All").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_ensure_declares_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let settings = HelperSettings::new().with_declare_task(move |name| {
            counter.fetch_add(1, Ordering::SeqCst);
            TaskHandle::new(name)
        });
        let registry = TaskRegistry::new(ExecutionBridge::new(Arc::new(settings)));

        registry.ensure("Build-Sln").unwrap();
        registry.ensure("Build-Sln").unwrap();
        registry.get("Build-Sln", true, "Build", "Build").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_ensure_declares_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let settings = HelperSettings::new().with_declare_task(move |name| {
            counter.fetch_add(1, Ordering::SeqCst);
            TaskHandle::new(name)
        });
        let registry = Arc::new(TaskRegistry::new(ExecutionBridge::new(Arc::new(settings))));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.ensure("Build-All").unwrap())
            })
            .collect();
        let tasks: Vec<Arc<Task>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(tasks.iter().all(|t| Arc::ptr_eq(t, &tasks[0])));
    }

    #[test]
    fn test_ensure_without_declare_function() {
        let registry = TaskRegistry::new(ExecutionBridge::new(Arc::new(HelperSettings::new())));
        assert!(registry.ensure("Build-All").unwrap_err().is_invalid_argument());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_ensure_rejects_blank_name() {
        assert!(registry().ensure("").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_get_overwrites_classification() {
        let registry = registry();
        let task = registry.get("Sln", false, "", "").unwrap();
        assert!(!task.is_target());
        assert_eq!(task.category(), "Generic");

        registry.get("Sln", true, "Build", "Build").unwrap();
        assert!(task.is_target());
        assert_eq!(task.category(), "Build");
        assert_eq!(task.task_type(), "Build");
    }

    #[test]
    fn test_remove() {
        let registry = registry();
        registry.ensure("Build-All").unwrap();
        assert!(registry.remove("Build-All").is_some());
        assert!(registry.remove("Build-All").is_none());
        assert!(!registry.contains("Build-All"));
    }

    #[test]
    fn test_all_tasks_in_registration_order() {
        let registry = registry();
        for name in ["Clean-All", "Build-All", "Alpha"] {
            registry.ensure(name).unwrap();
        }
        let names: Vec<String> = registry
            .all_tasks()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["Clean-All", "Build-All", "Alpha"]);
    }

    #[test]
    fn test_categories_sorted_and_distinct() {
        let registry = registry();
        registry.get("Test-All", true, "Test", "Test").unwrap();
        registry.get("Build-All", true, "Build", "Build").unwrap();
        registry.get("PreBuild-All", true, "Build", "PreBuild").unwrap();
        registry.ensure("Loose").unwrap();
        assert_eq!(registry.categories(), vec!["Build", "Generic", "Test"]);
    }

    #[test]
    fn test_target_tasks() {
        let registry = registry();
        registry.get("Build-All", true, "Build", "Build").unwrap();
        registry.get("Build-Sln-Sub", false, "Build", "Build").unwrap();
        let targets = registry.target_tasks();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name(), "Build-All");
    }

    #[test]
    fn test_add_dependency_no_duplicates() {
        let registry = registry();
        let task = registry.ensure("Build-All").unwrap();
        assert!(registry.add_dependency(&task, "Build-Sln").unwrap());
        assert!(!registry.add_dependency(&task, "Build-Sln").unwrap());
        assert_eq!(task.dependencies(), vec!["Build-Sln"]);
    }

    #[test]
    fn test_add_dependency_ignores_self() {
        let registry = registry();
        let task = registry.ensure("Build-All").unwrap();
        assert!(!registry.add_dependency(&task, "Build-All").unwrap());
        assert!(task.dependencies().is_empty());
    }
}
