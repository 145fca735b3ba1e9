//! Task types

use std::fmt;
use std::sync::RwLock;

use tasklane_core::TaskHandle;

/// Category given to tasks registered without one
pub const DEFAULT_CATEGORY: &str = "Generic";

/// Task type given to tasks registered without one
pub const DEFAULT_TASK_TYPE: &str = "Unknown";

/// Classification of a task; the part of a task that may change after creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskClass {
    /// Coarse grouping (Build, Clean, Test, Doc)
    pub category: String,
    /// Finer label within the category (PreBuild, Clean-Build, ...)
    pub task_type: String,
    /// Whether the task is a public, listed target
    pub is_target: bool,
}

impl TaskClass {
    /// Create a classification, substituting defaults for blank labels
    pub fn new(is_target: bool, category: &str, task_type: &str) -> Self {
        Self {
            category: or_default(category, DEFAULT_CATEGORY),
            task_type: or_default(task_type, DEFAULT_TASK_TYPE),
            is_target,
        }
    }
}

impl Default for TaskClass {
    fn default() -> Self {
        Self::new(false, "", "")
    }
}

fn or_default(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// A named unit of work known to the registry.
///
/// The name and host handle never change. Classification and dependencies are
/// shared mutable state, so every holder of the task sees later updates.
#[derive(Debug)]
pub struct Task {
    name: String,
    handle: TaskHandle,
    sequence: u64,
    class: RwLock<TaskClass>,
    dependencies: RwLock<Vec<String>>,
}

impl Task {
    pub(crate) fn new(name: impl Into<String>, handle: TaskHandle, sequence: u64) -> Self {
        Self {
            name: name.into(),
            handle,
            sequence,
            class: RwLock::new(TaskClass::default()),
            dependencies: RwLock::new(Vec::new()),
        }
    }

    /// Unique task name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle the host returned when the task was declared
    pub fn handle(&self) -> &TaskHandle {
        &self.handle
    }

    /// Registration order within the registry
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Current classification
    pub fn class(&self) -> TaskClass {
        self.class
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn category(&self) -> String {
        self.class().category
    }

    pub fn task_type(&self) -> String {
        self.class().task_type
    }

    pub fn is_target(&self) -> bool {
        self.class().is_target
    }

    pub(crate) fn set_class(&self, class: TaskClass) {
        *self
            .class
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = class;
    }

    /// Names of the tasks that must complete first, in the order they were added
    pub fn dependencies(&self) -> Vec<String> {
        self.dependencies
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Whether this task already depends on `name`
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .any(|d| d == name)
    }

    /// Add a dependency edge; returns false if it already existed
    pub(crate) fn push_dependency(&self, name: &str) -> bool {
        let mut dependencies = self
            .dependencies
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if dependencies.iter().any(|d| d == name) {
            return false;
        }
        dependencies.push(name.to_string());
        true
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(name: &str) -> Task {
        Task::new(name, TaskHandle::new(name), 0)
    }

    #[test]
    fn test_new_task_defaults() {
        let task = task("Build-All");
        assert_eq!(task.name(), "Build-All");
        assert_eq!(task.category(), DEFAULT_CATEGORY);
        assert_eq!(task.task_type(), DEFAULT_TASK_TYPE);
        assert!(!task.is_target());
        assert!(task.dependencies().is_empty());
    }

    #[test]
    fn test_blank_labels_fall_back_to_defaults() {
        let class = TaskClass::new(true, " ", "");
        assert_eq!(class.category, "Generic");
        assert_eq!(class.task_type, "Unknown");
        assert!(class.is_target);
    }

    #[test]
    fn test_set_class() {
        let task = task("PreBuild-Sln");
        task.set_class(TaskClass::new(true, "Build", "PreBuild"));
        assert_eq!(task.category(), "Build");
        assert_eq!(task.task_type(), "PreBuild");
        assert!(task.is_target());
    }

    #[test]
    fn test_push_dependency_is_idempotent() {
        let task = task("Build-All");
        assert!(task.push_dependency("Build-Sln"));
        assert!(!task.push_dependency("Build-Sln"));
        assert!(task.push_dependency("PreBuild-All"));
        assert_eq!(task.dependencies(), vec!["Build-Sln", "PreBuild-All"]);
        assert!(task.depends_on("PreBuild-All"));
    }
}
