//! Naming and dependency conventions
//!
//! Each task kind owns a family of tasks named `{label}-{target}`:
//!
//! - an aggregate `{label}-All` target,
//! - one task per target (`Build-Sln`),
//! - one task per private sub-task (`Build-Sln-Docs`).
//!
//! Adding a task wires it under its parent (the aggregate for targets, the parent
//! target otherwise) and to the same-target task of the kind it builds on, so
//! `Build-Sln` needs `PreBuild-Sln` which needs `Clean-Build-Sln`.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use tasklane_core::{require_non_blank, HelperError, Result};

use crate::registry::TaskRegistry;
use crate::task::{Task, DEFAULT_CATEGORY};

/// Target name of every aggregate task
pub const ALL_TARGET: &str = "All";

pub const CLEAN_CATEGORY: &str = "Clean";
pub const BUILD_CATEGORY: &str = "Build";
pub const TEST_CATEGORY: &str = "Test";
pub const DOC_CATEGORY: &str = "Doc";

/// A family of conventionally named tasks
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Clean step for a clean category (`Build`, `Doc`, `Test-Unit`, ...)
    Clean(String),
    PreBuild,
    Build,
    PostBuild,
    /// Test step for a test category (`Unit`, `Integration`, ...)
    Test(String),
    DocExtract,
    DocBuild,
    DocPostBuild,
}

/// The task every "All" task of a kind rolls up into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollUp {
    pub name: &'static str,
    pub category: &'static str,
}

impl TaskKind {
    /// Clean kind for a category; blank means `Generic`
    pub fn clean(category: &str) -> Self {
        if category.trim().is_empty() {
            Self::Clean(DEFAULT_CATEGORY.to_string())
        } else {
            Self::Clean(category.to_string())
        }
    }

    pub fn build_clean() -> Self {
        Self::Clean(BUILD_CATEGORY.to_string())
    }

    pub fn doc_clean() -> Self {
        Self::Clean(DOC_CATEGORY.to_string())
    }

    /// Clean kind for a test category
    pub fn test_clean(test_category: &str) -> Result<Self> {
        require_non_blank("test_category", test_category)?;
        Ok(Self::Clean(format!("{}-{}", TEST_CATEGORY, test_category)))
    }

    /// Test kind for a test category
    pub fn test(test_category: &str) -> Result<Self> {
        require_non_blank("test_category", test_category)?;
        Ok(Self::Test(test_category.to_string()))
    }

    /// Coarse category of every task of this kind
    pub fn category(&self) -> &'static str {
        match self {
            Self::Clean(_) => CLEAN_CATEGORY,
            Self::PreBuild | Self::Build | Self::PostBuild => BUILD_CATEGORY,
            Self::Test(_) => TEST_CATEGORY,
            Self::DocExtract | Self::DocBuild | Self::DocPostBuild => DOC_CATEGORY,
        }
    }

    /// Task type label; also the prefix of every task name of this kind
    pub fn task_type(&self) -> String {
        match self {
            Self::Clean(category) => format!("{}-{}", CLEAN_CATEGORY, category),
            Self::PreBuild => "PreBuild".to_string(),
            Self::Build => "Build".to_string(),
            Self::PostBuild => "PostBuild".to_string(),
            Self::Test(category) => format!("{}-{}", TEST_CATEGORY, category),
            Self::DocExtract => "DocExtract".to_string(),
            Self::DocBuild => "DocBuild".to_string(),
            Self::DocPostBuild => "DocPostBuild".to_string(),
        }
    }

    /// Name of this kind's task for a target
    pub fn task_name(&self, target_name: &str) -> String {
        format!("{}-{}", self.task_type(), target_name)
    }

    /// The kind whose same-target task a target of this kind depends on
    pub fn prerequisite(&self, build_all_dependencies: bool) -> Option<TaskKind> {
        match self {
            Self::PreBuild => Some(Self::build_clean()),
            Self::Build => Some(Self::PreBuild),
            Self::PostBuild if build_all_dependencies => Some(Self::Build),
            Self::DocExtract => Some(Self::doc_clean()),
            Self::DocBuild => Some(Self::DocExtract),
            Self::DocPostBuild if build_all_dependencies => Some(Self::DocBuild),
            _ => None,
        }
    }

    /// Category-level task this kind's "All" task belongs to
    pub fn roll_up(&self) -> Option<RollUp> {
        match self {
            Self::Clean(_) => Some(RollUp {
                name: "Clean-All",
                category: CLEAN_CATEGORY,
            }),
            Self::Test(_) => Some(RollUp {
                name: "Test-All",
                category: TEST_CATEGORY,
            }),
            _ => None,
        }
    }

    /// Map a task file kind to a task kind; `generic` has none
    pub fn from_config(kind: &str, category: Option<&str>) -> Result<Option<Self>> {
        let category = category.unwrap_or_default();
        let kind = match kind {
            "generic" => return Ok(None),
            "clean" => Self::clean(category),
            "build-clean" => Self::build_clean(),
            "pre-build" => Self::PreBuild,
            "build" => Self::Build,
            "post-build" => Self::PostBuild,
            "test-clean" => Self::test_clean(category)?,
            "test" => Self::test(category)?,
            "doc-clean" => Self::doc_clean(),
            "doc-extract" => Self::DocExtract,
            "doc-build" => Self::DocBuild,
            "doc-post-build" => Self::DocPostBuild,
            other => {
                return Err(HelperError::invalid_argument(
                    "kind",
                    format!("unknown task kind '{}'", other),
                ))
            }
        };
        Ok(Some(kind))
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.task_type())
    }
}

/// The naming and wiring rules applied to a registry
#[derive(Debug, Clone, Copy)]
pub struct Conventions<'a> {
    registry: &'a TaskRegistry,
    build_all_dependencies: bool,
}

impl<'a> Conventions<'a> {
    pub fn new(registry: &'a TaskRegistry, build_all_dependencies: bool) -> Self {
        Self {
            registry,
            build_all_dependencies,
        }
    }

    /// Get or create the task of `kind` for a target; a blank target means "All".
    ///
    /// Targets are wired to their prerequisite kind's task for the same target, and
    /// "All" tasks are rolled up into their category-level task.
    pub fn category_task(&self, kind: &TaskKind, target_name: &str, is_target: bool) -> Result<Arc<Task>> {
        let target_name = if target_name.trim().is_empty() {
            ALL_TARGET
        } else {
            target_name
        };

        let task_type = kind.task_type();
        let task = self.registry.get(
            &kind.task_name(target_name),
            is_target,
            kind.category(),
            &task_type,
        )?;

        if is_target {
            if let Some(prerequisite) = kind.prerequisite(self.build_all_dependencies) {
                let before = self.category_task(&prerequisite, target_name, true)?;
                self.registry.add_dependency(&task, before.name())?;
            }
        }

        if target_name == ALL_TARGET {
            if let Some(roll_up) = kind.roll_up() {
                let aggregate = self
                    .registry
                    .get(roll_up.name, true, roll_up.category, roll_up.category)?;
                self.registry.add_dependency(&aggregate, task.name())?;
            }
        }

        Ok(task)
    }

    /// Add a task to a kind's family and wire it under its parent.
    ///
    /// A target hangs under the kind's "All" task. A private task is named
    /// `{parent}-{target}` and hangs under the parent target, which is itself
    /// added as a target first.
    pub fn add_to_category_task(
        &self,
        kind: &TaskKind,
        target_name: &str,
        is_target: bool,
        parent_task_name: &str,
    ) -> Result<Arc<Task>> {
        require_non_blank("target_name", target_name)?;
        if !is_target {
            require_non_blank("parent_task_name", parent_task_name)?;
        }

        let (new_task_name, parent_task) = if is_target {
            (
                target_name.to_string(),
                self.category_task(kind, ALL_TARGET, true)?,
            )
        } else {
            (
                format!("{}-{}", parent_task_name, target_name),
                self.add_to_category_task(kind, parent_task_name, true, "")?,
            )
        };

        let new_task = self.category_task(kind, &new_task_name, is_target)?;
        self.registry.add_dependency(&parent_task, new_task.name())?;
        debug!(
            kind = %kind,
            task = new_task.name(),
            parent = parent_task.name(),
            "task added to category"
        );
        Ok(new_task)
    }
}
