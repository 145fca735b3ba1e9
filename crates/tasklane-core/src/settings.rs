//! Helper settings: the host functions and dependency knobs

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::config::ScriptConfig;
use crate::error::Result;
use crate::types::{ExecutionReport, TaskHandle};

/// Host function that declares a task with the given name
pub type DeclareTaskFn = Arc<dyn Fn(&str) -> TaskHandle + Send + Sync>;

/// Host function that runs a target (and its dependencies) by name
pub type RunTargetFn = Arc<dyn Fn(&str) -> Result<ExecutionReport> + Send + Sync>;

/// Settings shared by every helper in a scope
#[derive(Default)]
pub struct HelperSettings {
    build_all_dependencies: AtomicBool,
    declare_task: RwLock<Option<DeclareTaskFn>>,
    run_target: RwLock<Option<RunTargetFn>>,
}

impl HelperSettings {
    /// Settings with no host functions configured
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings seeded from the `[script]` section of a task file
    pub fn from_config(config: &ScriptConfig) -> Self {
        let settings = Self::new();
        settings.set_build_all_dependencies(config.build_all_dependencies);
        settings
    }

    /// Set the declare-task function
    pub fn with_declare_task<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> TaskHandle + Send + Sync + 'static,
    {
        self.set_declare_task(Arc::new(f));
        self
    }

    /// Set the run-target function
    pub fn with_run_target<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> Result<ExecutionReport> + Send + Sync + 'static,
    {
        self.set_run_target(Arc::new(f));
        self
    }

    pub fn set_declare_task(&self, f: DeclareTaskFn) {
        *self
            .declare_task
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(f);
    }

    pub fn set_run_target(&self, f: RunTargetFn) {
        *self
            .run_target
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(f);
    }

    /// The declare-task function, if configured
    pub fn declare_task(&self) -> Option<DeclareTaskFn> {
        self.declare_task
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// The run-target function, if configured
    pub fn run_target(&self) -> Option<RunTargetFn> {
        self.run_target
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Whether post-build steps pull in the whole build chain
    pub fn build_all_dependencies(&self) -> bool {
        self.build_all_dependencies.load(Ordering::SeqCst)
    }

    pub fn set_build_all_dependencies(&self, value: bool) {
        self.build_all_dependencies.store(value, Ordering::SeqCst);
    }
}

impl fmt::Debug for HelperSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperSettings")
            .field("build_all_dependencies", &self.build_all_dependencies())
            .field("declare_task", &self.declare_task().is_some())
            .field("run_target", &self.run_target().is_some())
            .finish()
    }
}
