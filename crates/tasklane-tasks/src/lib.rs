//! tasklane tasks - task registry and conventions
//!
//! This crate provides the task registry, the naming and dependency conventions for
//! clean, build, test and doc tasks, the bridge to the build host, target listings,
//! execution planning and a local host that runs shell commands.

pub mod bridge;
pub mod conventions;
pub mod helper;
pub mod plan;
pub mod registry;
pub mod reporter;
pub mod runner;
pub mod task;
pub mod tree;

pub use bridge::ExecutionBridge;
pub use conventions::{Conventions, RollUp, TaskKind, ALL_TARGET};
pub use helper::{TaskHelper, TaskHelperScope};
pub use plan::{ExecutionPlan, PlanError, PlanNode};
pub use registry::TaskRegistry;
pub use reporter::{CollectingReporter, Reporters, RunSummary, TaskEvent, TaskReporter, TracingReporter};
pub use runner::{LocalHost, RunnerOptions};
pub use task::{Task, TaskClass, DEFAULT_CATEGORY, DEFAULT_TASK_TYPE};
pub use tree::{dependency_tree, target_listing};
