//! tasklane core - shared foundation for the tasklane helpers
//!
//! This crate provides error handling, the types exchanged with a build host,
//! the build context (argument source and diagnostics), helper settings,
//! task file configuration, and the helper scope that owns helper lifetimes.

pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod scope;
pub mod settings;
pub mod types;

pub use context::{ArgumentMap, ArgumentSource, BuildContext};
pub use diagnostics::{CollectingDiagnostics, Diagnostics, TracingDiagnostics, Verbosity};
pub use error::{require_non_blank, ConfigError, HelperError, Result};
pub use scope::{HelperScope, ScopedHelper};
pub use settings::{DeclareTaskFn, HelperSettings, RunTargetFn};
pub use types::{ExecutionReport, TaskHandle, TaskResult, TaskStatus};
