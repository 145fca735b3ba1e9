//! Configuration types

use serde::{Deserialize, Serialize};

use super::defaults::{DEFAULT_SCRIPT_DESCRIPTION, DEFAULT_TASK_KIND};

/// A task file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Script-wide settings
    pub script: ScriptConfig,

    /// Tasks to register, in order
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,

    /// Extra command-line actions
    #[serde(default)]
    pub arguments: Vec<ArgumentConfig>,
}

/// Script-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Shown at the top of the general help
    pub description: String,

    /// Target run by `--run` when no value is given
    pub default_target: Option<String>,

    /// Whether post-build steps depend on the build chain of the same target
    pub build_all_dependencies: bool,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            description: DEFAULT_SCRIPT_DESCRIPTION.to_string(),
            default_target: None,
            build_all_dependencies: false,
        }
    }
}

/// A task declared in the task file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    /// Task kind (build, pre-build, clean, test, ...)
    pub kind: String,

    /// Target name, or sub-task name when `target` is false
    pub name: String,

    /// Clean category, test category, or category of a generic task
    pub category: Option<String>,

    /// Task type of a generic task
    pub task_type: Option<String>,

    /// Whether the task is a public target
    pub target: bool,

    /// Parent target of a private sub-task
    pub parent: Option<String>,

    /// Shell command the local host runs for this task
    pub command: Option<String>,

    /// Extra task names this task depends on
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            kind: DEFAULT_TASK_KIND.to_string(),
            name: String::new(),
            category: None,
            task_type: None,
            target: true,
            parent: None,
            command: None,
            depends_on: Vec::new(),
        }
    }
}

/// A user-defined command-line action that runs a target
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArgumentConfig {
    /// Long name (`--name`)
    pub name: String,

    /// Short name (`-short`)
    pub short: String,

    /// Help text
    pub description: String,

    /// Target to run when the action is selected
    pub target: Option<String>,
}
