//! Default configuration values

/// Default task file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "tasklane.toml";

/// Default task file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "tasklane.yaml";

/// Description shown when the task file sets none
pub const DEFAULT_SCRIPT_DESCRIPTION: &str = "Build Script";

/// Kind used when a task entry sets none
pub const DEFAULT_TASK_KIND: &str = "generic";

/// Task kinds a task file may use
pub const TASK_KINDS: &[&str] = &[
    "generic",
    "clean",
    "build-clean",
    "pre-build",
    "build",
    "post-build",
    "test-clean",
    "test",
    "doc-clean",
    "doc-extract",
    "doc-build",
    "doc-post-build",
];

/// Get list of task file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".tasklane.toml",
        ".tasklane.yaml",
    ]
}

/// Starter task file written by `tasklane --init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# tasklane task file

[script]
description = "Build Script"
default_target = "Build-All"
build_all_dependencies = false

[[tasks]]
kind = "build-clean"
name = "Solution"
command = "cargo clean"

[[tasks]]
kind = "build"
name = "Solution"
command = "cargo build"

[[tasks]]
kind = "test"
name = "Solution"
category = "Unit"
command = "cargo test"
"#;
