//! Task file validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::defaults::TASK_KINDS;
use super::types::{Config, TaskConfig};

/// Validate a task file
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating task file");
    validate_script(config)?;
    for (index, task) in config.tasks.iter().enumerate() {
        validate_task(index, task)?;
    }
    validate_arguments(config)?;
    debug!("task file validation passed");
    Ok(())
}

fn invalid(field: String, message: &str) -> crate::error::HelperError {
    ConfigError::InvalidValue {
        field,
        message: message.to_string(),
    }
    .into()
}

fn validate_script(config: &Config) -> Result<()> {
    if let Some(target) = &config.script.default_target {
        if target.trim().is_empty() {
            return Err(invalid(
                "script.default_target".to_string(),
                "cannot be blank when set",
            ));
        }
    }
    Ok(())
}

fn validate_task(index: usize, task: &TaskConfig) -> Result<()> {
    if !TASK_KINDS.contains(&task.kind.as_str()) {
        return Err(ConfigError::InvalidValue {
            field: format!("tasks[{}].kind", index),
            message: format!("must be one of: {}", TASK_KINDS.join(", ")),
        }
        .into());
    }

    if task.name.trim().is_empty() {
        return Err(invalid(format!("tasks[{}].name", index), "name cannot be empty"));
    }

    let has_parent = task.parent.as_deref().is_some_and(|p| !p.trim().is_empty());
    if !task.target && !has_parent && task.kind != "generic" {
        return Err(invalid(
            format!("tasks[{}].parent", index),
            "a task with target = false needs a parent",
        ));
    }

    let has_category = task.category.as_deref().is_some_and(|c| !c.trim().is_empty());
    if (task.kind == "test" || task.kind == "test-clean") && !has_category {
        return Err(invalid(
            format!("tasks[{}].category", index),
            "test tasks need a test category",
        ));
    }

    if task.depends_on.iter().any(|d| d.trim().is_empty()) {
        return Err(invalid(
            format!("tasks[{}].depends_on", index),
            "dependency names cannot be empty",
        ));
    }

    Ok(())
}

fn validate_arguments(config: &Config) -> Result<()> {
    for (index, argument) in config.arguments.iter().enumerate() {
        if argument
            .target
            .as_deref()
            .is_some_and(|t| t.trim().is_empty())
        {
            return Err(invalid(
                format!("arguments[{}].target", index),
                "cannot be blank when set",
            ));
        }
    }
    Ok(())
}
