//! Starter task file

use std::path::{Path, PathBuf};

use tracing::info;

use tasklane_core::config::{DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_TOML};

use super::output;

/// Write the starter task file into `dir`
pub fn write_template(dir: &Path, force: bool) -> anyhow::Result<PathBuf> {
    let config_path = dir.join(DEFAULT_CONFIG_TOML);
    info!(path = %config_path.display(), force, "writing starter task file");

    if config_path.exists() && !force {
        anyhow::bail!(
            "Task file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;
    output::success(&format!("Created {}", config_path.display()));
    Ok(config_path)
}
