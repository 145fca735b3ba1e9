//! Task file loading

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, HelperError, Result};

use super::defaults::config_file_names;
use super::types::Config;
use super::validation::validate_config;

/// Load a task file
pub fn load_config(path: &Path) -> Result<Config> {
    let format = if path
        .extension()
        .is_some_and(|e| e == "yaml" || e == "yml")
    {
        "YAML"
    } else {
        "TOML"
    };
    info!(path = %path.display(), format, "loading task file");

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

    let config: Config = if format == "TOML" {
        toml::from_str(&content).map_err(ConfigError::TomlError)?
    } else {
        serde_yaml::from_str(&content).map_err(ConfigError::YamlError)?
    };

    validate_config(&config)?;
    debug!(path = %path.display(), tasks = config.tasks.len(), "task file loaded and validated");
    Ok(config)
}

/// Find a task file in a directory or its parents. The first match wins.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for task file");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in config_file_names() {
            let config_path = current.join(name);
            if config_path.exists() {
                info!(path = %config_path.display(), "found task file");
                return Some(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!("no task file found");
    None
}

/// Load a task file from a directory (searching parent directories)
pub fn load_config_from_dir(dir: &Path) -> Result<(Config, PathBuf)> {
    let config_path = find_config(dir).ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))?;

    let config = load_config(&config_path)?;
    Ok((config, config_path))
}

/// Load the nearest task file, or the defaults when there is none.
///
/// A task file that exists but cannot be read or validated is an error.
pub fn load_config_or_default(dir: &Path) -> Result<(Config, Option<PathBuf>)> {
    match load_config_from_dir(dir) {
        Ok((config, path)) => Ok((config, Some(path))),
        Err(HelperError::Config(ConfigError::NotFound(_))) => {
            info!(dir = %dir.display(), "no task file found, using defaults");
            Ok((Config::default(), None))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("tasklane.toml");
        std::fs::write(&config_path, "[script]\ndescription = \"CI\"").unwrap();

        let found = find_config(temp.path());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_prefers_toml_over_yaml() {
        let temp = TempDir::new().unwrap();
        let toml_path = temp.path().join("tasklane.toml");
        let yaml_path = temp.path().join("tasklane.yaml");
        std::fs::write(&toml_path, "[script]\n").unwrap();
        std::fs::write(&yaml_path, "script: {}\n").unwrap();

        assert_eq!(find_config(temp.path()).unwrap(), toml_path);
    }

    #[test]
    fn test_find_config_in_parent() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(".tasklane.yaml");
        std::fs::write(&config_path, "script: {}\n").unwrap();
        let nested = temp.path().join("src").join("app");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config(&nested).unwrap(), config_path);
    }

    #[test]
    fn test_load_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasklane.toml");
        std::fs::write(
            &path,
            r#"
[script]
description = "Release Script"
default_target = "Build-All"
build_all_dependencies = true

[[tasks]]
kind = "build"
name = "Sln"
command = "cargo build"

[[tasks]]
kind = "build"
name = "Docs"
target = false
parent = "Sln"

[[arguments]]
name = "ci"
short = "c"
description = "Runs CI"
target = "Build-All"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.script.description, "Release Script");
        assert_eq!(config.script.default_target.as_deref(), Some("Build-All"));
        assert!(config.script.build_all_dependencies);
        assert_eq!(config.tasks.len(), 2);
        assert!(config.tasks[0].target);
        assert!(!config.tasks[1].target);
        assert_eq!(config.tasks[1].parent.as_deref(), Some("Sln"));
        assert_eq!(config.arguments[0].short, "c");
    }

    #[test]
    fn test_load_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasklane.yaml");
        std::fs::write(
            &path,
            "tasks:\n  - kind: test\n    name: Sln\n    category: Unit\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.script.description, "Build Script");
        assert_eq!(config.tasks[0].category.as_deref(), Some("Unit"));
    }

    #[test]
    fn test_load_invalid_kind_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasklane.toml");
        std::fs::write(&path, "[[tasks]]\nkind = \"deploy\"\nname = \"x\"\n").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_load_or_default_without_file() {
        let temp = TempDir::new().unwrap();
        let (config, path) = load_config_or_default(temp.path()).unwrap();
        assert!(path.is_none());
        assert!(config.tasks.is_empty());
        assert_eq!(config.script.description, "Build Script");
    }

    #[test]
    fn test_load_or_default_reports_invalid_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasklane.toml");
        std::fs::write(&path, "[[tasks]]\nkind = \"deploy\"\nname = \"x\"\n").unwrap();

        let err = load_config_or_default(temp.path()).unwrap_err();
        assert!(matches!(err, HelperError::Config(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_load_from_dir_finds_parent_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("tasklane.toml"), "[script]\ndescription = \"CI\"\n").unwrap();
        let nested = temp.path().join("crates");
        std::fs::create_dir_all(&nested).unwrap();

        let (config, path) = load_config_from_dir(&nested).unwrap();
        assert_eq!(config.script.description, "CI");
        assert_eq!(path, temp.path().join("tasklane.toml"));
    }
}
