//! Build context: the host's argument source and diagnostics sink

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::diagnostics::{Diagnostics, TracingDiagnostics};

/// Read access to the arguments a build script was invoked with
pub trait ArgumentSource: Send + Sync {
    /// Whether `name` was given on the command line
    fn has_argument(&self, name: &str) -> bool;

    /// The value given for `name`, if any
    fn argument(&self, name: &str) -> Option<String>;
}

/// In-memory argument source keyed by argument name
///
/// Parses Cake-style tokens: `--name=value`, `-name=value`, `--name value`,
/// `-name` and `--name`. A bare token that follows a flag becomes its value.
#[derive(Debug, Clone, Default)]
pub struct ArgumentMap {
    values: HashMap<String, String>,
}

impl ArgumentMap {
    /// Create an empty argument map
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse raw command-line tokens
    ///
    /// A token is a flag when a letter follows its leading dashes; anything else is
    /// the value of the preceding flag.
    pub fn parse<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = HashMap::new();
        let mut pending: Option<String> = None;

        for token in tokens {
            let token = token.as_ref();
            let stripped = token.trim_start_matches('-');
            // `-1` and `--5` are values, not flags
            let is_flag = token.starts_with('-') && stripped.starts_with(|c: char| c.is_alphabetic());

            if !is_flag {
                if let Some(name) = pending.take() {
                    values.insert(name, token.to_string());
                }
                continue;
            }

            pending = None;
            match stripped.split_once('=') {
                Some((name, value)) => {
                    values.insert(name.to_string(), value.to_string());
                }
                None => {
                    values.insert(stripped.to_string(), String::new());
                    pending = Some(stripped.to_string());
                }
            }
        }

        Self { values }
    }

    /// Set an argument value
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Number of distinct arguments
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no argument was given
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ArgumentSource for ArgumentMap {
    fn has_argument(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    fn argument(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Execution context supplied by the host
#[derive(Clone)]
pub struct BuildContext {
    arguments: Arc<dyn ArgumentSource>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl BuildContext {
    /// Create a context from an argument source and a diagnostics sink
    pub fn new(arguments: Arc<dyn ArgumentSource>, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            arguments,
            diagnostics,
        }
    }

    /// Context with the given arguments that logs through tracing
    pub fn with_arguments(arguments: impl ArgumentSource + 'static) -> Self {
        Self::new(Arc::new(arguments), Arc::new(TracingDiagnostics))
    }

    pub fn has_argument(&self, name: &str) -> bool {
        self.arguments.has_argument(name)
    }

    pub fn argument(&self, name: &str) -> Option<String> {
        self.arguments.argument(name)
    }

    /// The diagnostics sink
    pub fn diagnostics(&self) -> &dyn Diagnostics {
        self.diagnostics.as_ref()
    }
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext").finish_non_exhaustive()
    }
}
