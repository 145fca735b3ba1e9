//! Command arguments

use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::debug;

use tasklane_core::{BuildContext, Result};

/// Callback run when an argument is selected
pub type ArgumentAction = Arc<dyn Fn(&CommandArgument, &BuildContext) -> Result<()> + Send + Sync>;

#[derive(Debug, Clone, Default)]
struct Labels {
    name: String,
    short_name: String,
    description: String,
}

/// A named command-line action (`--name` / `-short`)
#[derive(Default)]
pub struct CommandArgument {
    labels: RwLock<Labels>,
    action: RwLock<Option<ArgumentAction>>,
    arguments: RwLock<Vec<Arc<CommandArgument>>>,
}

impl CommandArgument {
    pub fn new(name: impl Into<String>, short_name: impl Into<String>, description: impl Into<String>) -> Self {
        let argument = Self::default();
        argument.set_labels(name.into(), short_name.into(), description.into());
        argument
    }

    fn labels(&self) -> Labels {
        self.labels
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_labels(&self, name: String, short_name: String, description: String) {
        *self
            .labels
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Labels {
            name,
            short_name,
            description,
        };
    }

    /// Long name, used as `--name`
    pub fn name(&self) -> String {
        self.labels().name
    }

    /// Short name, used as `-short`
    pub fn short_name(&self) -> String {
        self.labels().short_name
    }

    pub fn description(&self) -> String {
        self.labels().description
    }

    /// Whether this argument answers to `name` by long or short name
    pub fn answers_to(&self, name: &str, short_name: &str) -> bool {
        let labels = self.labels();
        labels.name == name || labels.short_name == short_name
    }

    /// Set the callback run when the argument is selected
    pub fn set_action<F>(&self, action: F)
    where
        F: Fn(&CommandArgument, &BuildContext) -> Result<()> + Send + Sync + 'static,
    {
        *self
            .action
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(Arc::new(action));
    }

    pub fn has_action(&self) -> bool {
        self.action
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_some()
    }

    /// Run the action; an argument without one does nothing
    pub fn invoke(&self, context: &BuildContext) -> Result<()> {
        let action = self
            .action
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        match action {
            Some(action) => action(self, context),
            None => {
                debug!(argument = %self.name(), "no action defined for argument");
                Ok(())
            }
        }
    }

    /// Whether the long or the short form was given
    pub fn is_present(&self, context: &BuildContext) -> bool {
        let labels = self.labels();
        context.has_argument(&labels.name) || context.has_argument(&labels.short_name)
    }

    /// Value given for the argument; the long form wins over the short form
    pub fn value(&self, context: &BuildContext) -> Option<String> {
        let labels = self.labels();
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        non_blank(context.argument(&labels.name)).or_else(|| non_blank(context.argument(&labels.short_name)))
    }

    /// Sub-arguments; declared for help purposes, never dispatched
    pub fn arguments(&self) -> Vec<Arc<CommandArgument>> {
        self.arguments
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn add_argument(&self, argument: Arc<CommandArgument>) {
        self.arguments
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(argument);
    }
}

impl fmt::Debug for CommandArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = self.labels();
        f.debug_struct("CommandArgument")
            .field("name", &labels.name)
            .field("short_name", &labels.short_name)
            .field("has_action", &self.has_action())
            .finish_non_exhaustive()
    }
}
