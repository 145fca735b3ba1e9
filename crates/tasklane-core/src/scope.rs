//! Helper scope
//!
//! A scope owns the build context and lazily creates one instance of every helper
//! type that is asked for. It is created once per build-script run and torn down
//! explicitly with [`HelperScope::clear`]. Helper crates add typed accessors through
//! extension traits (for example `task_helper()` and `command_dispatcher()`).

use std::any::{Any, TypeId};
use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use tracing::debug;

use crate::context::BuildContext;
use crate::error::{HelperError, Result};
use crate::settings::HelperSettings;

/// A helper that can live in a [`HelperScope`]
pub trait ScopedHelper: Any + Send + Sync {
    /// Called on every retrieval with the scope's current context
    fn bind_context(&self, _context: &BuildContext) {}
}

/// Lazily populated cache holding one instance per helper type
pub struct HelperScope {
    context: RwLock<Option<BuildContext>>,
    settings: Arc<HelperSettings>,
    instances: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl HelperScope {
    /// Create a scope bound to a context
    pub fn new(context: BuildContext, settings: HelperSettings) -> Self {
        Self {
            context: RwLock::new(Some(context)),
            settings: Arc::new(settings),
            instances: DashMap::new(),
        }
    }

    /// Create a scope whose context is supplied later with [`HelperScope::set_context`]
    pub fn unbound(settings: HelperSettings) -> Self {
        Self {
            context: RwLock::new(None),
            settings: Arc::new(settings),
            instances: DashMap::new(),
        }
    }

    /// The current context
    pub fn context(&self) -> Result<BuildContext> {
        self.context
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
            .ok_or_else(|| {
                HelperError::invalid_argument(
                    "context",
                    "build context needs to be set before using any helper",
                )
            })
    }

    /// Replace the context; cached helpers pick it up on their next retrieval
    pub fn set_context(&self, context: BuildContext) {
        *self
            .context
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(context);
    }

    /// Settings shared by all helpers in this scope
    pub fn settings(&self) -> Arc<HelperSettings> {
        Arc::clone(&self.settings)
    }

    /// Get the scope's instance of `T`, creating it with `create` on first use.
    ///
    /// When two callers race on first access both may run `create`, but only one
    /// instance is kept and both receive it.
    pub fn get_instance<T, F>(&self, create: F) -> Result<Arc<T>>
    where
        T: ScopedHelper,
        F: FnOnce(&HelperScope, &BuildContext) -> Result<T>,
    {
        let context = self.context()?;
        let type_id = TypeId::of::<T>();

        let cached = self.instances.get(&type_id).map(|entry| Arc::clone(entry.value()));
        let entry = match cached {
            Some(entry) => entry,
            None => {
                let created: Arc<dyn Any + Send + Sync> = Arc::new(create(self, &context)?);
                let winner = Arc::clone(self.instances.entry(type_id).or_insert(created).value());
                debug!(helper = std::any::type_name::<T>(), "helper created");
                winner
            }
        };

        let instance = entry.downcast::<T>().map_err(|_| {
            HelperError::other(format!(
                "scope entry for {} has an unexpected type",
                std::any::type_name::<T>()
            ))
        })?;
        instance.bind_context(&context);
        Ok(instance)
    }

    /// Whether an instance of `T` has been created
    pub fn contains<T: ScopedHelper>(&self) -> bool {
        self.instances.contains_key(&TypeId::of::<T>())
    }

    /// Number of cached helper instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether no helper has been created yet
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Drop every cached helper and the context
    pub fn clear(&self) {
        self.instances.clear();
        *self
            .context
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        debug!("helper scope cleared");
    }
}

impl std::fmt::Debug for HelperScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelperScope")
            .field("instances", &self.instances.len())
            .field("settings", &self.settings)
            .finish()
    }
}
