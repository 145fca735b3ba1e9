//! Diagnostics sinks for help output and validation messages

use std::sync::Mutex;

/// Severity of a diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verbosity {
    Debug,
    Information,
    Error,
}

/// Sink for user-facing diagnostic text
pub trait Diagnostics: Send + Sync {
    /// Emit a message
    fn emit(&self, verbosity: Verbosity, message: &str);

    fn debug(&self, message: &str) {
        self.emit(Verbosity::Debug, message);
    }

    fn information(&self, message: &str) {
        self.emit(Verbosity::Information, message);
    }

    fn error(&self, message: &str) {
        self.emit(Verbosity::Error, message);
    }
}

/// Diagnostics that forward to tracing
#[derive(Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn emit(&self, verbosity: Verbosity, message: &str) {
        match verbosity {
            Verbosity::Debug => tracing::debug!("{}", message),
            Verbosity::Information => tracing::info!("{}", message),
            Verbosity::Error => tracing::error!("{}", message),
        }
    }
}

/// Diagnostics that collect messages for later inspection (useful for testing)
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    messages: Mutex<Vec<(Verbosity, String)>>,
}

impl CollectingDiagnostics {
    /// Get all collected messages
    pub fn messages(&self) -> Vec<(Verbosity, String)> {
        self.lock().clone()
    }

    /// Messages of one severity, in emission order
    pub fn at(&self, verbosity: Verbosity) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(v, _)| *v == verbosity)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// All information-level text joined with newlines
    pub fn output(&self) -> String {
        self.at(Verbosity::Information).join("\n")
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Verbosity, String)>> {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn emit(&self, verbosity: Verbosity, message: &str) {
        self.lock().push((verbosity, message.to_string()));
    }
}
