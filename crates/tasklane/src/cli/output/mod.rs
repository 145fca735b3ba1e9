//! Output formatting utilities

mod reporter;

pub use reporter::ConsoleReporter;

use console::style;

use tasklane_core::{Diagnostics, ExecutionReport, TaskStatus, Verbosity};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", style("→").blue(), message);
}

/// Create a styled header
pub fn header(text: &str) -> String {
    style(text).bold().to_string()
}

/// Diagnostics written to the terminal
///
/// Information goes to stdout unstyled so help and target listings stay
/// copy-pasteable. Debug text only shows with `--verbose`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleDiagnostics {
    verbose: bool,
    quiet: bool,
}

impl ConsoleDiagnostics {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }
}

impl Diagnostics for ConsoleDiagnostics {
    fn emit(&self, verbosity: Verbosity, message: &str) {
        match verbosity {
            Verbosity::Debug if self.verbose => println!("{}", style(message).dim()),
            Verbosity::Debug => tracing::debug!("{}", message),
            Verbosity::Information if !self.quiet => println!("{}", message),
            Verbosity::Information => {}
            Verbosity::Error => error(message),
        }
    }
}

/// JSON summary of a finished run
pub fn report_json(report: &ExecutionReport) -> serde_json::Value {
    serde_json::json!({
        "target": report.target,
        "started_at": report.started_at,
        "succeeded": report.succeeded(),
        "duration_ms": report.duration().as_millis(),
        "tasks": report.results.iter().map(|r| {
            let (status, detail) = match &r.status {
                TaskStatus::Success => ("success", None),
                TaskStatus::Failed(reason) => ("failed", Some(reason.as_str())),
                TaskStatus::Skipped(reason) => ("skipped", Some(reason.as_str())),
            };
            serde_json::json!({
                "task": r.task,
                "status": status,
                "detail": detail,
                "duration_ms": r.duration.as_millis(),
            })
        }).collect::<Vec<_>>(),
    })
}
