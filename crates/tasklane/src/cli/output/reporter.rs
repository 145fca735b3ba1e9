//! Terminal reporter for task execution

use console::style;

use tasklane_tasks::{TaskEvent, TaskReporter};

/// Reporter that prints progress lines as tasks run
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl TaskReporter for ConsoleReporter {
    fn report(&self, event: &TaskEvent) {
        match event {
            TaskEvent::PlanReady { target, waves } => {
                let tasks: usize = waves.iter().map(Vec::len).sum();
                println!(
                    "{} {} {}",
                    style("→").blue(),
                    style(target).bold(),
                    style(format!("({} tasks)", tasks)).dim()
                );
                if self.verbose {
                    for (i, wave) in waves.iter().enumerate() {
                        println!("  {} Wave {}: {}", style("─").dim(), i, wave.join(", "));
                    }
                }
            }
            TaskEvent::Started { task, command } => {
                println!(
                    "  {} {} {}",
                    style("▸").dim(),
                    style(task).bold(),
                    if self.verbose {
                        style(format!("({})", command)).dim().to_string()
                    } else {
                        String::new()
                    }
                );
            }
            TaskEvent::Output {
                task,
                line,
                is_stderr,
            } => {
                if self.verbose {
                    if *is_stderr {
                        println!("    {} {}", style(format!("[{}]", task)).red().dim(), line);
                    } else {
                        println!("    {} {}", style(format!("[{}]", task)).dim(), line);
                    }
                }
            }
            TaskEvent::Completed { task, duration } => {
                println!(
                    "  {} {} {}",
                    style("✓").green(),
                    style(task).green(),
                    style(format!("{:.1}s", duration.as_secs_f64())).dim()
                );
            }
            TaskEvent::Failed {
                task,
                duration,
                error,
            } => {
                println!(
                    "  {} {} {} {}",
                    style("✗").red(),
                    style(task).red(),
                    style(format!("{:.1}s", duration.as_secs_f64())).dim(),
                    style(error).red().dim()
                );
            }
            TaskEvent::Skipped { task, reason } => {
                if self.verbose || reason != "no action" {
                    println!(
                        "  {} {} {}",
                        style("○").yellow(),
                        style(task).yellow(),
                        style(format!("({})", reason)).dim()
                    );
                }
            }
            TaskEvent::Finished(summary) => {
                println!();
                println!(
                    "  {} {}/{} succeeded, {} failed, {} skipped ({:.1}s)",
                    if summary.failed == 0 {
                        style("✓").green().bold()
                    } else {
                        style("✗").red().bold()
                    },
                    summary.succeeded,
                    summary.total,
                    summary.failed,
                    summary.skipped,
                    summary.duration.as_secs_f64()
                );
            }
        }
    }
}
