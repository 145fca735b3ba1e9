//! Help text for the built-in actions and the general usage screen

use std::sync::Arc;

use tasklane_core::Diagnostics;

use crate::argument::CommandArgument;

/// Error reported when `--run` has neither a value nor a default target
pub const NO_TARGET_MESSAGE: &str = "No target or Default Target defined for --run | -r";

pub const HELP_DESCRIPTION: &str = "Action: --support | -h
Description: Shows help for arguments
Typical Usage:
    tasklane -h(--support)
    tasklane <action> -h(--support)
";

pub const AVAILABLE_TARGETS_DESCRIPTION: &str = "Action: --available-targets | -at
Description: Lists all targets defined for use in script
Typical Usage:
    tasklane -at(--available-targets)
";

pub const RUN_DESCRIPTION: &str = "Action: --run | -r
Description: Runs a build target
Typical Usage:
    tasklane -r(--run)=<target>
        Run to get available targets: tasklane -at(--available-targets)
";

/// General usage screen listing every action
pub fn general_help(script_description: &str, arguments: &[Arc<CommandArgument>], help: &CommandArgument) -> String {
    let mut text = format!("{}\n", script_description);
    text.push_str("Typical Usage:\n");
    text.push_str("    tasklane <--longAction | -shortAction>=<action option>\n");
    text.push('\n');
    text.push_str("Available Actions:\n");
    for argument in arguments {
        text.push_str(&format!("  --{}|-{}\n", argument.name(), argument.short_name()));
    }
    text.push('\n');
    text.push_str(&help.description());
    text
}

/// Emit a help body framed by blank lines
pub fn emit(diagnostics: &dyn Diagnostics, body: &str) {
    diagnostics.information("");
    diagnostics.information(body);
    diagnostics.information("");
}
