//! tasklane command - command-line action dispatcher
//!
//! Registers named actions (`--name` / `-short`), resolves which one the build script
//! was invoked with and runs it. Help, target listing and running a target are
//! built in; scripts add their own actions next to them.

pub mod argument;
pub mod dispatcher;
pub mod help;

pub use argument::{ArgumentAction, CommandArgument};
pub use dispatcher::{CommandDispatcher, CommandDispatcherScope, DispatchOutcome};
