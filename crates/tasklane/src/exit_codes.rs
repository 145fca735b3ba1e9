//! Exit codes for the CLI

use tasklane_core::HelperError;

/// Success
#[allow(dead_code)]
pub const SUCCESS: i32 = 0;

/// A task failed, or any error without a more specific code
pub const ERROR: i32 = 1;

/// Task file could not be read or is invalid
pub const CONFIG_ERROR: i32 = 2;

/// An action was missing a required value or collaborator
pub const INVALID_ARGUMENT: i32 = 3;

/// Map an error to the process exit code
pub fn for_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<HelperError>() {
        Some(HelperError::Config(_)) => CONFIG_ERROR,
        Some(HelperError::InvalidArgument { .. }) => INVALID_ARGUMENT,
        _ => ERROR,
    }
}
