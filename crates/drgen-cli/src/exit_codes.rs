//! Exit codes for `drgen`. Part of the public contract for scripts and CI.

use drgen_core::{CommitError, GenerateError, ManifestError};

pub const SUCCESS: i32 = 0;
/// Verification ran and at least one file failed its integrity check
pub const INTEGRITY_FAILED: i32 = 1;
/// Bad arguments, unreadable or invalid input
pub const CONFIG_ERROR: i32 = 2;
/// `manifest.json` missing, unreadable or malformed
pub const MANIFEST_INVALID: i32 = 3;
/// A commit failed and rollback could not restore every file
pub const ROLLBACK_INCOMPLETE: i32 = 4;

/// The commit error behind `err`, if any.
pub fn commit_error(err: &anyhow::Error) -> Option<&CommitError> {
    err.chain().find_map(|cause| {
        cause.downcast_ref::<CommitError>().or_else(|| {
            match cause.downcast_ref::<GenerateError>() {
                Some(GenerateError::Commit(e)) => Some(e),
                _ => None,
            }
        })
    })
}

/// Exit code for an error that aborted a command.
pub fn classify(err: &anyhow::Error) -> i32 {
    if commit_error(err).is_some_and(CommitError::needs_manual_recovery) {
        return ROLLBACK_INCOMPLETE;
    }
    if err.chain().any(|cause| cause.is::<ManifestError>()) {
        return MANIFEST_INVALID;
    }
    CONFIG_ERROR
}
