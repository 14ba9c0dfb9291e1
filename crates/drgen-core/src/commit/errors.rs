use std::fmt;
use std::io;
use std::path::PathBuf;

/// Transaction phase in which a commit failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Staging,
    Backup,
    Promotion,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Staging => f.write_str("staging"),
            Phase::Backup => f.write_str("backup"),
            Phase::Promotion => f.write_str("promotion"),
        }
    }
}

/// Undo step that could not be completed during rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackAction {
    /// Removing a newly promoted file that had no predecessor.
    RemovePromoted,
    /// Renaming a backup back to its original name.
    RestoreBackup,
    /// Removing the staging directory.
    RemoveStaging,
}

impl fmt::Display for RollbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollbackAction::RemovePromoted => f.write_str("remove promoted file"),
            RollbackAction::RestoreBackup => f.write_str("restore backup"),
            RollbackAction::RemoveStaging => f.write_str("remove staging dir"),
        }
    }
}

/// One file left in a state that needs manual recovery.
#[derive(Debug)]
pub struct RollbackFailure {
    /// Output file name (or staging dir name for `RemoveStaging`)
    pub file: String,
    pub action: RollbackAction,
    /// Path that is now possibly inconsistent
    pub path: PathBuf,
    /// Backup still holding the original bytes, if any
    pub backup: Option<PathBuf>,
    pub error: io::Error,
}

impl fmt::Display for RollbackFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed for '{}' at {}: {}",
            self.action,
            self.file,
            self.path.display(),
            self.error
        )?;
        if let Some(backup) = &self.backup {
            write!(f, " (original preserved at {})", backup.display())?;
        }
        Ok(())
    }
}

/// Commit errors.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// Target exists and is not a directory.
    #[error("output path is not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },

    /// An output name would escape the directory or clash with transient names.
    #[error("invalid output file name '{name}': {reason}")]
    InvalidFileName { name: String, reason: String },

    /// Target directory could not be created or inspected.
    #[error("failed to prepare output directory {}: {source}", .path.display())]
    Prepare {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Staging failed; nothing outside the staging directory was touched.
    #[error("failed to stage '{file}': {source}")]
    Staging {
        file: String,
        #[source]
        source: io::Error,
    },

    /// Backup or promotion failed and every change was undone.
    #[error("{phase} failed for '{file}', changes rolled back: {source}")]
    RolledBack {
        phase: Phase,
        file: String,
        #[source]
        source: io::Error,
    },

    /// Backup or promotion failed and rollback could not undo everything.
    #[error(
        "{phase} failed for '{file}' and rollback was incomplete ({} step(s) need manual recovery): {source}",
        .failures.len()
    )]
    RollbackIncomplete {
        phase: Phase,
        file: String,
        #[source]
        source: io::Error,
        failures: Vec<RollbackFailure>,
    },
}

impl CommitError {
    /// Whether re-issuing the whole commit may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Prepare { .. } | Self::Staging { .. } | Self::RolledBack { .. }
        )
    }

    /// Whether the output directory may be left inconsistent.
    pub fn needs_manual_recovery(&self) -> bool {
        matches!(self, Self::RollbackIncomplete { .. })
    }

    /// Rollback failures, empty unless `needs_manual_recovery`.
    pub fn rollback_failures(&self) -> &[RollbackFailure] {
        match self {
            Self::RollbackIncomplete { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// Result type for commit operations.
pub type CommitResult<T> = Result<T, CommitError>;
