//! All-or-nothing commit of an output set into a directory.
//!
//! Sequence:
//! 1. validate names, make sure the target is a directory
//! 2. stage every file into `.drgen-tmp-<token>/`
//! 3. rename each pre-existing target to `<name>.drgen-bak-<token>`
//! 4. rename each staged file to its target
//! 5. drop backups and the staging dir
//!
//! A failure in 3 or 4 rolls back by walking the per-file state list
//! backward. Commits against the same directory must be serialized by the
//! caller; nothing here guards against a concurrent writer.

mod errors;
mod ops;

pub use errors::{CommitError, CommitResult, Phase, RollbackAction, RollbackFailure};
pub use ops::{FileOps, StdFileOps};

use crate::layout::{backup_name, check_file_name, temp_dir_name, unique_token};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Output file name -> final content.
pub type OutputSet = BTreeMap<String, String>;

const MAX_NAME_ATTEMPTS: usize = 16;

/// Outcome of a successful commit.
#[derive(Debug, Clone, Default)]
pub struct CommitReport {
    pub target_dir: PathBuf,
    /// Every committed file name, in commit order
    pub written: Vec<String>,
    /// Names that replaced a pre-existing file
    pub replaced: Vec<String>,
    /// Backups or staging dirs that could not be removed after success
    pub leftover_artifacts: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileState {
    Staged,
    BackedUp,
    Promoted,
    Finalized,
}

#[derive(Debug)]
struct Entry {
    name: String,
    staged: PathBuf,
    target: PathBuf,
    backup: Option<PathBuf>,
    state: FileState,
}

/// Commit `files` into `target_dir` with the standard filesystem.
pub fn commit<K, V>(target_dir: impl AsRef<Path>, files: &BTreeMap<K, V>) -> CommitResult<CommitReport>
where
    K: AsRef<str>,
    V: AsRef<[u8]>,
{
    Transaction::new(target_dir.as_ref()).commit(files)
}

/// A commit against one target directory.
#[derive(Debug, Clone)]
pub struct Transaction<O = StdFileOps> {
    target_dir: PathBuf,
    ops: O,
}

impl Transaction<StdFileOps> {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
            ops: StdFileOps,
        }
    }
}

impl<O: FileOps> Transaction<O> {
    /// Swap the filesystem implementation.
    pub fn with_ops<P: FileOps>(self, ops: P) -> Transaction<P> {
        Transaction {
            target_dir: self.target_dir,
            ops,
        }
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Run the transaction. Returns only after full success or full rollback.
    pub fn commit<K, V>(&self, files: &BTreeMap<K, V>) -> CommitResult<CommitReport>
    where
        K: AsRef<str>,
        V: AsRef<[u8]>,
    {
        for name in files.keys() {
            let name = name.as_ref();
            check_file_name(name).map_err(|reason| CommitError::InvalidFileName {
                name: name.to_string(),
                reason,
            })?;
        }

        self.ensure_target_dir()?;
        let staging_dir = self.create_staging_dir()?;

        let mut entries: Vec<Entry> = files
            .keys()
            .map(|name| {
                let name = name.as_ref();
                Entry {
                    name: name.to_string(),
                    staged: staging_dir.join(name),
                    target: self.target_dir.join(name),
                    backup: None,
                    state: FileState::Staged,
                }
            })
            .collect();

        tracing::debug!(
            target_dir = %self.target_dir.display(),
            files = entries.len(),
            "staging outputs"
        );
        for (entry, content) in entries.iter().zip(files.values()) {
            if let Err(source) = self.ops.write_file(&entry.staged, content.as_ref()) {
                if let Err(e) = self.ops.remove_dir_all(&staging_dir) {
                    tracing::warn!(
                        path = %staging_dir.display(),
                        error = %e,
                        "failed to remove staging dir after staging error"
                    );
                }
                return Err(CommitError::Staging {
                    file: entry.name.clone(),
                    source,
                });
            }
        }

        if let Err((phase, file, source)) = self.swap_in(&mut entries) {
            return Err(self.roll_back(&mut entries, &staging_dir, phase, file, source));
        }

        Ok(self.finalize(&mut entries, &staging_dir))
    }

    fn ensure_target_dir(&self) -> CommitResult<()> {
        let dir = &self.target_dir;
        match self.ops.metadata(dir) {
            Ok(meta) if meta.is_dir() => return Ok(()),
            Ok(_) => return Err(CommitError::NotADirectory { path: dir.clone() }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(CommitError::Prepare {
                    path: dir.clone(),
                    source,
                })
            }
        }

        self.ops.create_dir_all(dir).map_err(|source| CommitError::Prepare {
            path: dir.clone(),
            source,
        })?;
        tracing::debug!(path = %dir.display(), "created output directory");
        Ok(())
    }

    fn create_staging_dir(&self) -> CommitResult<PathBuf> {
        let mut last_err = None;
        for _ in 0..MAX_NAME_ATTEMPTS {
            let path = self.target_dir.join(temp_dir_name(&unique_token()));
            match self.ops.create_dir(&path) {
                Ok(()) => return Ok(path),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => last_err = Some(e),
                Err(source) => {
                    return Err(CommitError::Staging {
                        file: path.display().to_string(),
                        source,
                    })
                }
            }
        }
        Err(CommitError::Staging {
            file: "staging dir".to_string(),
            source: last_err.unwrap_or_else(|| io::Error::from(io::ErrorKind::AlreadyExists)),
        })
    }

    fn fresh_backup_path(&self, name: &str) -> io::Result<PathBuf> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let candidate = self.target_dir.join(backup_name(name, &unique_token()));
            if !self.ops.exists(&candidate)? {
                return Ok(candidate);
            }
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free backup name for '{}'", name),
        ))
    }

    /// Backup phase followed by promotion phase.
    fn swap_in(&self, entries: &mut [Entry]) -> Result<(), (Phase, String, io::Error)> {
        for entry in entries.iter_mut() {
            let fail = |e: io::Error| (Phase::Backup, entry.name.clone(), e);
            if !self.ops.exists(&entry.target).map_err(fail)? {
                continue;
            }
            let backup = self.fresh_backup_path(&entry.name).map_err(fail)?;
            self.ops.rename(&entry.target, &backup).map_err(fail)?;
            tracing::debug!(file = %entry.name, backup = %backup.display(), "backed up");
            entry.backup = Some(backup);
            entry.state = FileState::BackedUp;
        }

        for entry in entries.iter_mut() {
            self.ops
                .rename(&entry.staged, &entry.target)
                .map_err(|e| (Phase::Promotion, entry.name.clone(), e))?;
            entry.state = FileState::Promoted;
        }
        Ok(())
    }

    fn roll_back(
        &self,
        entries: &mut [Entry],
        staging_dir: &Path,
        phase: Phase,
        file: String,
        source: io::Error,
    ) -> CommitError {
        tracing::warn!(%phase, %file, error = %source, "commit failed, rolling back");
        let mut failures = Vec::new();

        for entry in entries.iter_mut().rev() {
            let undo = match (entry.state, &entry.backup) {
                // rename over the promoted file restores the original in one step
                (FileState::Promoted, Some(backup)) | (FileState::BackedUp, Some(backup)) => self
                    .ops
                    .rename(backup, &entry.target)
                    .map_err(|e| (RollbackAction::RestoreBackup, e)),
                (FileState::Promoted, None) => self
                    .ops
                    .remove_file(&entry.target)
                    .map_err(|e| (RollbackAction::RemovePromoted, e)),
                _ => continue,
            };

            match undo {
                Ok(()) => {
                    entry.backup = None;
                    entry.state = FileState::Staged;
                }
                Err((action, error)) => {
                    tracing::warn!(
                        file = %entry.name,
                        %action,
                        error = %error,
                        "rollback step failed"
                    );
                    failures.push(RollbackFailure {
                        file: entry.name.clone(),
                        action,
                        path: entry.target.clone(),
                        backup: entry.backup.clone(),
                        error,
                    });
                }
            }
        }

        if let Err(error) = self.ops.remove_dir_all(staging_dir) {
            tracing::warn!(path = %staging_dir.display(), error = %error, "failed to remove staging dir");
            failures.push(RollbackFailure {
                file: staging_dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                action: RollbackAction::RemoveStaging,
                path: staging_dir.to_path_buf(),
                backup: None,
                error,
            });
        }

        if failures.is_empty() {
            CommitError::RolledBack {
                phase,
                file,
                source,
            }
        } else {
            CommitError::RollbackIncomplete {
                phase,
                file,
                source,
                failures,
            }
        }
    }

    fn finalize(&self, entries: &mut [Entry], staging_dir: &Path) -> CommitReport {
        let mut report = CommitReport {
            target_dir: self.target_dir.clone(),
            ..CommitReport::default()
        };

        for entry in entries.iter_mut() {
            if let Some(backup) = entry.backup.take() {
                report.replaced.push(entry.name.clone());
                if let Err(e) = self.ops.remove_file(&backup) {
                    tracing::warn!(path = %backup.display(), error = %e, "failed to remove backup");
                    report.leftover_artifacts.push(backup);
                }
            }
            entry.state = FileState::Finalized;
            report.written.push(entry.name.clone());
        }

        if let Err(e) = self.ops.remove_dir_all(staging_dir) {
            tracing::warn!(path = %staging_dir.display(), error = %e, "failed to remove staging dir");
            report.leftover_artifacts.push(staging_dir.to_path_buf());
        }

        tracing::info!(
            target_dir = %self.target_dir.display(),
            written = report.written.len(),
            replaced = report.replaced.len(),
            "commit complete"
        );
        report
    }
}
