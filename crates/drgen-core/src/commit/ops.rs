//! Filesystem seam for the transactional writer.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Filesystem primitives used by a commit.
///
/// Every filesystem call the writer makes goes through this trait, so a test
/// implementation can fail any single step. `metadata` and `create_dir_all`
/// default to `std::fs`.
pub trait FileOps {
    /// Create one directory; must fail if it already exists.
    fn create_dir(&self, path: &Path) -> io::Result<()>;
    /// Create or truncate `path`, write `contents` and flush to disk.
    fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
    /// Whether anything (file, dir, dangling symlink) exists at `path`.
    fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Metadata of the target directory, following symlinks.
    fn metadata(&self, path: &Path) -> io::Result<fs::Metadata> {
        fs::metadata(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }
}

/// [`FileOps`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileOps;

impl FileOps for StdFileOps {
    fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir(path)
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(contents)?;
        file.sync_all()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn exists(&self, path: &Path) -> io::Result<bool> {
        match fs::symlink_metadata(path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}
