//! Output directory layout.
//!
//! ```text
//! <out>/decision-record.md         # rendered outputs
//! <out>/manifest.json              # integrity manifest (never lists itself)
//! <out>/.drgen-tmp-<token>/        # staging dir, only during a commit
//! <out>/<name>.drgen-bak-<token>   # backup of a replaced file, only during a commit
//! ```
//!
//! Staging directories and backups are transient tooling state. They are
//! excluded from verification and listing and can never be output names.

use std::path::{Component, Path};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Name of the integrity manifest inside an output directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Prefix of the per-commit staging directory.
pub const TEMP_DIR_PREFIX: &str = ".drgen-tmp-";

/// Marker between a file name and the token of its backup.
pub const BACKUP_MARKER: &str = ".drgen-bak-";

static TOKEN_COUNTER: AtomicU64 = AtomicU64::new(0);
static PROCESS_SALT: OnceLock<String> = OnceLock::new();

fn process_salt() -> &'static str {
    PROCESS_SALT.get_or_init(|| {
        let started = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        format!("{:x}{:08x}", std::process::id(), started as u32)
    })
}

/// Token for transient artifact names.
///
/// Unique within the process through the monotonic counter; the salt
/// (pid + process start) and the random suffix separate processes, so two
/// tokens minted in the same clock tick never collide.
pub fn unique_token() -> String {
    let seq = TOKEN_COUNTER.fetch_add(1, Ordering::Relaxed);
    let noise: u32 = rand::random();
    format!("{}-{:x}-{:08x}", process_salt(), seq, noise)
}

pub fn temp_dir_name(token: &str) -> String {
    format!("{TEMP_DIR_PREFIX}{token}")
}

pub fn backup_name(file_name: &str, token: &str) -> String {
    format!("{file_name}{BACKUP_MARKER}{token}")
}

/// True for staging directories and backup artifacts.
pub fn is_transient_name(name: &str) -> bool {
    name.starts_with(TEMP_DIR_PREFIX) || name.contains(BACKUP_MARKER)
}

/// Validate that `name` is usable as an output file name: one plain path
/// component that stays inside the output directory.
pub fn check_file_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name is empty".into());
    }
    if name.contains('\0') {
        return Err("name contains NUL".into());
    }
    if name.contains('/') || name.contains('\\') {
        return Err("name contains a path separator".into());
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(c)), None) if c == name => {}
        _ => return Err("name is not a plain file name".into()),
    }
    if is_transient_name(name) {
        return Err("name is reserved for transient commit artifacts".into());
    }
    Ok(())
}
