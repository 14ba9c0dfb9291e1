//! Output folder naming.
//!
//! # Folder Schema
//!
//! ```text
//! {out}/{YYYY-MM-DD|undated}__{slug}__{id8}/       # first generation
//! {out}/{YYYY-MM-DD|undated}__{slug}__{id8}__2/    # name already taken
//! ```
//!
//! `id8` is derived from title, date and decider, so regenerating the same
//! record lands next to its previous output rather than on top of it.

use crate::hash::sha256_hex;
use crate::record::DecisionRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

pub(crate) static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date regex"));

static DASH_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("valid dash regex"));

const MAX_SLUG_CHARS: usize = 60;
const MAX_SUFFIX: u32 = 9999;

#[derive(Debug, thiserror::Error)]
pub enum NamingError {
    #[error("unable to find an available directory name for '{name}' in {}", .base.display())]
    Exhausted { base: PathBuf, name: String },

    #[error("failed to inspect {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Human-readable, filesystem-safe slug of `value`.
pub fn slugify(value: &str) -> String {
    let normalized: String = value.nfkc().collect();
    let mut out = String::with_capacity(normalized.len());
    let mut in_space = false;
    for c in normalized.trim().chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        match c {
            '\\' | '/' => out.push('-'),
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => {}
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    DASH_RUN_RE
        .replace_all(&out, "-")
        .trim_matches('-')
        .to_string()
}

fn date_prefix(date: Option<&str>) -> &str {
    match date.map(str::trim) {
        Some(d) if ISO_DATE_RE.is_match(d) => d,
        _ => "undated",
    }
}

/// Short stable id: first 8 hex chars of sha256(`title\ndate\ndecider`).
pub fn decision_short_id(record: &DecisionRecord) -> String {
    let basis = [
        record.title.as_str(),
        record.date.as_deref().unwrap_or(""),
        record.decider.as_deref().unwrap_or(""),
    ]
    .join("\n");
    sha256_hex(basis)[..8].to_string()
}

/// `<YYYY-MM-DD|undated>__<slug>__<id8>`
pub fn decision_folder_name(record: &DecisionRecord) -> String {
    let slug = slugify(&record.title);
    let slug: String = if slug.is_empty() {
        "decision".to_string()
    } else {
        slug.chars().take(MAX_SLUG_CHARS).collect()
    };
    format!(
        "{}__{}__{}",
        date_prefix(record.date.as_deref()),
        slug,
        decision_short_id(record)
    )
}

/// First free path among `base/name`, `base/name__2` .. `base/name__9999`.
pub fn find_available_dir(base: &Path, name: &str) -> Result<PathBuf, NamingError> {
    let candidates = std::iter::once(name.to_string())
        .chain((2..=MAX_SUFFIX).map(|i| format!("{name}__{i}")));
    for candidate in candidates {
        let path = base.join(candidate);
        let taken = path.try_exists().map_err(|source| NamingError::Io {
            path: path.clone(),
            source,
        })?;
        if !taken {
            return Ok(path);
        }
    }
    Err(NamingError::Exhausted {
        base: base.to_path_buf(),
        name: name.to_string(),
    })
}
