use crate::commit::{self, CommitError, CommitReport, OutputSet};
use crate::manifest::Manifest;
use crate::record::DecisionRecord;
use crate::render::{render_record_markdown, render_repro_markdown, render_summary_json};
use chrono::{DateTime, Utc};
use std::path::Path;

pub use crate::layout::MANIFEST_FILE;

pub const RECORD_FILE: &str = "decision-record.md";
pub const SUMMARY_FILE: &str = "summary.json";
pub const REPRO_FILE: &str = "repro.md";

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),

    #[error(transparent)]
    Commit(#[from] CommitError),
}

/// Render every output file, manifest included, for `record`.
pub fn render_output_set(
    record: &DecisionRecord,
    generated_at: DateTime<Utc>,
) -> Result<OutputSet, GenerateError> {
    let mut files = OutputSet::new();
    files.insert(RECORD_FILE.to_string(), render_record_markdown(record));
    files.insert(SUMMARY_FILE.to_string(), render_summary_json(record)?);
    files.insert(REPRO_FILE.to_string(), render_repro_markdown(record));

    let manifest = Manifest::build(record.title.as_str(), generated_at, &files);
    files.insert(MANIFEST_FILE.to_string(), manifest.to_json_pretty()?);
    Ok(files)
}

/// Render and commit all outputs for `record` into `out_dir`.
pub fn generate_decision_record_files(
    record: &DecisionRecord,
    out_dir: &Path,
) -> Result<CommitReport, GenerateError> {
    let files = render_output_set(record, Utc::now())?;
    tracing::debug!(out_dir = %out_dir.display(), title = %record.title, "generating decision record");
    Ok(commit::commit(out_dir, &files)?)
}
