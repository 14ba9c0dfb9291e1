//! Listing of generated decision folders and the markdown report over them.

use crate::generate::{RECORD_FILE, SUMMARY_FILE};
use crate::layout::is_transient_name;
use crate::naming::ISO_DATE_RE;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_DECISION_LEN: usize = 80;

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("{label} must be YYYY-MM-DD (got: {value})")]
    InvalidDate { label: &'static str, value: String },

    #[error("failed to read {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub out_dir: PathBuf,
    pub from: Option<String>,
    pub to: Option<String>,
    /// Attach the integrity status of each folder
    pub verify: bool,
}

/// Fields read back from `summary.json`; absent when not a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecisionSummary {
    pub title: Option<String>,
    pub date: Option<String>,
    pub decider: Option<String>,
    pub status: Option<String>,
    pub supersedes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListedDecision {
    pub folder_name: String,
    pub dir: PathBuf,
    pub date_from_folder: Option<String>,
    pub summary: Option<DecisionSummary>,
    pub decision_excerpt: Option<String>,
    /// `None` unless listing was asked to verify
    pub integrity_ok: Option<bool>,
}

fn normalize_bound(
    value: Option<&str>,
    label: &'static str,
) -> Result<Option<String>, ListError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) if ISO_DATE_RE.is_match(v) => Ok(Some(v.to_string())),
        Some(v) => Err(ListError::InvalidDate {
            label,
            value: v.to_string(),
        }),
    }
}

fn folder_date(folder_name: &str) -> Option<&str> {
    let date = folder_name.get(..10)?;
    let sep = folder_name.get(10..12)?;
    (sep == "__" && ISO_DATE_RE.is_match(date)).then_some(date)
}

fn read_summary(dir: &Path) -> Option<DecisionSummary> {
    let raw = fs::read(dir.join(SUMMARY_FILE)).ok()?;
    let value: serde_json::Value = serde_json::from_slice(&raw).ok()?;
    let obj = value.as_object()?;
    let field = |key: &str| obj.get(key).and_then(|v| v.as_str()).map(str::to_string);
    Some(DecisionSummary {
        title: field("title"),
        date: field("date"),
        decider: field("decider"),
        status: field("status"),
        supersedes: field("supersedes"),
    })
}

fn section_first_line(markdown: &str, header: &str) -> Option<String> {
    let mut lines = markdown.lines();
    lines.by_ref().find(|line| line.trim() == header)?;
    for line in lines {
        if line.starts_with("## ") {
            return None;
        }
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.split_whitespace().collect::<Vec<_>>().join(" "));
        }
    }
    None
}

/// First line under `## Decision`, falling back to `## Rule`.
pub fn decision_excerpt(markdown: &str) -> Option<String> {
    section_first_line(markdown, "## Decision").or_else(|| section_first_line(markdown, "## Rule"))
}

/// Decision folders under `out_dir`, newest first.
pub fn list_decisions(options: &ListOptions) -> Result<Vec<ListedDecision>, ListError> {
    let from = normalize_bound(options.from.as_deref(), "from")?;
    let to = normalize_bound(options.to.as_deref(), "to")?;
    let ranged = from.is_some() || to.is_some();

    let read_err = |source: std::io::Error| ListError::ReadDir {
        path: options.out_dir.clone(),
        source,
    };
    let mut items = Vec::new();
    for entry in fs::read_dir(&options.out_dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let folder_name = entry.file_name().to_string_lossy().into_owned();
        if is_transient_name(&folder_name) {
            continue;
        }

        let date = folder_date(&folder_name).map(str::to_string);
        match date.as_deref() {
            Some(d) => {
                if from.as_deref().is_some_and(|f| d < f) || to.as_deref().is_some_and(|t| d > t) {
                    continue;
                }
            }
            None if ranged => continue,
            None => {}
        }

        let dir = entry.path();
        let excerpt = fs::read_to_string(dir.join(RECORD_FILE))
            .ok()
            .and_then(|md| decision_excerpt(&md));
        let integrity_ok = options
            .verify
            .then(|| crate::verify::verify_dir(&dir).map(|r| r.ok).unwrap_or(false));

        items.push(ListedDecision {
            summary: read_summary(&dir),
            folder_name,
            dir,
            date_from_folder: date,
            decision_excerpt: excerpt,
            integrity_ok,
        });
    }

    items.sort_by(compare_listed);
    tracing::debug!(out_dir = %options.out_dir.display(), count = items.len(), "listed decisions");
    Ok(items)
}

fn compare_listed(a: &ListedDecision, b: &ListedDecision) -> Ordering {
    let title = |d: &ListedDecision| {
        d.summary
            .as_ref()
            .and_then(|s| s.title.clone())
            .unwrap_or_default()
    };
    // undated ("") sorts last
    let ad = a.date_from_folder.as_deref().unwrap_or("");
    let bd = b.date_from_folder.as_deref().unwrap_or("");
    bd.cmp(ad).then_with(|| title(a).cmp(&title(b)))
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub out_dir: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub max_decision_len: usize,
}

impl ReportOptions {
    pub fn new(out_dir: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            out_dir: out_dir.into(),
            from: None,
            to: None,
            generated_at,
            max_decision_len: DEFAULT_MAX_DECISION_LEN,
        }
    }
}

fn md_escape(value: &str) -> String {
    value
        .replace('|', "\\|")
        .replace("\r\n", " ")
        .replace('\n', " ")
}

fn clip_one_line(value: &str, max_chars: usize) -> String {
    let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.chars().count() <= max_chars {
        return normalized;
    }
    if max_chars <= 1 {
        return "…".to_string();
    }
    let mut clipped: String = normalized.chars().take(max_chars - 1).collect();
    clipped.push('…');
    clipped
}

/// `__<8 hex>` suffix of the folder, or the whole folder name.
fn folder_id(folder_name: &str) -> &str {
    let last = folder_name.rsplit("__").next().unwrap_or(folder_name);
    if last.len() == 8 && last.chars().all(|c| c.is_ascii_hexdigit()) {
        last
    } else {
        folder_name
    }
}

pub fn render_list_report(items: &[ListedDecision], options: &ReportOptions) -> String {
    let mut lines = vec!["# Decision Record Report".to_string(), String::new()];

    let bounds = [("from", &options.from), ("to", &options.to)];
    let period: Vec<String> = bounds
        .iter()
        .filter_map(|(label, v)| {
            v.as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| format!("{label} {v}"))
        })
        .collect();
    let period = if period.is_empty() {
        "all".to_string()
    } else {
        period.join(" ")
    };

    lines.push(format!("- Out dir: {}", options.out_dir));
    lines.push(format!("- Period: {period}"));
    lines.push(format!(
        "- Generated at: {}",
        options.generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    ));
    lines.push(String::new());
    lines.push("## Decisions".to_string());
    lines.push(String::new());

    for item in items {
        let summary = item.summary.clone().unwrap_or_default();
        let date = summary.date.or_else(|| item.date_from_folder.clone());

        lines.push(format!("- ID: {}", md_escape(folder_id(&item.folder_name))));
        let fields = [
            ("Date", date),
            ("Title", summary.title),
            ("Status", summary.status),
            ("Decider", summary.decider),
            (
                "Decision",
                item.decision_excerpt
                    .as_deref()
                    .map(|e| clip_one_line(e, options.max_decision_len)),
            ),
        ];
        for (label, value) in fields {
            if let Some(v) = value.filter(|v| !v.is_empty()) {
                lines.push(format!("  - {label}: {}", md_escape(&v)));
            }
        }
        if let Some(ok) = item.integrity_ok {
            lines.push(format!("  - Integrity: {}", if ok { "ok" } else { "FAILED" }));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(folder: &str, title: Option<&str>, excerpt: Option<&str>) -> ListedDecision {
        ListedDecision {
            folder_name: folder.to_string(),
            dir: PathBuf::from(folder),
            date_from_folder: folder_date(folder).map(str::to_string),
            summary: title.map(|t| DecisionSummary {
                title: Some(t.to_string()),
                ..Default::default()
            }),
            decision_excerpt: excerpt.map(str::to_string),
            integrity_ok: None,
        }
    }

    #[test]
    fn folder_dates() {
        assert_eq!(folder_date("2026-01-15__x__abcdef12"), Some("2026-01-15"));
        assert_eq!(folder_date("2026-01-15_x"), None);
        assert_eq!(folder_date("undated__x__abcdef12"), None);
        assert_eq!(folder_date("short"), None);
        assert_eq!(folder_date("ありがとうございます"), None);
    }

    #[test]
    fn excerpt_prefers_decision_heading() {
        let md = "# T\n\n## Rule\nold rule\n\n## Decision\n\n  do   it \n";
        assert_eq!(decision_excerpt(md).as_deref(), Some("do it"));
        let md = "# T\r\n\r\n## Rule\r\nthe rule\r\n";
        assert_eq!(decision_excerpt(md).as_deref(), Some("the rule"));
        let md = "## Rule\n\n## Consequences\nnot this\n";
        assert_eq!(decision_excerpt(md), None);
    }

    #[test]
    fn clipping() {
        assert_eq!(clip_one_line("a  b\nc", 10), "a b c");
        assert_eq!(clip_one_line("abcdef", 4), "abc…");
        assert_eq!(clip_one_line("abcdef", 1), "…");
        assert_eq!(clip_one_line("日本語のテキスト", 4).chars().count(), 4);
    }

    #[test]
    fn bounds_are_validated() {
        assert!(normalize_bound(Some(" "), "from").unwrap().is_none());
        let err = normalize_bound(Some("2026/01/01"), "from").unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn sorting_newest_first_then_title() {
        let mut items = vec![
            item("undated__z__00000000", Some("Z"), None),
            item("2026-01-01__b__00000001", Some("B"), None),
            item("2026-02-01__c__00000002", Some("C"), None),
            item("2026-01-01__a__00000003", Some("A"), None),
        ];
        items.sort_by(compare_listed);
        let titles: Vec<_> = items
            .iter()
            .map(|i| i.summary.as_ref().unwrap().title.clone().unwrap())
            .collect();
        assert_eq!(titles, vec!["C", "A", "B", "Z"]);
    }

    #[test]
    fn report_layout() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut opts = ReportOptions::new("out", at);
        opts.from = Some("2026-01-01".into());
        opts.max_decision_len = 10;
        let mut it = item(
            "2026-01-15__Use-Postgres__1a2b3c4d",
            Some("Use | Postgres"),
            Some("All new services use Postgres"),
        );
        it.integrity_ok = Some(false);
        let report = render_list_report(&[it, item("misc", None, None)], &opts);

        assert!(report.starts_with("# Decision Record Report\n\n- Out dir: out\n- Period: from 2026-01-01\n"));
        assert!(report.contains("- Generated at: 2026-03-01T12:00:00.000Z\n"));
        assert!(report.contains("- ID: 1a2b3c4d\n  - Date: 2026-01-15\n  - Title: Use \\| Postgres\n"));
        assert!(report.contains("  - Decision: All new s…\n"));
        assert!(report.contains("  - Integrity: FAILED\n"));
        assert!(report.contains("- ID: misc\n"));
    }
}
