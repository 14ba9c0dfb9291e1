//! Text renderers for the generated files.

use crate::generate::{MANIFEST_FILE, RECORD_FILE, REPRO_FILE, SUMMARY_FILE};
use crate::record::DecisionRecord;
use serde::Serialize;

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn push_section(lines: &mut Vec<String>, heading: &str, body: &Option<String>) {
    lines.push(format!("## {heading}"));
    lines.push(body.clone().unwrap_or_default());
    lines.push(String::new());
}

/// `decision-record.md`
pub fn render_record_markdown(record: &DecisionRecord) -> String {
    let mut lines = vec![format!("# {}", record.title), String::new()];

    let meta: Vec<String> = [
        ("Date", &record.date),
        ("Decider", &record.decider),
        ("Status", &record.status),
        ("Supersedes", &record.supersedes),
    ]
    .into_iter()
    .filter_map(|(label, value)| non_empty(value).map(|v| format!("**{label}**: {v}")))
    .collect();
    if !meta.is_empty() {
        // trailing double space is a markdown line break
        lines.push(meta.join("  \n"));
        lines.push(String::new());
    }

    push_section(&mut lines, "Context", &record.context);
    push_section(&mut lines, "Why", &record.why);
    push_section(&mut lines, "Rule", &record.rule);
    push_section(&mut lines, "Alternatives Considered", &record.alternatives);
    push_section(&mut lines, "Consequences", &record.consequences);

    if let Some(tags) = record.tags.as_ref().filter(|t| !t.is_empty()) {
        lines.push(format!("**Tags**: {}", tags.join(", ")));
        lines.push(String::new());
    }

    lines.join("\n")
}

#[derive(Serialize)]
struct SummaryFiles {
    record: &'static str,
    summary: &'static str,
    repro: &'static str,
    manifest: &'static str,
}

#[derive(Serialize)]
struct Summary<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    decider: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    supersedes: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
    files: SummaryFiles,
}

/// `summary.json`
pub fn render_summary_json(record: &DecisionRecord) -> serde_json::Result<String> {
    let summary = Summary {
        title: &record.title,
        date: record.date.as_deref(),
        decider: record.decider.as_deref(),
        status: record.status.as_deref(),
        supersedes: record.supersedes.as_deref(),
        tags: record.tags.as_deref(),
        files: SummaryFiles {
            record: RECORD_FILE,
            summary: SUMMARY_FILE,
            repro: REPRO_FILE,
            manifest: MANIFEST_FILE,
        },
    };
    serde_json::to_string_pretty(&summary)
}

/// `repro.md`
pub fn render_repro_markdown(record: &DecisionRecord) -> String {
    let step = |n: u8, label: &str, value: &Option<String>| match non_blank(value) {
        Some(v) => format!("{n}. {label}: {v}"),
        None => format!("{n}. {label}"),
    };

    let mut lines = vec![
        "# Reproducibility Notes".to_string(),
        String::new(),
        "## Decision".to_string(),
        record.title.clone(),
        String::new(),
    ];
    push_section(&mut lines, "Context", &record.context);

    lines.push("## How to Reproduce This Decision".to_string());
    lines.push("1. Review the context and constraints".to_string());
    lines.push(step(2, "Evaluate alternatives", &record.alternatives));
    lines.push(step(3, "Consider consequences", &record.consequences));
    lines.push(step(4, "Apply the rule", &record.rule));
    lines.push(String::new());

    lines.push("## Verification".to_string());
    lines.push(format!("- Check {MANIFEST_FILE} for file integrity"));
    lines.push("- Compare SHA256 hashes to detect tampering".to_string());
    lines.push("- Run: drgen verify <this directory>".to_string());
    lines.push(String::new());

    lines.join("\n")
}
