//! Decision record input (`decision.yaml`).
//!
//! Parsing is lenient about optional fields: a value of the wrong type is
//! dropped rather than rejected. Only `title` is mandatory.

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("decision.yaml must be a YAML mapping (object)")]
    NotAMapping,

    #[error("`title` is required and must be a non-empty string")]
    MissingTitle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecisionRecord {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supersedes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consequences: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

fn opt_string(map: &Mapping, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn opt_string_list(map: &Mapping, key: &str) -> Option<Vec<String>> {
    map.get(key)?
        .as_sequence()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

impl DecisionRecord {
    pub fn from_yaml_str(raw: &str) -> Result<Self, RecordError> {
        let loaded: Value = serde_yaml::from_str(raw)?;
        let map = loaded.as_mapping().ok_or(RecordError::NotAMapping)?;

        let title = opt_string(map, "title")
            .filter(|t| !t.trim().is_empty())
            .ok_or(RecordError::MissingTitle)?;

        Ok(Self {
            title,
            date: opt_string(map, "date"),
            decider: opt_string(map, "decider"),
            status: opt_string(map, "status"),
            supersedes: opt_string(map, "supersedes"),
            context: opt_string(map, "context"),
            why: opt_string(map, "why"),
            rule: opt_string(map, "rule").or_else(|| opt_string(map, "decision")),
            alternatives: opt_string(map, "alternatives"),
            consequences: opt_string(map, "consequences"),
            tags: opt_string_list(map, "tags"),
        })
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, RecordError> {
        let raw = std::fs::read_to_string(path).map_err(|source| RecordError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Core fields (`why`, `rule`) that are missing or blank.
    pub fn missing_core_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.why) {
            missing.push("why");
        }
        if is_blank(&self.rule) {
            missing.push("rule");
        }
        missing
    }

    /// Whether the rule merely restates the title.
    pub fn rule_restates_title(&self) -> bool {
        let rule = match self.rule.as_deref() {
            Some(r) => r,
            None => return false,
        };
        let t = comparable(&self.title);
        let r = comparable(rule);
        if t.is_empty() || r.is_empty() {
            return false;
        }
        if t == r {
            return true;
        }
        let (shorter, longer) = if t.chars().count() <= r.chars().count() {
            (&t, &r)
        } else {
            (&r, &t)
        };
        longer.contains(shorter.as_str())
            && longer.chars().count() - shorter.chars().count() <= 8
    }
}

// NFKC, lowercased, whitespace and common punctuation removed.
fn comparable(value: &str) -> String {
    const PUNCT: &str = "\"'`\u{201c}\u{201d}\u{2018}\u{2019}.,:;!?()[]{}<>|\\/-_=+*~^$#@";
    value
        .nfkc()
        .collect::<String>()
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && !PUNCT.contains(*c))
        .collect()
}

/// Starter `decision.yaml`.
pub fn template() -> String {
    [
        "title: \"TODO: Decision title\"",
        "date: \"\"",
        "decider: \"\"",
        "status: \"\"",
        "supersedes: \"\"",
        "context: \"\"",
        "why: \"\"",
        "decision: \"\"",
        "alternatives: \"\"",
        "consequences: \"\"",
        "tags: []",
        "",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_record() {
        let r = DecisionRecord::from_yaml_str(
            "title: Use Postgres\ndate: \"2026-01-15\"\ndecider: alice\nwhy: JSONB\nrule: new services use Postgres\ntags: [db, infra]\n",
        )
        .unwrap();
        assert_eq!(r.title, "Use Postgres");
        assert_eq!(r.date.as_deref(), Some("2026-01-15"));
        assert_eq!(r.rule.as_deref(), Some("new services use Postgres"));
        assert_eq!(r.tags, Some(vec!["db".to_string(), "infra".to_string()]));
        assert!(r.missing_core_fields().is_empty());
    }

    #[test]
    fn non_string_fields_are_dropped() {
        let r = DecisionRecord::from_yaml_str("title: T\ndate: 2026-01-15\nstatus: 3\ntags: [a, 1]\n")
            .unwrap();
        // unquoted dates stay strings in YAML 1.2, numbers do not
        assert_eq!(r.date.as_deref(), Some("2026-01-15"));
        assert_eq!(r.status, None);
        assert_eq!(r.tags, None);
    }

    #[test]
    fn decision_is_an_alias_for_rule() {
        let r = DecisionRecord::from_yaml_str("title: T\ndecision: d\n").unwrap();
        assert_eq!(r.rule.as_deref(), Some("d"));
        let r = DecisionRecord::from_yaml_str("title: T\ndecision: d\nrule: r\n").unwrap();
        assert_eq!(r.rule.as_deref(), Some("r"));
    }

    #[test]
    fn rejects_missing_or_blank_title() {
        for raw in ["why: x\n", "title: \"  \"\n", "title: 5\n"] {
            assert!(matches!(
                DecisionRecord::from_yaml_str(raw),
                Err(RecordError::MissingTitle)
            ));
        }
    }

    #[test]
    fn rejects_non_mapping() {
        assert!(matches!(
            DecisionRecord::from_yaml_str("- a\n- b\n"),
            Err(RecordError::NotAMapping)
        ));
        assert!(matches!(
            DecisionRecord::from_yaml_str("title: [unclosed"),
            Err(RecordError::Yaml(_))
        ));
    }

    #[test]
    fn missing_core_fields_treats_blank_as_missing() {
        let r = DecisionRecord::from_yaml_str("title: T\nwhy: \" \"\n").unwrap();
        assert_eq!(r.missing_core_fields(), vec!["why", "rule"]);
    }

    #[test]
    fn template_parses_back() {
        let r = DecisionRecord::from_yaml_str(&template()).unwrap();
        assert_eq!(r.title, "TODO: Decision title");
        assert_eq!(r.tags, Some(vec![]));
        assert_eq!(r.missing_core_fields(), vec!["why", "rule"]);
    }

    #[test]
    fn rule_restating_title() {
        let mut r = DecisionRecord {
            title: "Use Postgres".into(),
            rule: Some("use postgres.".into()),
            ..Default::default()
        };
        assert!(r.rule_restates_title());
        r.rule = Some("All new services store data in Postgres 16".into());
        assert!(!r.rule_restates_title());
        r.rule = None;
        assert!(!r.rule_restates_title());
    }
}
