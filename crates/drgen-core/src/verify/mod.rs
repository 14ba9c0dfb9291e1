//! Offline integrity check of an output directory against its manifest.
//!
//! The verifier is read-only and one-shot. Manifest problems fail fast with a
//! [`ManifestError`]; per-file problems are reported in [`VerifyReport`].

use crate::hash::ContentDigest;
use crate::layout::MANIFEST_FILE;
use crate::manifest::{parse_manifest, ManifestError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome for one listed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Mismatch,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileCheck {
    pub filename: String,
    pub ok: bool,
    pub status: FileStatus,
    pub expected_sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_sha256: Option<String>,
    pub expected_size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    /// True only if every listed file is `ok`
    pub ok: bool,
    pub manifest_path: PathBuf,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    /// One entry per manifest file, ordered by filename
    pub results: Vec<FileCheck>,
}

impl VerifyReport {
    pub fn failed(&self) -> impl Iterator<Item = &FileCheck> {
        self.results.iter().filter(|r| !r.ok)
    }
}

/// Verify every file listed in `dir/manifest.json`.
pub fn verify_dir(dir: impl AsRef<Path>) -> Result<VerifyReport, ManifestError> {
    let dir = dir.as_ref();
    let manifest_path = dir.join(MANIFEST_FILE);

    let bytes = fs::read(&manifest_path).map_err(|e| {
        ManifestError::from(e).with_context(format!("read {}", manifest_path.display()))
    })?;
    let manifest = parse_manifest(&bytes)
        .map_err(|e| e.with_context(manifest_path.display().to_string()))?;

    let results: Vec<FileCheck> = manifest
        .files
        .iter()
        .map(|(name, meta)| {
            let mut check = FileCheck {
                filename: name.clone(),
                ok: false,
                status: FileStatus::Error,
                expected_sha256: meta.sha256.clone(),
                actual_sha256: None,
                expected_size_bytes: meta.size_bytes,
                actual_size_bytes: None,
                error: None,
            };
            match fs::read(dir.join(name)) {
                Ok(content) => {
                    let actual = ContentDigest::of(&content);
                    check.ok = actual.matches(&meta.sha256, meta.size_bytes);
                    check.status = if check.ok {
                        FileStatus::Ok
                    } else {
                        FileStatus::Mismatch
                    };
                    check.actual_sha256 = Some(actual.sha256);
                    check.actual_size_bytes = Some(actual.size_bytes);
                }
                Err(e) => check.error = Some(e.to_string()),
            }
            if !check.ok {
                tracing::debug!(file = %name, status = ?check.status, "integrity check failed");
            }
            check
        })
        .collect();

    let ok = results.iter().all(|r| r.ok);
    Ok(VerifyReport {
        ok,
        manifest_path,
        title: manifest.title,
        generated_at: manifest.generated_at,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{ErrorCode, Manifest};
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn write_set(dir: &Path, files: &[(&str, &str)]) {
        let contents: BTreeMap<String, String> = files
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        for (name, content) in &contents {
            fs::write(dir.join(name), content).unwrap();
        }
        let manifest = Manifest::build("T", Utc::now(), &contents);
        fs::write(dir.join(MANIFEST_FILE), manifest.to_json_pretty().unwrap()).unwrap();
    }

    #[test]
    fn all_ok() {
        let tmp = tempdir().unwrap();
        write_set(tmp.path(), &[("a.md", "hello"), ("b.md", "héllo")]);
        let report = verify_dir(tmp.path()).unwrap();
        assert!(report.ok);
        assert_eq!(report.title, "T");
        let names: Vec<_> = report.results.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
        assert!(report.results.iter().all(|r| r.status == FileStatus::Ok));
    }

    #[test]
    fn size_change_is_mismatch() {
        let tmp = tempdir().unwrap();
        write_set(tmp.path(), &[("a.md", "hello")]);
        fs::write(tmp.path().join("a.md"), "hello\n").unwrap();
        let report = verify_dir(tmp.path()).unwrap();
        assert!(!report.ok);
        let r = &report.results[0];
        assert_eq!(r.status, FileStatus::Mismatch);
        assert_eq!(r.actual_size_bytes, Some(6));
        assert_eq!(r.expected_size_bytes, 5);
    }

    #[test]
    fn missing_file_is_error_not_abort() {
        let tmp = tempdir().unwrap();
        write_set(tmp.path(), &[("a.md", "x"), ("b.md", "y")]);
        fs::remove_file(tmp.path().join("a.md")).unwrap();
        let report = verify_dir(tmp.path()).unwrap();
        assert!(!report.ok);
        assert_eq!(report.results[0].status, FileStatus::Error);
        assert!(report.results[0].error.is_some());
        assert_eq!(report.results[1].status, FileStatus::Ok);
        assert_eq!(report.failed().count(), 1);
    }

    #[test]
    fn undecodable_bytes_are_compared_raw() {
        let tmp = tempdir().unwrap();
        write_set(tmp.path(), &[("a.md", "ok")]);
        fs::write(tmp.path().join("a.md"), [0x6f, 0xff]).unwrap();
        let report = verify_dir(tmp.path()).unwrap();
        assert_eq!(report.results[0].status, FileStatus::Mismatch);
        assert_eq!(report.results[0].actual_size_bytes, Some(2));
    }

    #[test]
    fn missing_manifest() {
        let tmp = tempdir().unwrap();
        let err = verify_dir(tmp.path()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ManifestMissing);
        assert!(!err.is_format_error());
    }

    #[test]
    fn empty_file_set_is_ok() {
        let tmp = tempdir().unwrap();
        write_set(tmp.path(), &[]);
        let report = verify_dir(tmp.path()).unwrap();
        assert!(report.ok);
        assert!(report.results.is_empty());
    }

    #[test]
    fn json_shape() {
        let tmp = tempdir().unwrap();
        write_set(tmp.path(), &[("a.md", "x")]);
        fs::remove_file(tmp.path().join("a.md")).unwrap();
        let report = verify_dir(tmp.path()).unwrap();
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["ok"], false);
        assert_eq!(v["results"][0]["status"], "error");
        assert!(v["results"][0].get("actual_sha256").is_none());
    }
}
