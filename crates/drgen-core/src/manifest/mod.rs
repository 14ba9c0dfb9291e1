//! Integrity manifest (`manifest.json`).
//!
//! Contract:
//! - `files` lists every non-manifest output with its sha256 and byte size
//! - the manifest never lists itself
//! - `signature` is always `null` in this version
//!
//! # Example
//!
//! ```
//! use drgen_core::manifest::Manifest;
//! use std::collections::BTreeMap;
//!
//! let mut files = BTreeMap::new();
//! files.insert("a.md".to_string(), "hello".to_string());
//! let manifest = Manifest::build("Title", chrono::Utc::now(), &files);
//! assert_eq!(manifest.files["a.md"].size_bytes, 5);
//! assert!(manifest.signature().is_absent());
//! ```

mod errors;
mod parse;
mod signature;

pub use errors::{ErrorClass, ErrorCode, ManifestError};
pub use parse::parse_manifest;
pub use signature::Signature;

use crate::hash::ContentDigest;
use crate::layout::MANIFEST_FILE;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Digest entry for one output file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileMeta {
    /// Lowercase hex SHA-256 of the file bytes
    pub sha256: String,
    /// Size in bytes
    pub size_bytes: u64,
}

impl From<ContentDigest> for FileMeta {
    fn from(d: ContentDigest) -> Self {
        Self {
            sha256: d.sha256,
            size_bytes: d.size_bytes,
        }
    }
}

/// Manifest for one generated output directory.
///
/// Only [`Manifest::build`] and [`parse_manifest`] produce values; the
/// signature slot cannot be set by callers. Not `Deserialize`; JSON is only
/// read through [`parse_manifest`]:
///
/// ```compile_fail
/// let _: drgen_core::manifest::Manifest = serde_json::from_str("{}").unwrap();
/// ```
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Manifest {
    /// Build time, set once
    pub generated_at: DateTime<Utc>,
    /// Title of the subject record
    #[serde(rename = "dr_title")]
    pub title: String,
    /// Output file name -> digest
    pub files: BTreeMap<String, FileMeta>,
    signature: Signature,
}

impl Manifest {
    /// Hash every entry of `contents` (except the manifest itself).
    pub fn build<K, V>(
        title: impl Into<String>,
        generated_at: DateTime<Utc>,
        contents: &BTreeMap<K, V>,
    ) -> Self
    where
        K: AsRef<str>,
        V: AsRef<[u8]>,
    {
        let files = contents
            .iter()
            .filter(|(name, _)| name.as_ref() != MANIFEST_FILE)
            .map(|(name, content)| {
                (
                    name.as_ref().to_string(),
                    FileMeta::from(ContentDigest::of(content)),
                )
            })
            .collect();

        Self {
            generated_at,
            title: title.into(),
            files,
            signature: Signature::Absent,
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Pretty JSON as written to `manifest.json`.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
    }

    fn contents() -> BTreeMap<String, String> {
        let mut m = BTreeMap::new();
        m.insert("decision-record.md".to_string(), "# T\n".to_string());
        m.insert("summary.json".to_string(), "{}".to_string());
        m
    }

    #[test]
    fn lists_every_file_with_digest_and_size() {
        let m = Manifest::build("T", fixed_time(), &contents());
        assert_eq!(m.files.len(), 2);
        let rec = &m.files["decision-record.md"];
        assert_eq!(rec.size_bytes, 4);
        assert_eq!(rec.sha256, crate::hash::sha256_hex("# T\n"));
        assert_eq!(m.title, "T");
        assert!(m.signature().is_absent());
    }

    #[test]
    fn never_lists_itself() {
        let mut c = contents();
        c.insert(MANIFEST_FILE.to_string(), "{\"stale\":true}".to_string());
        let m = Manifest::build("T", fixed_time(), &c);
        assert!(!m.files.contains_key(MANIFEST_FILE));
        assert_eq!(m.files.len(), 2);
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let a = Manifest::build("T", fixed_time(), &contents());
        let b = Manifest::build("T", fixed_time(), &contents());
        assert_eq!(a.to_json_pretty().unwrap(), b.to_json_pretty().unwrap());
    }

    #[test]
    fn reparsed_manifest_writes_null_signature() {
        let m = Manifest::build("T", fixed_time(), &contents());
        let parsed = parse_manifest(m.to_json_pretty().unwrap().as_bytes()).unwrap();
        assert_eq!(parsed, m);

        let mut signed: serde_json::Value = serde_json::from_str(&m.to_json_pretty().unwrap()).unwrap();
        signed["signature"] = serde_json::json!("AQID");
        let err = parse_manifest(signed.to_string().as_bytes()).unwrap_err();
        assert_eq!(err.code, ErrorCode::SignatureNotSupported);

        let out: serde_json::Value = serde_json::from_str(&parsed.to_json_pretty().unwrap()).unwrap();
        assert!(out["signature"].is_null());
    }

    #[test]
    fn serialized_shape() {
        let m = Manifest::build("Use Postgres", fixed_time(), &contents());
        let v: serde_json::Value = serde_json::from_str(&m.to_json_pretty().unwrap()).unwrap();
        assert_eq!(v["dr_title"], "Use Postgres");
        let ts = v["generated_at"].as_str().unwrap();
        assert_eq!(
            DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc),
            fixed_time()
        );
        assert!(v["signature"].is_null());
        assert_eq!(v["files"]["summary.json"]["size_bytes"], 2);
        assert!(v.get("title").is_none());
    }
}
