use super::errors::{ErrorClass, ErrorCode, ManifestError};
use super::{FileMeta, Manifest, Signature};
use crate::hash::is_sha256_hex;
use crate::layout::{check_file_name, MANIFEST_FILE};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

const REQUIRED_FIELDS: &[&str] = &["generated_at", "dr_title", "files", "signature"];

/// On-disk shape; the signature is checked on the raw value and never read.
#[derive(Deserialize)]
struct ManifestDoc {
    generated_at: DateTime<Utc>,
    dr_title: String,
    files: BTreeMap<String, FileMeta>,
}

/// Parse and validate `manifest.json` bytes.
///
/// # Checks Performed
///
/// 1. **JSON**: well-formed, top-level object
/// 2. **Fields**: `generated_at`, `dr_title`, `files`, `signature` all present
/// 3. **Signature**: must be `null`; anything else is an untrusted or
///    future-format manifest
/// 4. **Schema**: `files` is an object of `{sha256: string, size_bytes: int}`
/// 5. **Digests**: every `sha256` is 64 lowercase hex chars
/// 6. **Paths**: every file name is a plain name inside the directory
/// 7. **Self reference**: the manifest does not list itself
pub fn parse_manifest(bytes: &[u8]) -> Result<Manifest, ManifestError> {
    let value: serde_json::Value = serde_json::from_slice(bytes).map_err(|e| {
        let mut me = ManifestError::from(e);
        me.code = ErrorCode::ManifestInvalidJson;
        me
    })?;

    let obj = value.as_object().ok_or_else(|| {
        ManifestError::new(
            ErrorClass::Contract,
            ErrorCode::ManifestSchema,
            "manifest must be a JSON object",
        )
    })?;

    for field in REQUIRED_FIELDS {
        if !obj.contains_key(*field) {
            return Err(ManifestError::new(
                ErrorClass::Contract,
                ErrorCode::ManifestSchema,
                format!("missing required field '{}'", field),
            ));
        }
    }

    if !obj["signature"].is_null() {
        return Err(ManifestError::new(
            ErrorClass::Contract,
            ErrorCode::SignatureNotSupported,
            "signature must be null (signed manifests are not supported)",
        ));
    }

    if !obj["files"].is_object() {
        return Err(ManifestError::new(
            ErrorClass::Contract,
            ErrorCode::ManifestSchema,
            "'files' must be an object",
        ));
    }

    let doc: ManifestDoc =
        serde_json::from_value(value).map_err(|e| ManifestError::from(e).with_context("schema"))?;
    let manifest = Manifest {
        generated_at: doc.generated_at,
        title: doc.dr_title,
        files: doc.files,
        signature: Signature::Absent,
    };

    for (name, meta) in &manifest.files {
        if let Err(reason) = check_file_name(name) {
            return Err(ManifestError::new(
                ErrorClass::Security,
                ErrorCode::ManifestUnsafePath,
                format!("unsafe file name '{}': {}", name, reason),
            ));
        }
        if name == MANIFEST_FILE {
            return Err(ManifestError::new(
                ErrorClass::Contract,
                ErrorCode::ManifestSelfReference,
                format!("manifest must not list '{}'", MANIFEST_FILE),
            ));
        }
        if !is_sha256_hex(&meta.sha256) {
            return Err(ManifestError::new(
                ErrorClass::Contract,
                ErrorCode::ManifestSchema,
                format!("files.{}: sha256 must be 64 lowercase hex chars", name),
            ));
        }
    }

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256_hex;
    use serde_json::json;

    fn valid() -> serde_json::Value {
        json!({
            "generated_at": "2026-01-02T03:04:05.000Z",
            "dr_title": "T",
            "files": {
                "a.md": { "sha256": sha256_hex("hello"), "size_bytes": 5 }
            },
            "signature": null
        })
    }

    fn parse(v: &serde_json::Value) -> Result<Manifest, ManifestError> {
        parse_manifest(v.to_string().as_bytes())
    }

    fn code_of(v: &serde_json::Value) -> ErrorCode {
        parse(v).unwrap_err().code
    }

    #[test]
    fn accepts_valid_manifest() {
        let m = parse(&valid()).unwrap();
        assert_eq!(m.title, "T");
        assert_eq!(m.files["a.md"].size_bytes, 5);
        assert!(m.signature().is_absent());
    }

    #[test]
    fn ignores_unknown_top_level_fields() {
        let mut v = valid();
        v["x-note"] = json!("extra");
        assert!(parse(&v).is_ok());
    }

    #[test]
    fn rejects_invalid_json() {
        let err = parse_manifest(b"{ not json").unwrap_err();
        assert_eq!(err.code, ErrorCode::ManifestInvalidJson);
        assert!(err.is_format_error());
    }

    #[test]
    fn rejects_non_object() {
        assert_eq!(code_of(&json!([1, 2])), ErrorCode::ManifestSchema);
    }

    #[test]
    fn rejects_each_missing_field() {
        for field in REQUIRED_FIELDS {
            let mut v = valid();
            v.as_object_mut().unwrap().remove(*field);
            assert_eq!(code_of(&v), ErrorCode::ManifestSchema, "field {field}");
        }
    }

    #[test]
    fn rejects_present_signature() {
        for sig in [json!("AQID"), json!({"alg": "ed25519"}), json!(false), json!("")] {
            let mut v = valid();
            v["signature"] = sig;
            let err = parse(&v).unwrap_err();
            assert_eq!(err.code, ErrorCode::SignatureNotSupported);
            assert!(err.is_format_error());
        }
    }

    #[test]
    fn rejects_non_object_files() {
        for files in [json!([]), json!("a.md"), json!(null), json!(1)] {
            let mut v = valid();
            v["files"] = files;
            assert_eq!(code_of(&v), ErrorCode::ManifestSchema);
        }
    }

    #[test]
    fn rejects_bad_entries() {
        let mut v = valid();
        v["files"]["a.md"]["size_bytes"] = json!("5");
        assert_eq!(code_of(&v), ErrorCode::ManifestSchema);

        let mut v = valid();
        v["files"]["a.md"]["sha256"] = json!("ABC");
        assert_eq!(code_of(&v), ErrorCode::ManifestSchema);

        let mut v = valid();
        v["files"]["a.md"] = json!("deadbeef");
        assert_eq!(code_of(&v), ErrorCode::ManifestSchema);
    }

    #[test]
    fn rejects_bad_timestamp_and_title() {
        let mut v = valid();
        v["generated_at"] = json!("yesterday");
        assert_eq!(code_of(&v), ErrorCode::ManifestSchema);

        let mut v = valid();
        v["dr_title"] = json!(7);
        assert_eq!(code_of(&v), ErrorCode::ManifestSchema);
    }

    #[test]
    fn rejects_traversal_and_self_reference() {
        let entry = json!({ "sha256": sha256_hex("x"), "size_bytes": 1 });

        let mut v = valid();
        v["files"]["../outside.md"] = entry.clone();
        let err = parse(&v).unwrap_err();
        assert_eq!(err.code, ErrorCode::ManifestUnsafePath);
        assert_eq!(err.class(), ErrorClass::Security);

        let mut v = valid();
        v["files"][MANIFEST_FILE] = entry;
        assert_eq!(code_of(&v), ErrorCode::ManifestSelfReference);
    }
}
