//! Content digests for output files.
//!
//! Digests are computed over the exact bytes written to disk. Text content is
//! hashed as its UTF-8 encoding, which is also what the writer persists, so a
//! digest taken before a commit and one taken after reading the file back are
//! directly comparable.

use sha2::{Digest, Sha256};

/// SHA-256 digest and byte length of one piece of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDigest {
    /// Lowercase hex SHA-256 (64 chars, no prefix).
    pub sha256: String,
    /// Length in bytes of the hashed content.
    pub size_bytes: u64,
}

impl ContentDigest {
    pub fn of(content: impl AsRef<[u8]>) -> Self {
        let bytes = content.as_ref();
        Self {
            sha256: sha256_hex(bytes),
            size_bytes: byte_len(bytes),
        }
    }

    /// True when both digest and size match `other`.
    pub fn matches(&self, sha256: &str, size_bytes: u64) -> bool {
        self.sha256 == sha256 && self.size_bytes == size_bytes
    }
}

/// Lowercase hex SHA-256 of `content`.
pub fn sha256_hex(content: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(content.as_ref()))
}

pub fn byte_len(content: impl AsRef<[u8]>) -> u64 {
    content.as_ref().len() as u64
}

/// Whether `value` has the shape of a digest produced by [`sha256_hex`].
pub fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector() {
        assert_eq!(
            sha256_hex("hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(byte_len("hello"), 5);
    }

    #[test]
    fn text_and_bytes_agree() {
        let text = "Entscheidung: 決定 ✅";
        let from_text = ContentDigest::of(text);
        let from_bytes = ContentDigest::of(text.as_bytes().to_vec());
        assert_eq!(from_text, from_bytes);
        // multi-byte characters count by encoded length
        assert_eq!(from_text.size_bytes, text.len() as u64);
        assert!(from_text.size_bytes > text.chars().count() as u64);
    }

    #[test]
    fn empty_content() {
        let d = ContentDigest::of("");
        assert_eq!(
            d.sha256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(d.size_bytes, 0);
    }

    #[test]
    fn digest_shape_check() {
        assert!(is_sha256_hex(&sha256_hex("x")));
        assert!(!is_sha256_hex("abc"));
        assert!(!is_sha256_hex(&sha256_hex("x").to_uppercase()));
        assert!(!is_sha256_hex(&format!("sha256:{}", &sha256_hex("x")[7..])));
    }

    #[test]
    fn matches_requires_both_fields() {
        let d = ContentDigest::of("abc");
        assert!(d.matches(&d.sha256, 3));
        assert!(!d.matches(&d.sha256, 4));
        assert!(!d.matches(&sha256_hex("abd"), 3));
    }
}
