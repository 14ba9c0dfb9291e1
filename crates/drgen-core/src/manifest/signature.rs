//! Reserved signature slot.
//!
//! Serialized form: `null` for [`Signature::Absent`], a base64 string for
//! [`Signature::Present`]. This version only ever writes `Absent` and the
//! verifier rejects anything else.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Signature {
    /// No signature. The only accepted value.
    #[default]
    Absent,
    /// Raw signature bytes from a future signing format.
    Present(Vec<u8>),
}

impl Signature {
    pub fn is_absent(&self) -> bool {
        matches!(self, Signature::Absent)
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Signature::Absent => serializer.serialize_none(),
            Signature::Present(bytes) => serializer.serialize_str(&BASE64.encode(bytes)),
        }
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Through Value so a missing key errors instead of defaulting to Absent.
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Null => Ok(Signature::Absent),
            serde_json::Value::String(s) => BASE64
                .decode(s.as_bytes())
                .map(Signature::Present)
                .map_err(|e| de::Error::custom(format!("signature is not valid base64: {e}"))),
            other => Err(de::Error::custom(format!(
                "signature must be null or a base64 string, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[allow(dead_code)]
        signature: Signature,
    }

    #[test]
    fn absent_is_null() {
        assert_eq!(serde_json::to_string(&Signature::Absent).unwrap(), "null");
        let s: Signature = serde_json::from_str("null").unwrap();
        assert!(s.is_absent());
    }

    #[test]
    fn present_is_base64() {
        let s: Signature = serde_json::from_str("\"AQID\"").unwrap();
        assert_eq!(s, Signature::Present(vec![1, 2, 3]));
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"AQID\"");
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = serde_json::from_str::<Holder>("{}").unwrap_err();
        assert!(err.to_string().contains("signature"), "{err}");
    }

    #[test]
    fn non_string_values_rejected() {
        assert!(serde_json::from_str::<Signature>("42").is_err());
        assert!(serde_json::from_str::<Signature>("{}").is_err());
        assert!(serde_json::from_str::<Signature>("\"not base64!\"").is_err());
    }
}
