use serde::Serialize;

/// Manifest error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorClass {
    /// Manifest file missing or unreadable.
    Precondition,
    /// Manifest present but not in the expected format.
    Contract,
    /// Manifest names a path outside the output directory.
    Security,
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Stable error codes for manifest failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    // Precondition
    ManifestMissing,
    ManifestIo,
    // Contract
    ManifestInvalidJson,
    ManifestSchema,
    ManifestSelfReference,
    SignatureNotSupported,
    // Security
    ManifestUnsafePath,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Typed manifest error with stable code.
#[derive(Debug, thiserror::Error)]
#[error("{class}: {message} ({code})")]
pub struct ManifestError {
    pub class: ErrorClass,
    pub code: ErrorCode,
    pub message: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl ManifestError {
    pub fn new(class: ErrorClass, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            class,
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.message = format!("{}: {}", context.into(), self.message);
        self
    }

    pub fn class(&self) -> ErrorClass {
        self.class
    }

    /// Format violations, as opposed to a missing or unreadable manifest.
    pub fn is_format_error(&self) -> bool {
        matches!(self.class, ErrorClass::Contract | ErrorClass::Security)
    }
}

impl From<std::io::Error> for ManifestError {
    fn from(err: std::io::Error) -> Self {
        let code = if err.kind() == std::io::ErrorKind::NotFound {
            ErrorCode::ManifestMissing
        } else {
            ErrorCode::ManifestIo
        };
        Self {
            class: ErrorClass::Precondition,
            code,
            message: err.to_string(),
            source: Some(err.into()),
        }
    }
}

// Syntax errors are InvalidJson, shape errors (missing field, wrong type) are Schema.
impl From<serde_json::Error> for ManifestError {
    fn from(err: serde_json::Error) -> Self {
        let code = match err.classify() {
            serde_json::error::Category::Data => ErrorCode::ManifestSchema,
            _ => ErrorCode::ManifestInvalidJson,
        };
        Self {
            class: ErrorClass::Contract,
            code,
            message: err.to_string(),
            source: Some(err.into()),
        }
    }
}
