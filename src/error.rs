//! Error types for idspec
//!
//! Only structural failures surface as errors: a document that does not
//! conform to the IDS schema, an export that cannot be shaped, resource
//! limits and I/O. Evaluation never fails; a type mismatch or a broken
//! pattern simply does not satisfy a constraint.

use std::fmt;
use thiserror::Error;

/// Result type alias using the idspec Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for idspec operations
#[derive(Error, Debug)]
pub enum Error {
    /// The external XML does not conform to the IDS schema
    #[error("schema violation: {0}")]
    SchemaViolation(#[from] SchemaViolation),

    /// The container cannot be exported (e.g. it holds no group)
    #[error("unsupported export shape: {0}")]
    UnsupportedExportShape(String),

    /// Malformed XML (not well-formed, bad encoding)
    #[error("XML error: {0}")]
    Xml(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persistence document could not be read or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Zip package could not be read or written
    #[error("package error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// Invalid value in an authoring call
    #[error("value error: {0}")]
    Value(String),
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Error::Xml(e.to_string())
    }
}

/// Conformance failure of an imported document, with the node it was found on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Error message
    pub message: String,
    /// Slash separated path of the offending element
    pub path: Option<String>,
    /// Additional explanation
    pub reason: Option<String>,
}

impl SchemaViolation {
    /// Create a new schema violation
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            reason: None,
        }
    }

    /// Set the path where the violation was found
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref path) = self.path {
            write!(f, " (at {})", path)?;
        }

        if let Some(ref reason) = self.reason {
            write!(f, ": {}", reason)?;
        }

        Ok(())
    }
}

impl std::error::Error for SchemaViolation {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_violation_display() {
        let err = SchemaViolation::new("unexpected element 'foo'")
            .with_path("/ids/specifications/specification[1]")
            .with_reason("allowed: applicability, requirements");

        let msg = format!("{}", err);
        assert!(msg.contains("unexpected element 'foo'"));
        assert!(msg.contains("/ids/specifications/specification[1]"));
        assert!(msg.contains("allowed: applicability"));
    }

    #[test]
    fn test_error_conversion() {
        let violation = SchemaViolation::new("test");
        let err: Error = violation.into();
        assert!(matches!(err, Error::SchemaViolation(_)));
    }
}
