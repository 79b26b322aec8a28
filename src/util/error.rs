//! Error types for the luxtest library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for layer operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed layer text.
    #[error("Syntax error at line {line}: {context}")]
    Syntax { line: usize, context: String },

    /// Attribute type token outside the recognized set.
    #[error("Unknown attribute type '{type_name}' at line {line}")]
    UnknownType { line: usize, type_name: String },

    /// Value does not conform to the declared type.
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Two samples share a time code.
    #[error("Duplicate time code: {0}")]
    DuplicateTimeCode(f64),

    /// Sampled attribute built from zero samples.
    #[error("Time sample set is empty")]
    EmptySampleSet,

    /// Attribute has neither samples nor a default value.
    #[error("Attribute has no value to resolve: {0}")]
    UnresolvedAttribute(String),

    /// Time code is NaN.
    #[error("Invalid time code: {0}")]
    InvalidTimeCode(f64),

    /// Malformed prim or property path.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Prim not found by path.
    #[error("Prim not found: {0}")]
    PrimNotFound(String),

    /// Property not found on a prim.
    #[error("Property '{property}' not found on {prim}")]
    PropertyNotFound { prim: String, property: String },

    /// Override cannot be applied.
    #[error("Invalid override: {0}")]
    InvalidOverride(String),

    /// Frame range string or bounds are invalid.
    #[error("Invalid frame range: {0}")]
    InvalidFrameRange(String),

    /// Gap insertion landed inside a changing value.
    #[error("Cannot insert gap at frame {frame}: {attribute} is animating")]
    AnimationInProgress { frame: f64, attribute: String },

    /// Same light name found twice while describing layers.
    #[error("Light name appeared twice: {0}")]
    DuplicateLight(String),

    /// Error raised while handling a specific file.
    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create a syntax error at the given line.
    pub fn syntax(line: usize, context: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            context: context.into(),
        }
    }

    /// Create a type mismatch error.
    pub fn mismatch(expected: impl ToString, actual: impl ToString) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Attach the file this error came from.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            // keep the innermost path
            Self::InFile { .. } => self,
            other => Self::InFile {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }

    /// Strip any file wrapper and return the underlying error.
    pub fn root(&self) -> &Error {
        match self {
            Self::InFile { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for luxtest operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::syntax(12, "expected '{'");
        assert!(e.to_string().contains("12"));
        assert!(e.to_string().contains("expected '{'"));

        let e = Error::mismatch("double", "string");
        assert_eq!(e.to_string(), "Type mismatch: expected double, got string");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_in_file_keeps_inner_path() {
        let err = Error::EmptySampleSet.in_file("a.usda").in_file("b.usda");
        match &err {
            Error::InFile { path, .. } => assert_eq!(path, &PathBuf::from("a.usda")),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(err.root(), Error::EmptySampleSet));
        assert!(err.to_string().starts_with("a.usda"));
    }
}
