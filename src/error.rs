//! Error types for unedgar library.

use std::io;
use thiserror::Error;

/// Result type alias for unedgar operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while processing a submission.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not an SGML-wrapped submission container.
    #[error("Unknown file format: not an SGML submission")]
    UnknownFormat,

    /// A requested embedded document (or section) is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uuencoded attachment could not be decoded.
    #[error("UUEncode error in {file}: {reason}")]
    Decode {
        /// Filename of the embedded document
        file: String,
        /// What went wrong
        reason: String,
    },

    /// An expected markup attribute is missing.
    #[error("Missing attribute: {0}")]
    MissingAttribute(String),

    /// A configured marker produced an invalid pattern.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Error raised by an asset renderer or content writer.
    #[error("Rendering error: {0}")]
    Render(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Check whether this error means "the requested thing does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotFound("file logo.jpg in the submission".to_string());
        assert_eq!(err.to_string(), "Not found: file logo.jpg in the submission");

        let err = Error::Decode {
            file: "chart.jpg".to_string(),
            reason: "missing \"begin\" line".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "UUEncode error in chart.jpg: missing \"begin\" line"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::NotFound("x".into()).is_not_found());
        assert!(!Error::MissingAttribute("src".into()).is_not_found());
    }
}
