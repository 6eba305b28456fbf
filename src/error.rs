//! Error types for the carsheet library.

use std::io;
use thiserror::Error;

/// Result type alias for carsheet operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while normalizing a listing or rendering it.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error serializing or deserializing JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A scalar field contained characters outside the numeral-glyph table.
    #[error("Malformed numeric field: {0:?}")]
    MalformedNumeric(String),

    /// An image could not be opened or its dimensions read.
    ///
    /// This is recoverable per image: the caller skips the image and
    /// continues with the rest of the document.
    #[error("Image unavailable: {0}")]
    AssetUnavailable(String),

    /// A draw call was issued after finalization, or the composer was
    /// finalized twice. This signals a programming error, not a runtime
    /// condition the caller should retry.
    #[error("Layout engine misuse: {0}")]
    LayoutMisuse(&'static str),

    /// The lookup configuration could not be loaded.
    ///
    /// Fatal to the whole pass: no partial normalization is attempted
    /// without lookups.
    #[error("Configuration unavailable: {0}")]
    Configuration(String),

    /// A font file could not be read or parsed.
    #[error("Font unavailable: {0}")]
    FontUnavailable(String),

    /// Error assembling the output document.
    #[error("Rendering error: {0}")]
    Render(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MalformedNumeric("12x.3".to_string());
        assert_eq!(err.to_string(), "Malformed numeric field: \"12x.3\"");

        let err = Error::LayoutMisuse("finish called twice");
        assert_eq!(err.to_string(), "Layout engine misuse: finish called twice");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
