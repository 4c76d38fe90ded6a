//! Error types for folio library.
//!
//! Extractors never fail: a missing match is an empty or absent result. Errors only
//! come from the edges of the pipeline (reading page files, loading the book
//! configuration, writing records).

use std::io;
use thiserror::Error;

/// Result type alias for folio operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for folio library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The book configuration is inconsistent (e.g. an inverted page range).
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Reading the input of a single page failed.
    #[error("Failed to read page {page}: {source}")]
    PageRead {
        page: u32,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Returns the page number this error is tied to, if any.
    pub fn page(&self) -> Option<u32> {
        match self {
            Error::PageRead { page, .. } => Some(*page),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_read_display() {
        let err = Error::PageRead {
            page: 42,
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.page(), Some(42));
        assert!(err.to_string().contains("page 42"));
    }

    #[test]
    fn test_io_conversion() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.page(), None);
    }
}
