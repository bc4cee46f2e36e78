//! Error types for evalview operations.
//!
//! The prediction parsers and matrix builders never fail: malformed rows and
//! unparseable numbers are absorbed where they occur. Errors only come from
//! the surfaces around them (fetching, configuration, rendering, file IO).

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in evalview operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    /// Invalid dimensions for framebuffer or plot.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Empty data provided where non-empty is required.
    #[error("Empty data provided")]
    EmptyData,

    /// A remote resource could not be loaded.
    #[error("could not load {url}: {message}")]
    Fetch {
        /// The URL that was requested.
        url: String,
        /// Transport or status description.
        message: String,
    },

    /// A response body exceeded the configured size limit.
    #[error("response from {url} exceeded {limit} bytes")]
    ResponseTooLarge {
        /// The URL that was requested.
        url: String,
        /// Configured byte limit.
        limit: usize,
    },

    /// JSON payload could not be decoded.
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration parsing error with line number.
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(String),
}

impl Error {
    /// Build a [`Error::Fetch`] from a URL and any displayable cause.
    pub(crate) fn fetch(url: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Fetch { url: url.into(), message: message.to_string() }
    }
}
