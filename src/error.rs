//! Error types for paperblocks.

use std::io;
use thiserror::Error;

/// Result type alias for paperblocks operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while ingesting, configuring or rendering.
///
/// The structuring pipeline itself never fails: malformed pages contribute
/// nothing and ambiguous paragraphs fall back to a default type.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Page records could not be decoded.
    #[error("Invalid page input: {0}")]
    InvalidInput(String),

    /// A configuration value is out of range or unparsable.
    #[error("Invalid configuration: {name}={value} ({reason})")]
    InvalidConfig {
        /// Setting name (e.g. `PDF_MAX_PAGES`)
        name: String,
        /// The rejected value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// Error during rendering (Markdown, JSON, Notion payloads).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn config(
        name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidConfig {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidInput(format!(
            "{} (line {}, column {})",
            err,
            err.line(),
            err.column()
        ))
    }
}
