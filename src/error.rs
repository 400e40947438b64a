//! Error types for toolbuilder.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, ToolbuilderError>;

/// Errors that can occur while composing, sending or solving prompts.
#[derive(Error, Debug)]
pub enum ToolbuilderError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The prompt template is missing or unreadable.
    #[error("Failed to load prompt template '{path}': {source}")]
    TemplateLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The chat completion response lacks `choices[0].message.content`.
    #[error("Unexpected response format: {raw}")]
    MalformedResponse { raw: String },

    /// Network, auth or quota failure reported by the remote API.
    #[error("Remote service error: {0}")]
    RemoteService(String),

    /// Configuration file or value error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A scaffold entry would be written outside the output root.
    #[error("Refusing to write '{0}' outside the output directory")]
    InvalidScaffoldPath(PathBuf),
}

impl ToolbuilderError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a template load error with path context.
    pub fn template(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::TemplateLoad {
            path: path.into(),
            source,
        }
    }

    /// Create a malformed response error carrying the raw payload.
    pub fn malformed(raw: impl Into<String>) -> Self {
        Self::MalformedResponse { raw: raw.into() }
    }
}

impl From<reqwest::Error> for ToolbuilderError {
    fn from(err: reqwest::Error) -> Self {
        ToolbuilderError::RemoteService(err.to_string())
    }
}
