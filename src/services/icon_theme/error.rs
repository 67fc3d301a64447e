//! Error types for the icon theme engine

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for icon theme operations
pub type Result<T> = std::result::Result<T, IconThemeError>;

/// Errors raised inside the engine.
///
/// None of these reach callers of the public resolution surface; they are logged and
/// degraded to an empty theme or a fallback icon.
#[derive(Error, Debug)]
pub enum IconThemeError {
    /// No installed package declares the requested theme id
    #[error("Icon theme not found: {0}")]
    ThemeNotFound(String),

    /// The descriptor file exists but is not a valid theme document
    #[error("Malformed icon theme descriptor {path:?}: {source}")]
    MalformedDescriptor {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Engine configuration file could not be parsed
    #[error("Invalid icon engine configuration {path:?}: {source}")]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A resolved definition points at an asset that is missing or unreadable
    #[error("Icon asset unreadable {path:?}: {source}")]
    AssetUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Nothing in the theme matched the file, including the generic default
    #[error("No icon matched: {0}")]
    NoMatch(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Async runtime error
    #[error("Async runtime error: {0}")]
    RuntimeError(String),
}

impl IconThemeError {
    /// Short category name used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            IconThemeError::ThemeNotFound(_) => "theme-not-found",
            IconThemeError::MalformedDescriptor { .. } => "malformed-descriptor",
            IconThemeError::InvalidConfig { .. } => "invalid-config",
            IconThemeError::AssetUnreadable { .. } => "asset-unreadable",
            IconThemeError::NoMatch(_) => "no-match",
            IconThemeError::Io(_) => "io",
            IconThemeError::RuntimeError(_) => "runtime",
        }
    }
}

impl From<tokio::task::JoinError> for IconThemeError {
    fn from(err: tokio::task::JoinError) -> Self {
        IconThemeError::RuntimeError(err.to_string())
    }
}
