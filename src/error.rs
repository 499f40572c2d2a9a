//! Error types for treecheck

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the identifier engine, settings loader and writers.
///
/// Entries that vanish mid-traversal are not represented here: the walker
/// logs and skips them.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The path is neither an existing file nor an existing directory.
    #[error("path is not a file nor a directory: {}", path.display())]
    InvalidPathKind { path: PathBuf },

    /// A regular expression failed to compile.
    #[error("invalid regular expression '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to parse configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CheckError>;
