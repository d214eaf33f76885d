use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for shuffler operations
pub type Result<T> = std::result::Result<T, ShuffleError>;

/// Errors that can occur while shuffling metadata
#[derive(Error, Debug)]
pub enum ShuffleError {
    /// A required option is missing or malformed
    #[error("{0}")]
    Configuration(String),

    /// The input file or the output's containing folder does not exist
    #[error("{0}")]
    NotFound(String),

    /// Input content is not JSON, or not a JSON array
    #[error("{0}")]
    Parse(String),

    /// IO error on a specific file or folder
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize output
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ShuffleError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an IO error for `path`
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Stable machine-readable code for reports.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::NotFound(_) => "not_found",
            Self::Parse(_) => "parse",
            Self::Io { .. } => "io",
            Self::Serialize(_) => "serialize",
        }
    }
}
