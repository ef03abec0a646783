//! Error types for sitewarden-fs

use std::path::PathBuf;

/// Result type for sitewarden-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sitewarden-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Failed to change {what} of {path}: {source}")]
    Mutation {
        path: PathBuf,
        what: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Identity database lookup for '{name}' failed: {source}")]
    IdentityLookup {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn mutation(path: impl Into<PathBuf>, what: &'static str, source: std::io::Error) -> Self {
        Self::Mutation {
            path: path.into(),
            what,
            source,
        }
    }
}
