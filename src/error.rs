//! Fatal load errors
//!
//! Anything that prevents a package from being read at all. Content problems
//! are never errors; they are reported as findings.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("package not found: {path} ({reason})")]
    PackageNotFound { path: PathBuf, reason: String },

    #[error("{path}:{line}:{column}: invalid front matter: {message}")]
    ManifestParse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// Stable wire name used in error responses.
    pub fn error_type(&self) -> &'static str {
        match self {
            LoadError::PackageNotFound { .. } => "PackageNotFoundError",
            LoadError::ManifestParse { .. } => "ManifestParseError",
            LoadError::Io { .. } => "IoError",
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }
}
