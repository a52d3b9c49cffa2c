//! Error types for dumping and restoring repositories.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors. Per-file problems never surface here; they are recorded
/// as [`Diagnostics`](crate::Diagnostics) and the run continues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Repository path '{}' not found or not a directory", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Input dump file '{}' not found", .0.display())]
    InputNotFound(PathBuf),

    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Restore into '{}' cancelled", .0.display())]
    Cancelled(PathBuf),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
