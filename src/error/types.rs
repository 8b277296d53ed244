use std::path::PathBuf;

use thiserror::Error;

use crate::logging::LoggingError;

/// Unified result type for the gridnote crate.
pub type Result<T> = std::result::Result<T, GridnoteError>;

/// Errors surfaced by reconciliation and its collaborators.
///
/// Layout geometry problems are reported as [`crate::layout::Violation`] data,
/// never through this type.
#[derive(Debug, Error)]
pub enum GridnoteError {
    #[error("layout `{0}` not found")]
    LayoutNotFound(String),
    #[error("document `{path}` does not declare a layout")]
    MissingLayoutField { path: PathBuf },
    #[error("layout `{layout}` has duplicate sections: {}", names.join(", "))]
    DuplicateSections { layout: String, names: Vec<String> },
    #[error("I/O failure on `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("document store failure on `{path}`: {message}")]
    Store { path: PathBuf, message: String },
    #[error("document `{path}` changed since it was read")]
    WriteConflict { path: PathBuf },
    #[error("invalid layout definitions: {0}")]
    Definitions(#[from] serde_json::Error),
    #[error(transparent)]
    Logging(#[from] LoggingError),
}

impl GridnoteError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the `IOFailure` family: read/write problems of the store.
    pub fn is_io_failure(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Store { .. })
    }
}
