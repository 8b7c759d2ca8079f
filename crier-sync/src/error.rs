//! Error types for crier-sync.

use std::path::PathBuf;

use thiserror::Error;

use crier_core::RegistryError;

/// All errors that can arise from reconciliation and batch operations.
///
/// Platform call failures are not errors here; they are recorded in the
/// registry and reported per item. These variants abort a batch.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the registry store.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A content file whose front matter could not be parsed.
    #[error("invalid front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
