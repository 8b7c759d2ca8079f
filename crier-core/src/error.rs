//! Error types for crier-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from registry operations.
///
/// Absence (unknown article, unknown platform) is never an error; it is
/// reported through `bool` / `Option` returns. These variants mean the store
/// itself is unusable.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Underlying I/O failure, annotated with the path involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load; includes file path and line context from serde_yaml.
    #[error("failed to parse registry at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The registry declares a schema version this build does not understand.
    #[error("unsupported registry version {found} in {path} (expected {expected})")]
    UnsupportedVersion {
        path: PathBuf,
        found: String,
        expected: u32,
    },
}

/// Convenience constructor for [`RegistryError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RegistryError {
    RegistryError::Io {
        path: path.into(),
        source,
    }
}
