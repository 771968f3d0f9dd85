//! Error types for patchrun-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading project configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, annotated with the file involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The `.references` file did not exist at the expected path.
    #[error("references file not found at {path}")]
    ReferencesNotFound { path: PathBuf },

    /// A required key was absent (or had an empty value) in `.references`.
    #[error("missing required key '{key}' in {path}")]
    MissingReference { key: &'static str, path: PathBuf },
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
