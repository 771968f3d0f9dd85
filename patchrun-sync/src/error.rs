//! Error types for patchrun-sync.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a migration run.
///
/// A failing `dsl apply` is not an error: it is recorded in the report and
/// the run continues. A failing `dsl sync` is reported through
/// [`SyncOutcome::Failed`](crate::SyncOutcome::Failed).
#[derive(Debug, Error)]
pub enum SyncError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("patch directory not found: {path}")]
    PatchNotFound { path: PathBuf },

    #[error("no .yaml specs found in {path}")]
    NoSpecs { path: PathBuf },

    /// `--strict-order` found root-level specs without a numeric prefix.
    #[error("root-level specs must start with a numeric prefix: {}", .names.join(", "))]
    UnorderedSpecs { names: Vec<String> },

    /// The tool binary could not be started at all.
    #[error("failed to start {binary}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
