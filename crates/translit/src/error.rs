//! Error types for the translation pipeline.

use std::path::PathBuf;

/// A second binding was attempted for an already bound identity.
///
/// This is a sequencing bug, never a property of the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("symbol '{identity}' is already bound to '{existing}' (attempted '{attempted}')")]
    Duplicate {
        identity: String,
        existing: String,
        attempted: String,
    },
}

/// Failure of the marker-persistence collaborator.
#[derive(Debug, thiserror::Error)]
pub enum MarkerError {
    #[error("marker store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("marker store {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failure processing one unit.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The unit had parse errors and errors are not being ignored.
    #[error("'{}' has errors, check stderr for details", path.display())]
    Aborted { path: PathBuf, errors: usize },

    /// Internal inconsistency; the run must stop.
    #[error("internal error: {0}")]
    Internal(#[from] BindError),

    /// Writing the unit's output failed.
    #[error("failed to write output for '{}': {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Marker persistence failed under the `fail` policy.
    #[error(transparent)]
    Markers(#[from] MarkerError),
}

impl PipelineError {
    /// Whether this error must stop the whole run rather than just the unit.
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(self, PipelineError::Internal(_))
    }
}
