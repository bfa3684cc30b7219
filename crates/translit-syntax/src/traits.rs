//! Traits for front-ends and renderers.

use crate::source::SourceUnit;
use crate::target::TargetUnit;
use std::path::Path;

/// Error that can occur when reading a unit from a front-end.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed unit {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported input: {0}")]
    Unsupported(String),
}

/// A front-end produces parsed [`SourceUnit`]s.
pub trait FrontEnd: Send + Sync {
    /// Front-end identifier (e.g., "json").
    fn name(&self) -> &'static str;

    /// File extensions this front-end handles.
    fn extensions(&self) -> &'static [&'static str];

    /// Parse `input`, read from `path`, into a unit.
    fn read(&self, path: &Path, input: &str) -> Result<SourceUnit, ReadError>;
}

/// A renderer prints a [`TargetUnit`] as target-language text.
///
/// Rendering is a pure function of its inputs.
pub trait Renderer: Send + Sync {
    /// Language identifier (e.g., "csharp").
    fn language(&self) -> &'static str;

    /// File extension for output (e.g., "cs").
    fn extension(&self) -> &'static str;

    /// Print `header` verbatim followed by the unit.
    fn render(&self, header: &str, unit: &TargetUnit) -> String;
}
