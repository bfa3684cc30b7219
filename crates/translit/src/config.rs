//! Configuration system for translit.
//!
//! Loads config from:
//! 1. Global: ~/.config/translit/config.toml
//! 2. Per-project: .translit/config.toml (overrides global)
//!
//! Command-line flags override both.
//!
//! Example config.toml:
//! ```toml
//! [run]
//! header_file = "LICENSE.header"
//! ignore_errors = false
//! emit_markers = true
//! marker_failure = "log"
//!
//! [output]
//! directory = "out/cs"
//! extension = "cs"
//!
//! [batch]
//! parallel = false
//! keep_going = true
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What to do when the marker store fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerFailurePolicy {
    /// Log the failure and keep going (default)
    #[default]
    Log,
    /// Fail the unit
    Fail,
}

/// Settings shared by every unit of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfiguration {
    /// Written verbatim before each rendered unit.
    pub header: String,
    /// Translate units even when the parser reported errors.
    pub ignore_errors: bool,
    /// Forward translation diagnostics to the marker store.
    pub emit_markers: bool,
    pub marker_failure: MarkerFailurePolicy,
}

impl RunConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn ignore_errors(mut self, ignore: bool) -> Self {
        self.ignore_errors = ignore;
        self
    }

    pub fn emit_markers(mut self, emit: bool) -> Self {
        self.emit_markers = emit;
        self
    }

    pub fn marker_failure(mut self, policy: MarkerFailurePolicy) -> Self {
        self.marker_failure = policy;
        self
    }
}

/// `[run]` section.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    /// Header text. Takes precedence over `header_file` set in the same
    /// layer; a layer that sets either one replaces both.
    pub header: Option<String>,
    /// File whose contents are used as the header, relative to the project root.
    pub header_file: Option<PathBuf>,
    pub ignore_errors: Option<bool>,
    pub emit_markers: Option<bool>,
    pub marker_failure: Option<MarkerFailurePolicy>,
}

/// `[output]` section.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Write one file per unit under this directory instead of stdout.
    pub directory: Option<PathBuf>,
    /// Extension for written files. Default: the renderer's.
    pub extension: Option<String>,
}

/// `[batch]` section.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    pub parallel: Option<bool>,
    /// Continue with the remaining units after one fails. Default: true
    pub keep_going: Option<bool>,
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslitConfig {
    pub run: RunConfig,
    pub output: OutputConfig,
    pub batch: BatchConfig,
}

impl TranslitConfig {
    /// Load configuration for a project.
    ///
    /// Loads global config from ~/.config/translit/config.toml,
    /// then merges with per-project config from .translit/config.toml.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::load_file(&global_path)? {
                config = config.merge(global);
            }
        }

        let project_path = root.join(".translit").join("config.toml");
        if let Some(project) = Self::load_file(&project_path)? {
            config = config.merge(project);
        }

        Ok(config)
    }

    /// Get the global config path.
    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("translit").join("config.toml"))
    }

    /// Load config from a file path. A missing file is not an error.
    pub fn load_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Merge another config into this one. Values set in `other` win.
    pub fn merge(self, other: Self) -> Self {
        let (header, header_file) =
            if other.run.header.is_some() || other.run.header_file.is_some() {
                (other.run.header, other.run.header_file)
            } else {
                (self.run.header, self.run.header_file)
            };
        Self {
            run: RunConfig {
                header,
                header_file,
                ignore_errors: other.run.ignore_errors.or(self.run.ignore_errors),
                emit_markers: other.run.emit_markers.or(self.run.emit_markers),
                marker_failure: other.run.marker_failure.or(self.run.marker_failure),
            },
            output: OutputConfig {
                directory: other.output.directory.or(self.output.directory),
                extension: other.output.extension.or(self.output.extension),
            },
            batch: BatchConfig {
                parallel: other.batch.parallel.or(self.batch.parallel),
                keep_going: other.batch.keep_going.or(self.batch.keep_going),
            },
        }
    }

    /// Resolve the `[run]` section into the immutable per-run settings.
    pub fn run_configuration(&self, root: &Path) -> Result<RunConfiguration, ConfigError> {
        let header = match (&self.run.header, &self.run.header_file) {
            (Some(header), _) => header.clone(),
            (None, Some(file)) => {
                let path = root.join(file);
                std::fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })?
            }
            (None, None) => String::new(),
        };
        Ok(RunConfiguration {
            header,
            ignore_errors: self.run.ignore_errors.unwrap_or(false),
            emit_markers: self.run.emit_markers.unwrap_or(false),
            marker_failure: self.run.marker_failure.unwrap_or_default(),
        })
    }

    pub fn parallel(&self) -> bool {
        self.batch.parallel.unwrap_or(false)
    }

    pub fn keep_going(&self) -> bool {
        self.batch.keep_going.unwrap_or(true)
    }
}
