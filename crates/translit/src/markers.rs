//! Marker persistence.
//!
//! Markers are the persisted form of translation diagnostics, keyed by the
//! unit they belong to. A store only needs two operations: drop every marker
//! of a unit, and add one. [`NoopMarkers`] backs runs without marker
//! emission, [`MemoryMarkers`] backs tests and embedders, and
//! [`FileMarkers`] keeps them in a JSON document on disk.

use crate::error::MarkerError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;
use translit_syntax::{Problem, Severity};

/// A persisted diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub message: String,
    pub severity: Severity,
    pub char_start: usize,
    pub char_end: usize,
    pub line: u32,
    /// Only meaningful for the run that produced it.
    #[serde(default)]
    pub transient: bool,
}

impl From<&Problem> for Marker {
    fn from(problem: &Problem) -> Self {
        Self {
            message: problem.message.clone(),
            severity: problem.severity,
            char_start: problem.start,
            char_end: problem.end,
            line: problem.line,
            transient: true,
        }
    }
}

/// Markers of every unit, keyed by unit path.
pub type MarkerMap = BTreeMap<PathBuf, Vec<Marker>>;

/// Storage for markers.
pub trait MarkerStore: Send + Sync {
    /// Remove all markers of `unit`.
    fn clear_markers(&self, unit: &Path) -> Result<(), MarkerError>;

    /// Attach `marker` to `unit`.
    fn add_marker(&self, unit: &Path, marker: Marker) -> Result<(), MarkerError>;
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMarkers;

impl MarkerStore for NoopMarkers {
    fn clear_markers(&self, _unit: &Path) -> Result<(), MarkerError> {
        Ok(())
    }

    fn add_marker(&self, _unit: &Path, _marker: Marker) -> Result<(), MarkerError> {
        Ok(())
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryMarkers {
    markers: Mutex<MarkerMap>,
}

impl MemoryMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markers currently attached to `unit`.
    pub fn markers(&self, unit: &Path) -> Vec<Marker> {
        self.markers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(unit)
            .cloned()
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> MarkerMap {
        self.markers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MarkerStore for MemoryMarkers {
    fn clear_markers(&self, unit: &Path) -> Result<(), MarkerError> {
        self.markers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(unit);
        Ok(())
    }

    fn add_marker(&self, unit: &Path, marker: Marker) -> Result<(), MarkerError> {
        self.markers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(unit.to_path_buf())
            .or_default()
            .push(marker);
        Ok(())
    }
}

/// JSON-file store. Every change is written through to disk.
#[derive(Debug)]
pub struct FileMarkers {
    path: PathBuf,
    markers: Mutex<MarkerMap>,
}

impl FileMarkers {
    /// Open the store at `path`, loading existing markers if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, MarkerError> {
        let path = path.into();
        let markers = if path.exists() {
            Self::load(&path)?
        } else {
            MarkerMap::new()
        };
        Ok(Self {
            path,
            markers: Mutex::new(markers),
        })
    }

    /// Read the markers stored at `path`.
    pub fn load(path: &Path) -> Result<MarkerMap, MarkerError> {
        let content = std::fs::read_to_string(path).map_err(|source| MarkerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| MarkerError::Encode {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, markers: &MarkerMap) -> Result<(), MarkerError> {
        let io_err = |source| MarkerError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(markers).map_err(|source| MarkerError::Encode {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, json).map_err(io_err)
    }
}

impl MarkerStore for FileMarkers {
    fn clear_markers(&self, unit: &Path) -> Result<(), MarkerError> {
        let mut markers = self.markers.lock().unwrap_or_else(PoisonError::into_inner);
        if markers.remove(unit).is_some() {
            debug!(unit = %unit.display(), store = %self.path.display(), "cleared markers");
            self.persist(&markers)?;
        }
        Ok(())
    }

    fn add_marker(&self, unit: &Path, marker: Marker) -> Result<(), MarkerError> {
        let mut markers = self.markers.lock().unwrap_or_else(PoisonError::into_inner);
        markers.entry(unit.to_path_buf()).or_default().push(marker);
        self.persist(&markers)
    }
}
