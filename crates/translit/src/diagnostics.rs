//! Diagnostic sink.
//!
//! Every problem is written as a `path(line): message` line to the sink's
//! stream (stderr in the CLI), whether or not markers are enabled. When
//! marker emission is on, translation problems are also forwarded to the
//! [`MarkerStore`].
//!
//! Per-unit diagnostics are collected in a [`UnitDiagnostics`] buffer and
//! flushed as one block when the unit finishes, so units processed in
//! parallel never interleave their lines. The unit's stored markers are only
//! touched by [`UnitDiagnostics::finish`]; a unit that is dropped calls
//! [`UnitDiagnostics::abandon`] and leaves them as they were.

use crate::config::{MarkerFailurePolicy, RunConfiguration};
use crate::error::MarkerError;
use crate::markers::{Marker, MarkerStore, NoopMarkers};
use crate::translate::WarningHandler;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};
use translit_syntax::{Problem, Span};

pub struct DiagnosticSink {
    stream: Mutex<Box<dyn Write + Send>>,
    markers: Arc<dyn MarkerStore>,
    emit_markers: bool,
    marker_failure: MarkerFailurePolicy,
}

impl DiagnosticSink {
    pub fn new(
        config: &RunConfiguration,
        stream: Box<dyn Write + Send>,
        markers: Arc<dyn MarkerStore>,
    ) -> Self {
        Self {
            stream: Mutex::new(stream),
            markers,
            emit_markers: config.emit_markers,
            marker_failure: config.marker_failure,
        }
    }

    /// Sink writing to stderr.
    pub fn stderr(config: &RunConfiguration, markers: Arc<dyn MarkerStore>) -> Self {
        Self::new(config, Box::new(std::io::stderr()), markers)
    }

    /// Sink writing to `stream` without a marker store.
    pub fn to_stream(config: &RunConfiguration, stream: Box<dyn Write + Send>) -> Self {
        Self::new(config, stream, Arc::new(NoopMarkers))
    }

    /// Report a single problem immediately.
    pub fn report(&self, problem: &Problem) -> Result<(), MarkerError> {
        self.write_lines(std::slice::from_ref(problem));
        if self.emit_markers {
            self.forward(&problem.path, problem)?;
        }
        Ok(())
    }

    /// Start collecting diagnostics for `unit`.
    pub fn open_unit(&self, unit: &Path) -> UnitDiagnostics<'_> {
        UnitDiagnostics {
            sink: self,
            unit: unit.to_path_buf(),
            entries: Vec::new(),
        }
    }

    /// Drop the persisted markers of `unit`. No-op when markers are off.
    pub fn clear_markers(&self, unit: &Path) -> Result<(), MarkerError> {
        if !self.emit_markers {
            return Ok(());
        }
        debug!(unit = %unit.display(), "clearing markers");
        self.apply_policy(self.markers.clear_markers(unit))
    }

    fn forward(&self, unit: &Path, problem: &Problem) -> Result<(), MarkerError> {
        self.apply_policy(self.markers.add_marker(unit, Marker::from(problem)))
    }

    fn apply_policy(&self, result: Result<(), MarkerError>) -> Result<(), MarkerError> {
        match result {
            Err(e) if self.marker_failure == MarkerFailurePolicy::Log => {
                warn!(error = %e, "marker store failed, continuing");
                Ok(())
            }
            other => other,
        }
    }

    fn write_lines(&self, problems: &[Problem]) {
        if problems.is_empty() {
            return;
        }
        let mut stream = self.stream.lock().unwrap_or_else(PoisonError::into_inner);
        for problem in problems {
            if let Err(e) = writeln!(stream, "{problem}") {
                warn!(error = %e, "failed to write diagnostic");
                return;
            }
        }
        if let Err(e) = stream.flush() {
            warn!(error = %e, "failed to flush diagnostics");
        }
    }
}

struct Entry {
    problem: Problem,
    persist: bool,
}

/// Diagnostics of one unit, flushed by [`UnitDiagnostics::finish`].
///
/// Also the [`WarningHandler`] installed for the unit's translation, so
/// every warning is attributed to this unit.
pub struct UnitDiagnostics<'a> {
    sink: &'a DiagnosticSink,
    unit: PathBuf,
    entries: Vec<Entry>,
}

impl UnitDiagnostics<'_> {
    pub fn unit(&self) -> &Path {
        &self.unit
    }

    /// Record a problem found by the parser. Written, never persisted.
    pub fn report_parse(&mut self, problem: &Problem) {
        self.entries.push(Entry {
            problem: problem.clone(),
            persist: false,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every problem recorded so far.
    pub fn problems(&self) -> Vec<Problem> {
        self.entries.iter().map(|e| e.problem.clone()).collect()
    }

    /// Write the collected lines, replace the unit's stored markers with its
    /// translation problems, and return every problem recorded for the unit.
    pub fn finish(self) -> Result<Vec<Problem>, MarkerError> {
        let problems = self.problems();
        self.sink.write_lines(&problems);

        self.sink.clear_markers(&self.unit)?;
        if self.sink.emit_markers {
            for entry in self.entries.iter().filter(|e| e.persist) {
                self.sink.forward(&self.unit, &entry.problem)?;
            }
        }
        Ok(problems)
    }

    /// Write the collected lines without touching stored markers.
    pub fn abandon(self) -> Vec<Problem> {
        let problems = self.problems();
        self.sink.write_lines(&problems);
        problems
    }
}

impl fmt::Debug for UnitDiagnostics<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitDiagnostics")
            .field("unit", &self.unit)
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl WarningHandler for UnitDiagnostics<'_> {
    fn warning(&mut self, span: Span, message: &str) {
        debug!(unit = %self.unit.display(), line = span.line, message, "translation warning");
        self.entries.push(Entry {
            problem: Problem::warning(self.unit.clone(), span, message),
            persist: true,
        });
    }
}
