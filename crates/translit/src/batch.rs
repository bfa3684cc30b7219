//! Batch driver: many units, one resolver, one configuration.
//!
//! A failing unit only fails itself; the run keeps going unless
//! `keep_going` is off. An internal error stops the run at once.
//!
//! In parallel mode units are translated on the rayon pool and emitted
//! afterwards in input order, so output order never depends on scheduling.
//! Bindings made by one unit are only visible to units translated after it,
//! which in parallel mode is not deterministic.

use crate::error::PipelineError;
use crate::output::Destination;
use crate::pipeline::{Pipeline, Translated, UnitReport};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};
use translit_syntax::SourceUnit;

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub parallel: bool,
    pub keep_going: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            keep_going: true,
        }
    }
}

/// Result of a batch run.
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub rendered: usize,
    pub suppressed: usize,
    /// Units stopped for parse errors.
    pub aborted: usize,
    /// Units that failed after validation (output or marker failures).
    pub failed: usize,
    pub reports: Vec<UnitReport>,
    pub failures: Vec<(PathBuf, String)>,
    /// The run stopped early on request.
    pub cancelled: bool,
}

impl BatchSummary {
    /// Every unit reached `Done` and the run was not cut short.
    pub fn success(&self) -> bool {
        self.aborted == 0 && self.failed == 0 && !self.cancelled
    }

    fn record(&mut self, report: UnitReport) {
        if report.suppressed {
            self.suppressed += 1;
        } else {
            self.rendered += 1;
        }
        self.reports.push(report);
    }

    fn record_failure(&mut self, path: PathBuf, error: &PipelineError) {
        warn!(unit = %path.display(), error = %error, "unit failed");
        match error {
            PipelineError::Aborted { .. } => self.aborted += 1,
            _ => self.failed += 1,
        }
        self.failures.push((path, error.to_string()));
    }
}

/// Run every unit through `pipeline`, writing output to `dest`.
///
/// Returns `Err` only for errors that are fatal for the whole run. Setting
/// `cancel` stops the run before the next unit is emitted; units already
/// written stay written. Units translated but never emitted print their
/// diagnostics and keep their stored markers.
pub fn run_batch(
    pipeline: &Pipeline<'_>,
    units: &[SourceUnit],
    dest: &mut dyn Destination,
    options: BatchOptions,
    cancel: &AtomicBool,
) -> Result<BatchSummary, PipelineError> {
    info!(units = units.len(), parallel = options.parallel, "starting batch");

    type Pending<'u> = (&'u SourceUnit, Option<Result<Translated<'u>, PipelineError>>);

    let mut translated: Box<dyn Iterator<Item = Pending<'_>> + '_> =
        if options.parallel {
            let results: Vec<_> = units
                .par_iter()
                .map(|unit| {
                    if cancel.load(Ordering::Relaxed) {
                        None
                    } else {
                        Some(pipeline.translate_unit(unit))
                    }
                })
                .collect();
            Box::new(units.iter().zip(results))
        } else {
            Box::new(units.iter().map(|unit| {
                if cancel.load(Ordering::Relaxed) {
                    (unit, None)
                } else {
                    (unit, Some(pipeline.translate_unit(unit)))
                }
            }))
        };

    let mut summary = BatchSummary::default();
    for (unit, result) in translated.by_ref() {
        if cancel.load(Ordering::Relaxed) {
            info!(unit = %unit.path().display(), "cancelled, stopping");
            summary.cancelled = true;
            if let Some(Ok(pending)) = result {
                pending.discard();
            }
            break;
        }
        let Some(result) = result else {
            summary.cancelled = true;
            break;
        };

        match result.and_then(|t| pipeline.emit(t, dest)) {
            Ok(report) => summary.record(report),
            Err(e) if e.is_fatal_for_run() => return Err(e),
            Err(e) => {
                summary.record_failure(unit.path().to_path_buf(), &e);
                if !options.keep_going {
                    break;
                }
            }
        }
    }

    // The sequential iterator is lazy, the parallel one already holds every unit.
    if options.parallel {
        for (_, result) in translated {
            if let Some(Ok(pending)) = result {
                pending.discard();
            }
        }
    }

    info!(
        rendered = summary.rendered,
        suppressed = summary.suppressed,
        aborted = summary.aborted,
        failed = summary.failed,
        "batch finished"
    );
    Ok(summary)
}
