//! Per-unit pipeline.
//!
//! One unit moves through
//!
//! ```text
//! Parsed ──> Validated ──> Translated ──> Suppressed ──> Done
//!    │                          └───────> Rendered ───┘
//!    └──> Aborted
//! ```
//!
//! A unit with parse errors is aborted unless errors are ignored. A fresh
//! [`UnitDiagnostics`] is installed as the unit's warning handler. A
//! suppressed translation is a success that produces no output.
//!
//! Translation and rendering ([`Pipeline::translate_unit`]) are separate
//! from writing ([`Pipeline::emit`]). The rendered text and the unit's
//! diagnostics are held in memory until `emit`, which replaces the unit's
//! persisted markers and then writes the text. A unit dropped before `emit`
//! with [`Translated::discard`] prints its lines and leaves both its output
//! and its markers untouched.

use crate::config::RunConfiguration;
use crate::diagnostics::{DiagnosticSink, UnitDiagnostics};
use crate::error::PipelineError;
use crate::output::Destination;
use crate::resolver::SymbolResolver;
use crate::translate::{DefaultTranslator, UnitTranslator};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::info;
use translit_syntax::output::CSHARP_RENDERER;
use translit_syntax::{Problem, Renderer, SourceUnit, TargetUnit};

/// Where a unit is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitState {
    Parsed,
    Validated,
    Translated,
    Suppressed,
    Rendered,
    Done,
    Aborted,
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitState::Parsed => "parsed",
            UnitState::Validated => "validated",
            UnitState::Translated => "translated",
            UnitState::Suppressed => "suppressed",
            UnitState::Rendered => "rendered",
            UnitState::Done => "done",
            UnitState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// A translated unit waiting to be emitted.
#[derive(Debug)]
pub struct Translated<'a> {
    pub target: TargetUnit,
    /// Rendered text, `None` when the unit is suppressed.
    pub text: Option<String>,
    pub trace: Vec<UnitState>,
    diagnostics: UnitDiagnostics<'a>,
}

impl Translated<'_> {
    /// Problems recorded for the unit so far.
    pub fn problems(&self) -> Vec<Problem> {
        self.diagnostics.problems()
    }

    /// Drop the unit without emitting it.
    pub fn discard(self) -> Vec<Problem> {
        info!(unit = %self.target.path.display(), "discarded");
        self.diagnostics.abandon()
    }
}

/// Outcome of a unit that reached `Done`.
#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    pub path: PathBuf,
    /// States visited, in order.
    pub trace: Vec<UnitState>,
    pub suppressed: bool,
    pub problems: Vec<Problem>,
}

/// Drives units through the pipeline. Shared by reference across a run.
pub struct Pipeline<'a> {
    config: &'a RunConfiguration,
    resolver: &'a SymbolResolver,
    sink: &'a DiagnosticSink,
    translator: &'a dyn UnitTranslator,
    renderer: &'a dyn Renderer,
}

impl<'a> Pipeline<'a> {
    /// Pipeline using the default rule set and the C# renderer.
    pub fn new(
        config: &'a RunConfiguration,
        resolver: &'a SymbolResolver,
        sink: &'a DiagnosticSink,
    ) -> Self {
        Self {
            config,
            resolver,
            sink,
            translator: &DefaultTranslator,
            renderer: &CSHARP_RENDERER,
        }
    }

    pub fn with_translator(mut self, translator: &'a dyn UnitTranslator) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_renderer(mut self, renderer: &'a dyn Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &RunConfiguration {
        self.config
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer
    }

    /// Validate, translate and render `unit` without writing anything.
    pub fn translate_unit(&self, unit: &SourceUnit) -> Result<Translated<'a>, PipelineError> {
        let path = unit.path().to_path_buf();
        let mut trace = vec![UnitState::Parsed];
        let mut diagnostics = self.sink.open_unit(&path);

        let mut errors = 0;
        for problem in unit.errors() {
            diagnostics.report_parse(problem);
            errors += 1;
        }

        if errors > 0 && !self.config.ignore_errors {
            info!(unit = %path.display(), errors, "aborted");
            diagnostics.abandon();
            return Err(PipelineError::Aborted { path, errors });
        }
        trace.push(UnitState::Validated);
        info!(unit = %path.display(), errors, "validated");

        let target = match self.translator.translate(unit, self.resolver, &mut diagnostics) {
            Ok(target) => target,
            Err(e) => {
                diagnostics.abandon();
                return Err(e.into());
            }
        };
        trace.push(UnitState::Translated);
        info!(
            unit = %path.display(),
            warnings = diagnostics.len() - errors,
            suppressed = target.suppressed,
            "translated"
        );

        let text = if target.suppressed {
            None
        } else {
            Some(self.renderer.render(&self.config.header, &target))
        };

        Ok(Translated {
            target,
            text,
            trace,
            diagnostics,
        })
    }

    /// Persist the unit's diagnostics and write its text to `dest`.
    pub fn emit(
        &self,
        translated: Translated<'_>,
        dest: &mut dyn Destination,
    ) -> Result<UnitReport, PipelineError> {
        let Translated {
            target,
            text,
            mut trace,
            diagnostics,
        } = translated;
        let problems = diagnostics.finish()?;

        match text {
            Some(text) => {
                dest.write_unit(&target, &text)
                    .map_err(|source| PipelineError::Output {
                        path: target.path.clone(),
                        source,
                    })?;
                trace.push(UnitState::Rendered);
                info!(unit = %target.path.display(), bytes = text.len(), "rendered");
            }
            None => {
                trace.push(UnitState::Suppressed);
                info!(unit = %target.path.display(), "suppressed");
            }
        }
        trace.push(UnitState::Done);

        Ok(UnitReport {
            path: target.path,
            trace,
            suppressed: target.suppressed,
            problems,
        })
    }

    /// Run `unit` through every state and write its output to `dest`.
    pub fn process(
        &self,
        unit: &SourceUnit,
        dest: &mut dyn Destination,
    ) -> Result<UnitReport, PipelineError> {
        let translated = self.translate_unit(unit)?;
        self.emit(translated, dest)
    }
}

