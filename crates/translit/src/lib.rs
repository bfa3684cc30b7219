//! Source-to-source translation pipeline.
//!
//! `translit` takes parsed units from a [`translit_syntax::FrontEnd`],
//! translates them against a run-scoped [`SymbolResolver`] and prints the
//! result with a [`translit_syntax::Renderer`].
//!
//! # Architecture
//!
//! ```text
//!                  RunConfiguration (shared, immutable)
//!                           │
//! SourceUnit ──> Pipeline ──┼──> UnitTranslator ──> Renderer ──> Destination
//!                  │        │         │
//!                  │        └── SymbolResolver (shared, first bind wins)
//!                  │                  │
//!                  └──────> DiagnosticSink ──> stderr + MarkerStore
//! ```
//!
//! [`run_batch`] drives many units through one [`Pipeline`], sequentially or
//! on the rayon pool.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::atomic::AtomicBool;
//! use translit::{DiagnosticSink, NoopMarkers, Pipeline, RunConfiguration, StreamDestination, SymbolResolver};
//!
//! let config = RunConfiguration::new().with_header("// generated\n");
//! let resolver = SymbolResolver::new();
//! let sink = DiagnosticSink::stderr(&config, std::sync::Arc::new(NoopMarkers));
//! let pipeline = Pipeline::new(&config, &resolver, &sink);
//!
//! let mut out = StreamDestination::new(std::io::stdout());
//! let summary = translit::run_batch(&pipeline, &units, &mut out, Default::default(), &AtomicBool::new(false))?;
//! ```

pub mod batch;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod markers;
pub mod output;
pub mod pipeline;
pub mod resolver;
pub mod translate;

pub use batch::{BatchOptions, BatchSummary, run_batch};
pub use config::{MarkerFailurePolicy, RunConfiguration, TranslitConfig};
pub use diagnostics::{DiagnosticSink, UnitDiagnostics};
pub use error::{BindError, ConfigError, MarkerError, PipelineError};
pub use markers::{FileMarkers, Marker, MarkerStore, MemoryMarkers, NoopMarkers};
pub use output::{Destination, DirectoryDestination, StreamDestination};
pub use pipeline::{Pipeline, Translated, UnitReport, UnitState};
pub use resolver::SymbolResolver;
pub use translate::{DefaultTranslator, UnitTranslator, WarningHandler};
