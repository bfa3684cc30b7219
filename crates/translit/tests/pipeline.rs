//! End-to-end tests for the unit pipeline and the batch driver.

use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use translit::{
    BatchOptions, BindError, DefaultTranslator, DiagnosticSink, Destination,
    DirectoryDestination, MarkerError, MarkerFailurePolicy, MarkerStore, MemoryMarkers,
    NoopMarkers, Pipeline, PipelineError, RunConfiguration, StreamDestination, SymbolResolver,
    UnitState, UnitTranslator, WarningHandler, run_batch,
};
use translit::markers::Marker;
use translit_syntax::ir::{Expr, Stmt, TypeRef};
use translit_syntax::output::CSharpWriter;
use translit_syntax::source::{FieldDecl, Member, MethodDecl, Modifier, TypeDecl, TypeKind};
use translit_syntax::{Problem, Renderer, SourceUnit, Span, TargetRef, TargetUnit};

// ============================================================================
// Helpers
// ============================================================================

/// Shared buffer standing in for stderr.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn sink(config: &RunConfiguration, markers: Arc<dyn MarkerStore>) -> (DiagnosticSink, Captured) {
    let stderr = Captured::default();
    let sink = DiagnosticSink::new(config, Box::new(stderr.clone()), markers);
    (sink, stderr)
}

/// C# renderer that counts its calls.
#[derive(Default)]
struct CountingRenderer {
    calls: AtomicUsize,
}

impl Renderer for CountingRenderer {
    fn language(&self) -> &'static str {
        "csharp"
    }

    fn extension(&self) -> &'static str {
        "cs"
    }

    fn render(&self, header: &str, unit: &TargetUnit) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        CSharpWriter::emit(header, unit)
    }
}

struct FailingDestination;

impl Destination for FailingDestination {
    fn write_unit(&mut self, _unit: &TargetUnit, _text: &str) -> io::Result<()> {
        Err(io::Error::other("disk full"))
    }
}

struct FailingMarkers;

impl MarkerStore for FailingMarkers {
    fn clear_markers(&self, unit: &Path) -> Result<(), MarkerError> {
        Err(MarkerError::Io {
            path: unit.to_path_buf(),
            source: io::Error::other("read-only"),
        })
    }

    fn add_marker(&self, unit: &Path, _marker: Marker) -> Result<(), MarkerError> {
        self.clear_markers(unit)
    }
}

/// Default rules, but raises `cancel` once it has translated `path`.
struct CancellingTranslator<'c> {
    cancel: &'c AtomicBool,
    path: &'static str,
}

impl UnitTranslator for CancellingTranslator<'_> {
    fn translate(
        &self,
        unit: &SourceUnit,
        resolver: &SymbolResolver,
        warnings: &mut dyn WarningHandler,
    ) -> Result<TargetUnit, BindError> {
        let target = DefaultTranslator.translate(unit, resolver, warnings)?;
        if unit.path() == Path::new(self.path) {
            self.cancel.store(true, Ordering::SeqCst);
        }
        Ok(target)
    }
}

fn output(dest: StreamDestination<Vec<u8>>) -> String {
    String::from_utf8(dest.into_inner()).unwrap()
}

fn public_class(name: &str) -> TypeDecl {
    let mut decl = TypeDecl::new(name, TypeKind::Class);
    decl.modifiers.push(Modifier::Public);
    decl
}

fn method(name: &str, return_type: Option<TypeRef>, body: Vec<Stmt>) -> Member {
    Member::Method(MethodDecl {
        name: name.to_string(),
        params: vec![],
        return_type,
        modifiers: vec![Modifier::Public],
        body: Some(body),
        span: Span::new(60, 40, 3),
    })
}

/// One class with one method returning a string.
fn unit_a() -> SourceUnit {
    let mut greeter = public_class("Greeter");
    greeter.members.push(method(
        "greet",
        Some(TypeRef::named("java.lang.String")),
        vec![Stmt::return_stmt(Some(Expr::string("hello")))],
    ));
    SourceUnit::new("A.src").with_package("demo").with_type(greeter)
}

/// A unit whose parser reported one error on line 4.
fn unit_b() -> SourceUnit {
    SourceUnit::new("B.src")
        .with_package("demo")
        .with_type(public_class("Broken"))
        .with_problem(Problem::error("B.src", Span::new(57, 1, 4), "';' expected"))
}

/// Annotation declarations only.
fn unit_c() -> SourceUnit {
    SourceUnit::new("C.src")
        .with_package("demo")
        .with_type(TypeDecl::new("Marker", TypeKind::Annotation))
}

/// A method containing a labeled loop, which has no target form.
fn unit_with_label(path: &str, class: &str) -> SourceUnit {
    let mut decl = public_class(class);
    decl.members.push(method(
        "run",
        None,
        vec![Stmt::Labeled {
            label: "outer".to_string(),
            body: Box::new(Stmt::while_loop(Expr::bool(true), Stmt::Break)),
            span: Span::new(80, 30, 5),
        }],
    ));
    SourceUnit::new(path).with_type(decl)
}

// ============================================================================
// Single units
// ============================================================================

#[test]
fn scenario_a_output_starts_with_header() {
    let config = RunConfiguration::new().with_header("// generated\n");
    let (sink, stderr) = sink(&config, Arc::new(NoopMarkers));
    let resolver = SymbolResolver::new();
    let pipeline = Pipeline::new(&config, &resolver, &sink);
    let mut dest = StreamDestination::new(Vec::new());

    let report = pipeline.process(&unit_a(), &mut dest).unwrap();

    assert!(!report.suppressed);
    assert_eq!(
        report.trace,
        vec![
            UnitState::Parsed,
            UnitState::Validated,
            UnitState::Translated,
            UnitState::Rendered,
            UnitState::Done,
        ]
    );
    assert_eq!(stderr.text(), "");
    insta::assert_snapshot!(output(dest), @r#"
    // generated
    namespace Demo
    {
        public class Greeter
        {
            public string Greet()
            {
                return "hello";
            }
        }
    }
    "#);
}

#[test]
fn scenario_b_parse_error_aborts_without_rendering() {
    let config = RunConfiguration::new();
    let (sink, stderr) = sink(&config, Arc::new(NoopMarkers));
    let resolver = SymbolResolver::new();
    let renderer = CountingRenderer::default();
    let pipeline = Pipeline::new(&config, &resolver, &sink).with_renderer(&renderer);
    let mut dest = StreamDestination::new(Vec::new());

    let err = pipeline.process(&unit_b(), &mut dest).unwrap_err();

    assert!(matches!(err, PipelineError::Aborted { errors: 1, .. }));
    assert!(!err.is_fatal_for_run());
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
    assert_eq!(stderr.text(), "B.src(4): ';' expected\n");
    assert!(output(dest).is_empty());
    assert!(resolver.is_empty());
}

#[test]
fn ignored_parse_errors_still_translate() {
    let config = RunConfiguration::new().ignore_errors(true);
    let (sink, stderr) = sink(&config, Arc::new(NoopMarkers));
    let resolver = SymbolResolver::new();
    let pipeline = Pipeline::new(&config, &resolver, &sink);

    let translated = pipeline.translate_unit(&unit_b()).unwrap();

    assert!(translated.trace.contains(&UnitState::Translated));
    assert!(translated.text.is_some());
    assert_eq!(translated.problems().len(), 1);
    // Lines are written when the unit is emitted.
    assert_eq!(stderr.text(), "");

    let report = pipeline
        .emit(translated, &mut StreamDestination::new(Vec::new()))
        .unwrap();
    assert_eq!(report.problems.len(), 1);
    assert_eq!(stderr.text(), "B.src(4): ';' expected\n");
}

#[test]
fn scenario_c_annotation_only_unit_is_suppressed() {
    let config = RunConfiguration::new().with_header("// generated\n");
    let (sink, _stderr) = sink(&config, Arc::new(NoopMarkers));
    let resolver = SymbolResolver::new();
    let renderer = CountingRenderer::default();
    let pipeline = Pipeline::new(&config, &resolver, &sink).with_renderer(&renderer);
    let mut dest = StreamDestination::new(Vec::new());

    let report = pipeline.process(&unit_c(), &mut dest).unwrap();

    assert!(report.suppressed);
    assert_eq!(
        &report.trace[report.trace.len() - 2..],
        &[UnitState::Suppressed, UnitState::Done]
    );
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
    assert!(output(dest).is_empty());
}

#[test]
fn scenario_d_e_cross_unit_reference() {
    let config = RunConfiguration::new();
    let (sink, _stderr) = sink(&config, Arc::new(NoopMarkers));
    let resolver = SymbolResolver::new();
    let pipeline = Pipeline::new(&config, &resolver, &sink);
    let mut dest = StreamDestination::new(Vec::new());

    let d = SourceUnit::new("D.src")
        .with_package("lib")
        .with_type(public_class("X"));

    let mut user = public_class("Y");
    user.members.push(Member::Field(FieldDecl {
        name: "x".to_string(),
        ty: TypeRef::named("lib.X"),
        modifiers: vec![Modifier::Private],
        init: Some(Expr::new_object(TypeRef::named("lib.X"), vec![])),
        span: Span::new(30, 20, 3),
    }));
    let e = SourceUnit::new("E.src").with_package("app").with_type(user);

    pipeline.process(&d, &mut dest).unwrap();
    assert_eq!(
        resolver.resolve("lib.X"),
        Some(TargetRef::ty(Some("Lib".to_string()), "X"))
    );

    let translated = pipeline.translate_unit(&e).unwrap();
    assert!(translated.target.usings.contains("Lib"));
    let text = translated.text.unwrap();
    assert!(text.contains("using Lib;\n"));
    assert!(text.contains("private X x = new X();"));
}

#[test]
fn warnings_are_attributed_to_their_unit() {
    let config = RunConfiguration::new();
    let (sink, stderr) = sink(&config, Arc::new(NoopMarkers));
    let resolver = SymbolResolver::new();
    let pipeline = Pipeline::new(&config, &resolver, &sink);
    let mut dest = StreamDestination::new(Vec::new());

    let report = pipeline
        .process(&unit_with_label("Loop.src", "Loop"), &mut dest)
        .unwrap();

    assert_eq!(report.problems.len(), 1);
    assert_eq!(report.problems[0].path, Path::new("Loop.src"));
    assert_eq!(report.problems[0].line, 5);
    assert_eq!(
        stderr.text(),
        "Loop.src(5): labeled statement 'outer' has no equivalent, label dropped\n"
    );
    assert!(output(dest).contains("// untranslated: label outer"));
}

#[test]
fn reprocessing_clears_previous_markers() {
    let config = RunConfiguration::new().emit_markers(true);
    let markers = Arc::new(MemoryMarkers::new());
    let unit = unit_with_label("Loop.src", "Loop");
    let stale = Marker::from(&Problem::warning("Loop.src", Span::new(1, 1, 1), "stale"));
    markers.add_marker(unit.path(), stale).unwrap();

    for _ in 0..2 {
        // Each run starts with a fresh resolver.
        let (sink, _stderr) = sink(&config, markers.clone());
        let resolver = SymbolResolver::new();
        let pipeline = Pipeline::new(&config, &resolver, &sink);
        pipeline
            .process(&unit, &mut StreamDestination::new(Vec::new()))
            .unwrap();

        let stored = markers.markers(unit.path());
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].line, 5);
        assert!(stored[0].message.starts_with("labeled statement"));
    }
}

#[test]
fn aborted_unit_keeps_its_markers() {
    let config = RunConfiguration::new().emit_markers(true);
    let markers = Arc::new(MemoryMarkers::new());
    let stale = Marker::from(&Problem::warning("B.src", Span::new(1, 1, 1), "earlier"));
    markers.add_marker(Path::new("B.src"), stale.clone()).unwrap();

    let (sink, _stderr) = sink(&config, markers.clone());
    let resolver = SymbolResolver::new();
    let pipeline = Pipeline::new(&config, &resolver, &sink);
    assert!(pipeline.translate_unit(&unit_b()).is_err());

    assert_eq!(markers.markers(Path::new("B.src")), vec![stale]);
}

#[test]
fn marker_failure_policy_decides_unit_outcome() {
    let unit = unit_with_label("Loop.src", "Loop");

    let lenient = RunConfiguration::new().emit_markers(true);
    let (sink_log, stderr) = sink(&lenient, Arc::new(FailingMarkers));
    let resolver = SymbolResolver::new();
    let pipeline = Pipeline::new(&lenient, &resolver, &sink_log);
    assert!(pipeline.process(&unit, &mut StreamDestination::new(Vec::new())).is_ok());
    assert!(stderr.text().contains("Loop.src(5)"));

    let strict = lenient.clone().marker_failure(MarkerFailurePolicy::Fail);
    let (sink_fail, _stderr) = sink(&strict, Arc::new(FailingMarkers));
    let resolver = SymbolResolver::new();
    let pipeline = Pipeline::new(&strict, &resolver, &sink_fail);
    let mut dest = StreamDestination::new(Vec::new());
    let err = pipeline.process(&unit, &mut dest).unwrap_err();
    assert!(matches!(err, PipelineError::Markers(_)));
    assert!(!err.is_fatal_for_run());
    assert!(output(dest).is_empty());
}

#[test]
fn output_failure_fails_the_unit() {
    let config = RunConfiguration::new();
    let (sink, _stderr) = sink(&config, Arc::new(NoopMarkers));
    let resolver = SymbolResolver::new();
    let pipeline = Pipeline::new(&config, &resolver, &sink);

    let err = pipeline.process(&unit_a(), &mut FailingDestination).unwrap_err();

    match err {
        PipelineError::Output { path, source } => {
            assert_eq!(path, Path::new("A.src"));
            assert_eq!(source.to_string(), "disk full");
        }
        other => panic!("expected output error, got {other:?}"),
    }
}

#[test]
fn json_unit_end_to_end() {
    let fixture = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../translit-syntax/tests/fixtures/Greeter.unit.json");
    let unit = translit_syntax::input::read_unit_file(&fixture).unwrap();

    let config = RunConfiguration::new();
    let (sink, stderr) = sink(&config, Arc::new(NoopMarkers));
    let resolver = SymbolResolver::new();
    let pipeline = Pipeline::new(&config, &resolver, &sink);

    let text = pipeline.translate_unit(&unit).unwrap().text.unwrap();

    assert!(text.starts_with("using System.Collections.Generic;\n\nnamespace Com.Acme\n"));
    assert!(text.contains("private readonly IList<string> names;"));
    assert!(text.contains("public void GreetAll()"));
    assert!(text.contains("foreach (string name in names)"));
    // Parser warnings are not errors and are not printed.
    assert_eq!(stderr.text(), "");
}

// ============================================================================
// Batches
// ============================================================================

#[test]
fn batch_counts_every_outcome() {
    let config = RunConfiguration::new();
    let (sink, _stderr) = sink(&config, Arc::new(NoopMarkers));
    let resolver = SymbolResolver::new();
    let pipeline = Pipeline::new(&config, &resolver, &sink);
    let mut dest = StreamDestination::new(Vec::new());
    let units = [unit_b(), unit_a(), unit_c()];

    let summary = run_batch(
        &pipeline,
        &units,
        &mut dest,
        BatchOptions::default(),
        &AtomicBool::new(false),
    )
    .unwrap();

    assert_eq!(summary.rendered, 1);
    assert_eq!(summary.suppressed, 1);
    assert_eq!(summary.aborted, 1);
    assert_eq!(summary.failed, 0);
    assert!(!summary.success());
    assert_eq!(summary.failures[0].0, Path::new("B.src"));
    assert_eq!(
        summary.failures[0].1,
        "'B.src' has errors, check stderr for details"
    );
    assert!(output(dest).contains("class Greeter"));
}

#[test]
fn batch_stops_at_first_failure_without_keep_going() {
    let config = RunConfiguration::new();
    let (sink, _stderr) = sink(&config, Arc::new(NoopMarkers));
    let resolver = SymbolResolver::new();
    let pipeline = Pipeline::new(&config, &resolver, &sink);
    let mut dest = StreamDestination::new(Vec::new());
    let options = BatchOptions {
        parallel: false,
        keep_going: false,
    };

    let summary = run_batch(
        &pipeline,
        &[unit_b(), unit_a()],
        &mut dest,
        options,
        &AtomicBool::new(false),
    )
    .unwrap();

    assert_eq!(summary.aborted, 1);
    assert_eq!(summary.rendered, 0);
    assert!(output(dest).is_empty());
    // The second unit was never translated.
    assert!(resolver.resolve("demo.Greeter").is_none());
}

#[test]
fn batch_keeps_going_after_output_failure() {
    let config = RunConfiguration::new();
    let (sink, _stderr) = sink(&config, Arc::new(NoopMarkers));
    let resolver = SymbolResolver::new();
    let pipeline = Pipeline::new(&config, &resolver, &sink);
    let units = [unit_a(), unit_c()];

    let summary = run_batch(
        &pipeline,
        &units,
        &mut FailingDestination,
        BatchOptions::default(),
        &AtomicBool::new(false),
    )
    .unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.suppressed, 1);
    assert!(!summary.success());
}

#[test]
fn double_bind_stops_the_run() {
    let config = RunConfiguration::new();
    let (sink, _stderr) = sink(&config, Arc::new(NoopMarkers));
    let resolver = SymbolResolver::new();
    let pipeline = Pipeline::new(&config, &resolver, &sink);
    let mut dest = StreamDestination::new(Vec::new());
    let units = [
        unit_a(),
        SourceUnit::new("A2.src")
            .with_package("demo")
            .with_type(public_class("Greeter")),
        unit_c(),
    ];

    let err = run_batch(
        &pipeline,
        &units,
        &mut dest,
        BatchOptions::default(),
        &AtomicBool::new(false),
    )
    .unwrap_err();

    assert!(err.is_fatal_for_run());
    assert!(matches!(err, PipelineError::Internal(_)));
    assert_eq!(
        resolver.resolve("demo.Greeter"),
        Some(TargetRef::ty(Some("Demo".to_string()), "Greeter"))
    );
}

#[test]
fn parallel_batch_keeps_input_order_and_unit_blocks() {
    let config = RunConfiguration::new();
    let (sink, stderr) = sink(&config, Arc::new(NoopMarkers));
    let resolver = SymbolResolver::new();
    let pipeline = Pipeline::new(&config, &resolver, &sink);
    let mut dest = StreamDestination::new(Vec::new());

    let units: Vec<SourceUnit> = (0..16)
        .map(|i| {
            let mut unit = unit_with_label(&format!("U{i}.src"), &format!("C{i}"));
            // A second warning per unit, so each unit writes a two-line block.
            unit.types[0].members.push(method(
                "again",
                None,
                vec![Stmt::Labeled {
                    label: "inner".to_string(),
                    body: Box::new(Stmt::Break),
                    span: Span::new(200, 10, 9),
                }],
            ));
            unit
        })
        .collect();
    let options = BatchOptions {
        parallel: true,
        keep_going: true,
    };

    let summary = run_batch(&pipeline, &units, &mut dest, options, &AtomicBool::new(false)).unwrap();
    assert_eq!(summary.rendered, 16);
    assert!(summary.success());

    let text = output(dest);
    let positions: Vec<usize> = (0..16)
        .map(|i| text.find(&format!("class C{i}\n")).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    let lines: Vec<String> = stderr.text().lines().map(str::to_string).collect();
    assert_eq!(lines.len(), 32);
    for pair in lines.chunks(2) {
        let unit = pair[0].split('(').next().unwrap();
        assert!(pair[1].starts_with(&format!("{unit}(9)")));
    }
}

#[test]
fn cancelled_batch_emits_nothing_more() {
    let config = RunConfiguration::new();
    let (sink, _stderr) = sink(&config, Arc::new(NoopMarkers));
    let resolver = SymbolResolver::new();
    let pipeline = Pipeline::new(&config, &resolver, &sink);
    let mut dest = StreamDestination::new(Vec::new());

    let summary = run_batch(
        &pipeline,
        &[unit_a(), unit_c()],
        &mut dest,
        BatchOptions::default(),
        &AtomicBool::new(true),
    )
    .unwrap();

    assert!(summary.cancelled);
    assert!(!summary.success());
    assert_eq!(summary.rendered, 0);
    assert!(output(dest).is_empty());
}

#[test]
fn cancelling_mid_run_leaves_the_pending_unit_alone() {
    let config = RunConfiguration::new().emit_markers(true);
    let markers = Arc::new(MemoryMarkers::new());
    let stale = Marker::from(&Problem::warning("B.src", Span::new(1, 1, 1), "earlier"));
    markers.add_marker(Path::new("B.src"), stale.clone()).unwrap();

    let (sink, stderr) = sink(&config, markers.clone());
    let resolver = SymbolResolver::new();
    let cancel = AtomicBool::new(false);
    let translator = CancellingTranslator {
        cancel: &cancel,
        path: "B.src",
    };
    let pipeline = Pipeline::new(&config, &resolver, &sink).with_translator(&translator);
    let mut dest = StreamDestination::new(Vec::new());

    let units = [unit_a(), unit_with_label("B.src", "Looping")];
    let summary = run_batch(&pipeline, &units, &mut dest, BatchOptions::default(), &cancel).unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.rendered, 1);
    assert_eq!(summary.reports.len(), 1);
    assert_eq!(markers.markers(Path::new("B.src")), vec![stale]);
    assert!(stderr.text().starts_with("B.src(5): labeled statement"));

    let text = output(dest);
    assert!(text.contains("class Greeter"));
    assert!(!text.contains("class Looping"));
}

#[test]
fn cancelling_a_parallel_run_persists_nothing_unemitted() {
    let config = RunConfiguration::new().emit_markers(true);
    let markers = Arc::new(MemoryMarkers::new());
    let (sink, _stderr) = sink(&config, markers.clone());
    let resolver = SymbolResolver::new();
    let cancel = AtomicBool::new(false);
    let translator = CancellingTranslator {
        cancel: &cancel,
        path: "U0.src",
    };
    let pipeline = Pipeline::new(&config, &resolver, &sink).with_translator(&translator);
    let mut dest = StreamDestination::new(Vec::new());

    let units: Vec<SourceUnit> = (0..4)
        .map(|i| unit_with_label(&format!("U{i}.src"), &format!("C{i}")))
        .collect();
    let options = BatchOptions {
        parallel: true,
        keep_going: true,
    };
    let summary = run_batch(&pipeline, &units, &mut dest, options, &cancel).unwrap();

    // The flag is raised before anything is emitted.
    assert!(summary.cancelled);
    assert_eq!(summary.rendered, 0);
    assert!(markers.snapshot().is_empty());
    assert!(output(dest).is_empty());
}

#[test]
fn batch_writes_directory_tree() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = RunConfiguration::new().with_header("// generated\n");
    let (sink, _stderr) = sink(&config, Arc::new(NoopMarkers));
    let resolver = SymbolResolver::new();
    let pipeline = Pipeline::new(&config, &resolver, &sink);
    let mut dest = DirectoryDestination::new(dir.path(), "cs");

    let summary = run_batch(
        &pipeline,
        &[unit_a(), unit_c()],
        &mut dest,
        BatchOptions::default(),
        &AtomicBool::new(false),
    )
    .unwrap();

    assert!(summary.success());
    assert_eq!(dest.written().len(), 1);
    let written = std::fs::read_to_string(dir.path().join("Demo").join("A.cs")).unwrap();
    assert!(written.starts_with("// generated\nnamespace Demo\n"));
    assert!(!dir.path().join("Demo").join("C.cs").exists());
}
