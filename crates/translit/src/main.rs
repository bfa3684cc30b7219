use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::info;
use tracing_subscriber::EnvFilter;
use translit::config::{BatchConfig, OutputConfig, RunConfig};
use translit::{
    BatchOptions, DiagnosticSink, Destination, DirectoryDestination, FileMarkers, MarkerStore,
    NoopMarkers, Pipeline, StreamDestination, SymbolResolver, TranslitConfig, run_batch,
};
use translit_syntax::input::read_unit_file;

/// Translate parsed source units into target-language code.
#[derive(Parser)]
#[command(name = "translit", version, about)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate units and print or write the result
    Translate(TranslateArgs),

    /// Print persisted markers
    Markers {
        /// Marker file
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List registered front-ends and renderers
    Renderers,
}

#[derive(Args)]
struct TranslateArgs {
    /// Unit files to translate, in order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Target language
    #[arg(short, long, default_value = "csharp")]
    to: String,

    /// Write one file per unit under this directory (stdout if not specified)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Header written before every unit
    #[arg(long)]
    header: Option<String>,

    /// Translate units even if they have parse errors
    #[arg(long)]
    ignore_errors: bool,

    /// Persist translation diagnostics to this file
    #[arg(long)]
    markers: Option<PathBuf>,

    /// Translate units in parallel
    #[arg(long)]
    parallel: bool,

    /// Continue after a unit fails (default)
    #[arg(long, conflicts_with = "fail_fast")]
    keep_going: bool,

    /// Stop at the first failing unit
    #[arg(long)]
    fail_fast: bool,
}

impl TranslateArgs {
    /// Command-line flags as a config layer.
    fn overrides(&self) -> TranslitConfig {
        TranslitConfig {
            run: RunConfig {
                header: self.header.clone(),
                ignore_errors: self.ignore_errors.then_some(true),
                emit_markers: self.markers.is_some().then_some(true),
                ..Default::default()
            },
            output: OutputConfig {
                directory: self.out_dir.clone(),
                extension: None,
            },
            batch: BatchConfig {
                parallel: self.parallel.then_some(true),
                keep_going: if self.fail_fast {
                    Some(false)
                } else {
                    self.keep_going.then_some(true)
                },
            },
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Translate(args) => cmd_translate(&args),
        Command::Markers { file, json } => cmd_markers(&file, json),
        Command::Renderers => cmd_renderers(),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_translate(args: &TranslateArgs) -> Result<bool> {
    let root = std::env::current_dir().context("failed to get current directory")?;
    let config = TranslitConfig::load(&root)?.merge(args.overrides());
    let run_config = config.run_configuration(&root)?;

    let Some(renderer) = translit_syntax::renderer_for_language(&args.to) else {
        bail!("no renderer for language '{}'", args.to);
    };

    let markers: Arc<dyn MarkerStore> = if run_config.emit_markers {
        let path = args
            .markers
            .clone()
            .unwrap_or_else(|| root.join(".translit").join("markers.json"));
        let store = FileMarkers::open(&path)
            .with_context(|| format!("failed to open marker store {}", path.display()))?;
        Arc::new(store)
    } else {
        Arc::new(NoopMarkers)
    };

    // Units that cannot be read never enter the pipeline but still fail the run.
    let mut units = Vec::with_capacity(args.inputs.len());
    let mut unreadable = 0;
    for input in &args.inputs {
        match read_unit_file(input) {
            Ok(unit) => units.push(unit),
            Err(e) => {
                eprintln!("{e}");
                unreadable += 1;
            }
        }
    }

    let resolver = SymbolResolver::new();
    let sink = DiagnosticSink::stderr(&run_config, markers);
    let pipeline = Pipeline::new(&run_config, &resolver, &sink).with_renderer(renderer);
    let options = BatchOptions {
        parallel: config.parallel(),
        keep_going: config.keep_going(),
    };
    // Never raised here; embedders of the library set it to stop a batch.
    let cancel = AtomicBool::new(false);

    let mut dest: Box<dyn Destination> = match &config.output.directory {
        Some(dir) => {
            let extension = config
                .output
                .extension
                .clone()
                .unwrap_or_else(|| renderer.extension().to_string());
            Box::new(DirectoryDestination::new(root.join(dir), extension))
        }
        None => Box::new(StreamDestination::new(std::io::stdout().lock())),
    };

    let summary = run_batch(&pipeline, &units, dest.as_mut(), options, &cancel)?;
    for (_, message) in &summary.failures {
        eprintln!("{message}");
    }
    info!(
        rendered = summary.rendered,
        suppressed = summary.suppressed,
        aborted = summary.aborted,
        failed = summary.failed + unreadable,
        "done"
    );

    Ok(summary.success() && unreadable == 0)
}

fn cmd_markers(file: &Path, json: bool) -> Result<bool> {
    let markers = FileMarkers::load(file)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&markers)?);
        return Ok(true);
    }
    for (unit, unit_markers) in &markers {
        for marker in unit_markers {
            println!(
                "{}({}): {}: {}",
                unit.display(),
                marker.line,
                marker.severity,
                marker.message
            );
        }
    }
    Ok(true)
}

fn cmd_renderers() -> Result<bool> {
    println!("Front-ends:");
    for front_end in translit_syntax::front_ends() {
        println!("  {:<10} {}", front_end.name(), front_end.extensions().join(", "));
    }
    println!("Renderers:");
    for renderer in translit_syntax::renderers() {
        println!("  {:<10} .{}", renderer.language(), renderer.extension());
    }
    Ok(true)
}
