//! Where rendered units go.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use translit_syntax::TargetUnit;

/// Receives the rendered text of each unit, in processing order.
pub trait Destination {
    fn write_unit(&mut self, unit: &TargetUnit, text: &str) -> io::Result<()>;
}

/// Appends every unit to one stream (stdout in the CLI).
pub struct StreamDestination<W: Write> {
    stream: W,
}

impl<W: Write> StreamDestination<W> {
    pub fn new(stream: W) -> Self {
        Self { stream }
    }

    pub fn into_inner(self) -> W {
        self.stream
    }
}

impl<W: Write> Destination for StreamDestination<W> {
    fn write_unit(&mut self, _unit: &TargetUnit, text: &str) -> io::Result<()> {
        self.stream.write_all(text.as_bytes())?;
        self.stream.flush()
    }
}

/// Writes one file per unit under `root`, in a directory per namespace
/// segment: `Com.Acme` + `Greeter.unit.json` -> `root/Com/Acme/Greeter.cs`.
/// A second unit mapping to a path already written is refused.
pub struct DirectoryDestination {
    root: PathBuf,
    extension: String,
    written: Vec<PathBuf>,
}

impl DirectoryDestination {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
            written: Vec::new(),
        }
    }

    /// Output path for `unit`.
    pub fn path_for(&self, unit: &TargetUnit) -> PathBuf {
        let mut path = self.root.clone();
        if let Some(ns) = &unit.namespace {
            path.extend(ns.split('.').filter(|s| !s.is_empty()));
        }
        let stem = file_stem(&unit.path);
        path.push(format!("{stem}.{}", self.extension));
        path
    }

    /// Files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

/// File name up to its first dot: `Greeter.unit.json` -> `Greeter`.
fn file_stem(path: &Path) -> &str {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("unit");
    match name.split('.').next() {
        Some(stem) if !stem.is_empty() => stem,
        _ => name,
    }
}

impl Destination for DirectoryDestination {
    fn write_unit(&mut self, unit: &TargetUnit, text: &str) -> io::Result<()> {
        let path = self.path_for(unit);
        if self.written.contains(&path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!(
                    "{} would overwrite {}",
                    unit.path.display(),
                    path.display()
                ),
            ));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, text)?;
        debug!(unit = %unit.path.display(), output = %path.display(), "wrote unit");
        self.written.push(path);
        Ok(())
    }
}
