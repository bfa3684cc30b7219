//! Source-language syntax tree.
//!
//! A [`SourceUnit`] is what a front-end hands to the pipeline: the
//! declarations of one file, already parsed and with type and method
//! references resolved to qualified identities, plus the [`Problem`]s the
//! parser recorded. The pipeline never mutates it.

use crate::ir::{Expr, Span, Stmt, TypeRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Severity of a [`Problem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// An issue tied to a position in a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub severity: Severity,
    pub message: String,
    /// Originating file. Front-ends may leave this empty, in which case the
    /// unit path is filled in when the unit is read.
    #[serde(default)]
    pub path: PathBuf,
    pub line: u32,
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
}

impl Problem {
    pub fn new(
        severity: Severity,
        path: impl Into<PathBuf>,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            path: path.into(),
            line: span.line,
            start: span.start,
            end: span.end(),
        }
    }

    pub fn error(path: impl Into<PathBuf>, span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, path, span, message)
    }

    pub fn warning(path: impl Into<PathBuf>, span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, path, span, message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Renders as `path(line): message`.
impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}): {}", self.path.display(), self.line, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    /// Annotation type (`@interface`).
    Annotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
    Native,
    Synchronized,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeKind,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub extends: Option<TypeRef>,
    #[serde(default)]
    pub implements: Vec<TypeRef>,
    /// Enum constants, in declaration order.
    #[serde(default)]
    pub constants: Vec<String>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub span: Span,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            modifiers: Vec::new(),
            extends: None,
            implements: Vec::new(),
            constants: Vec::new(),
            members: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn has(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
    Constructor(MethodDecl),
    Type(TypeDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub init: Option<Expr>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    /// `None` for `void` methods and constructors.
    #[serde(default)]
    pub return_type: Option<TypeRef>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// `None` for abstract, interface and native methods.
    #[serde(default)]
    pub body: Option<Vec<Stmt>>,
    #[serde(default)]
    pub span: Span,
}

impl MethodDecl {
    pub fn has(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

/// One parsed compilation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceUnit {
    /// Unit identity. Diagnostics and markers are keyed by it.
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub problems: Vec<Problem>,
}

impl SourceUnit {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            package: None,
            imports: Vec::new(),
            types: Vec::new(),
            problems: Vec::new(),
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_type(mut self, decl: TypeDecl) -> Self {
        self.types.push(decl);
        self
    }

    pub fn with_problem(mut self, problem: Problem) -> Self {
        self.problems.push(problem);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Error-severity problems recorded by the parser.
    pub fn errors(&self) -> impl Iterator<Item = &Problem> {
        self.problems.iter().filter(|p| p.is_error())
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Qualify a top-level name with the unit's package.
    pub fn qualify(&self, name: &str) -> String {
        match &self.package {
            Some(pkg) if !pkg.is_empty() => format!("{pkg}.{name}"),
            _ => name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_display() {
        let problem = Problem::error("src/B.java", Span::new(40, 3, 4), "missing semicolon");
        assert_eq!(problem.to_string(), "src/B.java(4): missing semicolon");
        assert_eq!(problem.end, 43);
    }

    #[test]
    fn test_errors_filter_warnings() {
        let unit = SourceUnit::new("A.java")
            .with_problem(Problem::warning("A.java", Span::new(0, 1, 1), "unused"))
            .with_problem(Problem::error("A.java", Span::new(5, 1, 2), "bad token"));
        assert_eq!(unit.errors().count(), 1);
        assert!(unit.has_errors());
    }

    #[test]
    fn test_qualify() {
        let unit = SourceUnit::new("X.java").with_package("com.acme");
        assert_eq!(unit.qualify("X"), "com.acme.X");
        assert_eq!(SourceUnit::new("Y.java").qualify("Y"), "Y");
    }
}
