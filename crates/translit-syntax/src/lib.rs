//! Syntax trees, front-ends and renderers for `translit`.
//!
//! `translit-syntax` holds everything that describes code rather than the
//! act of translating it: the source-language tree a front-end produces,
//! the target-language tree a translator builds, and the renderers that
//! print it.
//!
//! # Architecture
//!
//! ```text
//! Front-ends          Source tree       Target tree        Renderers
//! ──────────────    ──────────────    ──────────────    ──────────────
//! JSON units   ──>  SourceUnit   ──>  TargetUnit   ──>  C#
//!                   (source.rs)  ^    (target.rs)
//!                                |
//!                       translator (translit crate)
//! ```
//!
//! Method bodies on both sides share the statement/expression IR in
//! [`ir`].
//!
//! # Example
//!
//! ```ignore
//! use translit_syntax::{input, output::CSharpWriter};
//!
//! let unit = input::read_unit_file("build/units/Greeter.unit.json".as_ref())?;
//! // ... translate `unit` into a TargetUnit ...
//! let text = CSharpWriter::emit("// generated\n", &target);
//! ```

pub mod ir;
pub mod registry;
pub mod source;
pub mod target;
pub mod traits;

pub mod input;
pub mod output;

// Re-exports: IR types
pub use ir::{BinaryOp, CatchClause, Expr, Literal, Span, Stmt, TypeRef, UnaryOp};

// Re-exports: trees
pub use source::{Problem, Severity, SourceUnit};
pub use target::{TargetRef, TargetUnit};

// Re-exports: Traits
pub use traits::{FrontEnd, ReadError, Renderer};

// Re-exports: Registry
pub use registry::{
    front_end_for_extension, front_end_for_name, front_ends, register_front_end,
    register_renderer, renderer_for_language, renderers,
};

// Re-exports: Built-in front-ends
#[cfg(feature = "read-json")]
pub use input::json::JsonFrontEnd;

// Re-exports: Built-in renderers
#[cfg(feature = "write-csharp")]
pub use output::csharp::CSharpRendererImpl;
