//! Renderers - print target units as source code.

#[cfg(feature = "write-csharp")]
pub mod csharp;

#[cfg(feature = "write-csharp")]
pub use csharp::{CSHARP_RENDERER, CSharpRendererImpl, CSharpWriter};
