//! Unit translation.
//!
//! A [`UnitTranslator`] turns one [`SourceUnit`] into a [`TargetUnit`]. It
//! reads and extends the run's [`SymbolResolver`], and reports everything it
//! cannot map through the [`WarningHandler`] it is handed for that one call,
//! leaving a placeholder in the output instead of dropping content.

mod names;
mod rules;

pub use names::{builtin_type, namespace_for_package, pascal_case};
pub use rules::DefaultTranslator;

use crate::error::BindError;
use crate::resolver::SymbolResolver;
use translit_syntax::{SourceUnit, Span, TargetUnit};

/// Receives translation warnings for the unit being translated.
pub trait WarningHandler {
    fn warning(&mut self, span: Span, message: &str);
}

impl<F: FnMut(Span, &str)> WarningHandler for F {
    fn warning(&mut self, span: Span, message: &str) {
        self(span, message)
    }
}

/// Translates one unit.
pub trait UnitTranslator: Send + Sync {
    /// Translate `unit`. The only error is an internal inconsistency in the
    /// resolver; everything else is a warning plus a placeholder.
    fn translate(
        &self,
        unit: &SourceUnit,
        resolver: &SymbolResolver,
        warnings: &mut dyn WarningHandler,
    ) -> Result<TargetUnit, BindError>;
}
