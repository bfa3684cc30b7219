//! Front-ends - produce parsed source units.

use crate::source::SourceUnit;
use crate::traits::ReadError;
use std::path::Path;

#[cfg(feature = "read-json")]
pub mod json;

#[cfg(feature = "read-json")]
pub use json::{JSON_FRONT_END, JsonFrontEnd, read_json};

/// Read a unit from disk with the front-end registered for its extension.
pub fn read_unit_file(path: &Path) -> Result<SourceUnit, ReadError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let front_end = crate::registry::front_end_for_extension(ext).ok_or_else(|| {
        ReadError::Unsupported(format!("no front-end for {}", path.display()))
    })?;
    let content = std::fs::read_to_string(path).map_err(|source| ReadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    front_end.read(path, &content)
}
