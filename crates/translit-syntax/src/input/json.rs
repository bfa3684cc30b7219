//! JSON front-end.
//!
//! Reads a [`SourceUnit`] serialized by an external parser process. The
//! unit path inside the document is the unit identity; when it is missing
//! the path the document was read from is used, and problems without an
//! originating file are attributed to the unit.

use crate::source::SourceUnit;
use crate::traits::{FrontEnd, ReadError};
use std::path::Path;

/// Static instance of the JSON front-end for registry.
pub static JSON_FRONT_END: JsonFrontEnd = JsonFrontEnd;

/// Front-end for serialized units.
pub struct JsonFrontEnd;

impl FrontEnd for JsonFrontEnd {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn read(&self, path: &Path, input: &str) -> Result<SourceUnit, ReadError> {
        read_json(path, input)
    }
}

/// Decode a serialized unit.
pub fn read_json(path: &Path, input: &str) -> Result<SourceUnit, ReadError> {
    let mut unit: SourceUnit =
        serde_json::from_str(input).map_err(|source| ReadError::Decode {
            path: path.display().to_string(),
            source,
        })?;

    if unit.path.as_os_str().is_empty() {
        unit.path = path.to_path_buf();
    }
    for problem in &mut unit.problems {
        if problem.path.as_os_str().is_empty() {
            problem.path = unit.path.clone();
        }
    }

    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Severity, TypeKind};

    #[test]
    fn test_read_minimal_unit() {
        let unit = read_json(
            Path::new("units/A.unit.json"),
            r#"{
                "path": "src/com/acme/A.java",
                "package": "com.acme",
                "types": [{ "name": "A", "kind": "class" }]
            }"#,
        )
        .unwrap();
        assert_eq!(unit.path, Path::new("src/com/acme/A.java"));
        assert_eq!(unit.package.as_deref(), Some("com.acme"));
        assert_eq!(unit.types[0].kind, TypeKind::Class);
        assert!(unit.problems.is_empty());
    }

    #[test]
    fn test_missing_paths_default_to_file() {
        let unit = read_json(
            Path::new("B.json"),
            r#"{ "problems": [{ "severity": "error", "message": "bad", "line": 4 }] }"#,
        )
        .unwrap();
        assert_eq!(unit.path, Path::new("B.json"));
        assert_eq!(unit.problems[0].path, Path::new("B.json"));
        assert_eq!(unit.problems[0].severity, Severity::Error);
    }

    #[test]
    fn test_malformed_input() {
        let err = read_json(Path::new("broken.json"), "{ not json").unwrap_err();
        assert!(matches!(err, ReadError::Decode { .. }));
        assert!(err.to_string().starts_with("malformed unit broken.json"));
    }
}
