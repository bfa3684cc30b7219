//! Registry for front-ends and renderers.

use crate::traits::{FrontEnd, Renderer};
use std::sync::{OnceLock, PoisonError, RwLock};

/// Global front-end registry.
static FRONT_ENDS: RwLock<Vec<&'static dyn FrontEnd>> = RwLock::new(Vec::new());
static FRONT_ENDS_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Global renderer registry.
static RENDERERS: RwLock<Vec<&'static dyn Renderer>> = RwLock::new(Vec::new());
static RENDERERS_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Register a custom front-end.
pub fn register_front_end(front_end: &'static dyn FrontEnd) {
    FRONT_ENDS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(front_end);
}

/// Register a custom renderer.
pub fn register_renderer(renderer: &'static dyn Renderer) {
    RENDERERS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(renderer);
}

fn init_front_ends() {
    FRONT_ENDS_INITIALIZED.get_or_init(|| {
        #[cfg(feature = "read-json")]
        {
            register_front_end(&crate::input::json::JSON_FRONT_END);
        }
    });
}

fn init_renderers() {
    RENDERERS_INITIALIZED.get_or_init(|| {
        #[cfg(feature = "write-csharp")]
        {
            register_renderer(&crate::output::csharp::CSHARP_RENDERER);
        }
    });
}

/// Get a front-end by name.
pub fn front_end_for_name(name: &str) -> Option<&'static dyn FrontEnd> {
    init_front_ends();
    FRONT_ENDS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .find(|f| f.name() == name)
        .copied()
}

/// Get a front-end by file extension.
pub fn front_end_for_extension(ext: &str) -> Option<&'static dyn FrontEnd> {
    init_front_ends();
    FRONT_ENDS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .find(|f| f.extensions().contains(&ext))
        .copied()
}

/// Get a renderer by language name.
pub fn renderer_for_language(lang: &str) -> Option<&'static dyn Renderer> {
    init_renderers();
    RENDERERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .find(|r| r.language() == lang)
        .copied()
}

/// Get all registered front-ends.
pub fn front_ends() -> Vec<&'static dyn FrontEnd> {
    init_front_ends();
    FRONT_ENDS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Get all registered renderers.
pub fn renderers() -> Vec<&'static dyn Renderer> {
    init_renderers();
    RENDERERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(feature = "read-json")]
    fn test_front_end_lookup() {
        let front_end = front_end_for_name("json").expect("json front-end");
        assert_eq!(front_end.name(), "json");
        assert!(front_end.extensions().contains(&"json"));

        let front_end = front_end_for_extension("json").expect("json extension");
        assert_eq!(front_end.name(), "json");
    }

    #[test]
    #[cfg(feature = "write-csharp")]
    fn test_renderer_lookup() {
        let renderer = renderer_for_language("csharp").expect("csharp renderer");
        assert_eq!(renderer.language(), "csharp");
        assert_eq!(renderer.extension(), "cs");
    }

    #[test]
    fn test_unknown_lookups() {
        assert!(front_end_for_extension("cobol").is_none());
        assert!(renderer_for_language("fortran").is_none());
    }

    #[test]
    #[cfg(all(feature = "read-json", feature = "write-csharp"))]
    fn test_registered_lists() {
        assert!(front_ends().iter().any(|f| f.name() == "json"));
        assert!(renderers().iter().any(|r| r.language() == "csharp"));
    }
}
