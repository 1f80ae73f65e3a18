//! Content-type lookup by file name extension.

/// Source of content types for value names.
pub trait MimeRegistry: Send + Sync {
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Registry backed by the `mime_guess` extension database.
#[derive(Clone, Copy, Debug, Default)]
pub struct GuessRegistry;

impl MimeRegistry for GuessRegistry {
    fn lookup(&self, name: &str) -> Option<String> {
        mime_guess::from_path(name)
            .first()
            .map(|mime| mime.essence_str().to_string())
    }
}

/// Built-in types for configuration and markup files.
pub fn fallback_content_type(name: &str) -> Option<&'static str> {
    if name.ends_with(".properties") {
        Some("text/x-java-properties")
    } else if name.ends_with(".yaml") || name.ends_with(".yml") {
        Some("text/yaml")
    } else if name.ends_with(".json") {
        Some("application/json")
    } else if name.ends_with(".md") {
        Some("text/markdown")
    } else {
        None
    }
}

/// The registry first, then the fallback table. `None` means the response
/// carries no content type.
pub fn content_type(registry: &dyn MimeRegistry, name: &str) -> Option<String> {
    registry
        .lookup(name)
        .or_else(|| fallback_content_type(name).map(str::to_string))
}
