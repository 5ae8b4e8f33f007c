//! Media-type inference from file extensions

use roompack_resource::DEFAULT_MEDIA_TYPE;
use std::path::Path;

/// Media type for a path or resource key, judged by its extension
#[must_use]
pub fn media_type_for(path: impl AsRef<Path>) -> Option<&'static str> {
    mime_guess::from_path(path).first_raw()
}

/// Like [`media_type_for`], falling back to `application/octet-stream`
#[must_use]
pub fn media_type_or_default(path: impl AsRef<Path>) -> &'static str {
    media_type_for(path).unwrap_or(DEFAULT_MEDIA_TYPE)
}

/// Extension of `path` without the dot, if it has a non-empty one
#[must_use]
pub fn extension_of(path: &Path) -> Option<&str> {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
}
