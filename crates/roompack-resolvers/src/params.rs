//! Parameter extraction shared by the resolvers

use roompack_bundle::{ResolveError, ResolveResult};
use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};

/// Required string field
pub(crate) fn required_str<'a>(
    node: &'a Map<String, Value>,
    resolver: &'static str,
    field: &'static str,
) -> ResolveResult<&'a str> {
    node.get(field)
        .ok_or_else(|| ResolveError::missing(resolver, field))?
        .as_str()
        .ok_or_else(|| ResolveError::invalid(resolver, field, "a string"))
}

/// Required array field
pub(crate) fn required_array<'a>(
    node: &'a Map<String, Value>,
    resolver: &'static str,
    field: &'static str,
) -> ResolveResult<&'a [Value]> {
    node.get(field)
        .ok_or_else(|| ResolveError::missing(resolver, field))?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| ResolveError::invalid(resolver, field, "an array"))
}

/// Join a document-supplied path under `base_path`
///
/// Absolute paths, root components and drive prefixes would replace
/// `base_path` entirely, so they are rejected.
pub(crate) fn under_base(
    base_path: &Path,
    relative: &str,
    resolver: &'static str,
    field: &'static str,
) -> ResolveResult<PathBuf> {
    let relative = Path::new(relative);
    if relative
        .components()
        .any(|c| matches!(c, Component::RootDir | Component::Prefix(_)))
    {
        return Err(ResolveError::invalid(resolver, field, "a relative path"));
    }
    Ok(base_path.join(relative))
}
