//! Document bundler
//!
//! Top-level entry point: separates the document's own `resources` metadata,
//! resolves the rest, and reassembles a self-describing document whose
//! `resources` field lists the media type of every key it references.

use crate::engine;
use crate::error::{ResolveError, ResolveResult};
use crate::registry::ResolverRegistry;
use roompack_resource::ResourceMap;
use serde_json::{Map, Value};
use std::path::Path;

/// Reserved top-level field holding resource metadata
pub const RESOURCES_FIELD: &str = "resources";

/// Result of bundling a document
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    /// Resolved document, with merged resource metadata
    pub data: Value,
    /// Bytes for every resource produced during this run
    pub resources: ResourceMap,
}

impl Bundle {
    /// The document's resource metadata field
    #[must_use]
    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.data.get(RESOURCES_FIELD).and_then(Value::as_object)
    }
}

/// Bundle a document
///
/// # Workflow
/// 1. Detach the top-level `resources` field
/// 2. Resolve everything else
/// 3. Merge fresh `{type}` records over the detached metadata
/// 4. Reattach the merged metadata
///
/// # Errors
/// - `ResolveError::InvalidDocument` if the document, its `resources` field,
///   or the resolved remainder is not an object
/// - any error from [`engine::resolve`]
pub async fn bundle(
    document: Value,
    base_path: &Path,
    registry: &ResolverRegistry,
) -> ResolveResult<Bundle> {
    let mut root = match document {
        Value::Object(root) => root,
        other => {
            return Err(ResolveError::InvalidDocument(format!(
                "expected a JSON object at the top level, found {}",
                kind_of(&other)
            )))
        }
    };

    let existing = match root.remove(RESOURCES_FIELD) {
        None => Map::new(),
        Some(Value::Object(existing)) => existing,
        Some(other) => {
            return Err(ResolveError::InvalidDocument(format!(
                "\"{RESOURCES_FIELD}\" must be an object, found {}",
                kind_of(&other)
            )))
        }
    };

    tracing::info!(
        base_path = %base_path.display(),
        existing_resources = existing.len(),
        "bundling document"
    );

    let remainder = Value::Object(root);
    let resolved = engine::resolve(&remainder, base_path, registry).await?;

    let mut data = match resolved.data {
        Value::Object(data) => data,
        other => {
            return Err(ResolveError::InvalidDocument(format!(
                "top-level reference resolved to {}, expected an object",
                kind_of(&other)
            )))
        }
    };

    let mut metadata = existing;
    metadata.extend(resolved.resources.metadata());
    data.insert(RESOURCES_FIELD.to_owned(), Value::Object(metadata));

    tracing::info!(
        resources = resolved.resources.len(),
        bytes = resolved.resources.total_bytes(),
        "document bundled"
    );

    Ok(Bundle {
        data: Value::Object(data),
        resources: resolved.resources,
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
