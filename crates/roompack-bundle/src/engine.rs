//! Resolution engine
//!
//! Walks an arbitrary JSON value depth-first, hands every unresolved
//! reference to its resolver, and folds the produced resources back up the
//! tree.
//!
//! # Walk
//! - primitives and null are returned as-is
//! - arrays and plain objects resolve all children concurrently and keep
//!   their original shape and order
//! - an object carrying [`DISCRIMINATOR`] is replaced wholesale by its
//!   resolver's output, which is not walked again
//!
//! Children are joined on the calling task, never spawned, so sibling
//! resolvers interleave cooperatively. Each branch returns its own
//! [`Resolution`]; merging happens only at the fan-in point.

use crate::error::{ResolveError, ResolveResult};
use crate::registry::ResolverRegistry;
use crate::resolver::{Resolution, DISCRIMINATOR};
use futures::future::{try_join_all, BoxFuture, FutureExt};
use roompack_resource::ResourceMap;
use serde_json::{Map, Value};
use std::path::Path;

/// Resolve every reference reachable from `node`
///
/// # Errors
/// - `ResolveError::MalformedReference` if a discriminator is not a string
/// - `ResolveError::UnknownResolver` if a discriminator names no resolver
/// - whatever a resolver returns, unchanged; the first failure aborts the walk
pub fn resolve<'a>(
    node: &'a Value,
    base_path: &'a Path,
    registry: &'a ResolverRegistry,
) -> BoxFuture<'a, ResolveResult<Resolution>> {
    async move {
        match node {
            Value::Array(items) => resolve_array(items, base_path, registry).await,
            Value::Object(map) => match map.get(DISCRIMINATOR) {
                Some(tag) => resolve_reference(map, tag, base_path, registry).await,
                None => resolve_object(map, base_path, registry).await,
            },
            primitive => Ok(Resolution::data_only(primitive.clone())),
        }
    }
    .boxed()
}

async fn resolve_array(
    items: &[Value],
    base_path: &Path,
    registry: &ResolverRegistry,
) -> ResolveResult<Resolution> {
    let results = try_join_all(items.iter().map(|item| resolve(item, base_path, registry))).await?;

    let mut data = Vec::with_capacity(results.len());
    let mut resources = ResourceMap::new();
    for result in results {
        data.push(result.data);
        resources.merge(result.resources);
    }
    Ok(Resolution::new(Value::Array(data), resources))
}

async fn resolve_object(
    map: &Map<String, Value>,
    base_path: &Path,
    registry: &ResolverRegistry,
) -> ResolveResult<Resolution> {
    let entries = try_join_all(map.iter().map(|(key, value)| async move {
        let resolved = resolve(value, base_path, registry).await?;
        Ok::<_, ResolveError>((key.clone(), resolved))
    }))
    .await?;

    let mut data = Map::with_capacity(entries.len());
    let mut resources = ResourceMap::new();
    for (key, resolved) in entries {
        data.insert(key, resolved.data);
        resources.merge(resolved.resources);
    }
    Ok(Resolution::new(Value::Object(data), resources))
}

async fn resolve_reference(
    node: &Map<String, Value>,
    tag: &Value,
    base_path: &Path,
    registry: &ResolverRegistry,
) -> ResolveResult<Resolution> {
    let name = tag.as_str().ok_or_else(|| ResolveError::MalformedReference {
        found: tag.clone(),
    })?;
    let resolver = registry.get(name)?;

    tracing::debug!(resolver = name, "dispatching reference");
    let resolution = resolver.resolve(node, base_path).await?;
    tracing::debug!(
        resolver = name,
        resources = resolution.resources.len(),
        "reference resolved"
    );
    Ok(resolution)
}
