//! Resolver contract
//!
//! A [`Resolver`] turns one unresolved reference node into replacement data
//! plus the resources that data points at. Implement it to teach the engine a
//! new kind of reference.

use crate::error::ResolveResult;
use async_trait::async_trait;
use roompack_resource::{Resource, ResourceKey, ResourceMap};
use serde_json::{Map, Value};
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

/// Reserved field marking a node as an unresolved reference
pub const DISCRIMINATOR: &str = "$";

/// Output of resolving a node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Value replacing the node in the document
    pub data: Value,
    /// Resources produced for `data`
    pub resources: ResourceMap,
}

impl Resolution {
    /// Create resolution
    #[inline]
    #[must_use]
    pub fn new(data: Value, resources: ResourceMap) -> Self {
        Self { data, resources }
    }

    /// Data with no resources
    #[inline]
    #[must_use]
    pub fn data_only(data: Value) -> Self {
        Self::new(data, ResourceMap::new())
    }

    /// The usual single-blob case: the node becomes the key string
    #[must_use]
    pub fn single(key: ResourceKey, resource: Resource) -> Self {
        Self::new(
            Value::String(key.to_string()),
            ResourceMap::single(key, resource),
        )
    }
}

/// Pluggable strategy for one discriminator value
///
/// Implementations must be safe to run concurrently with sibling
/// invocations: every call gets its own node and base path, and must not rely
/// on mutable state shared between calls.
///
/// Output is trusted as fully resolved; the engine does not walk `data`
/// again.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolve `node` (the whole reference object, discriminator included)
    /// relative to `base_path`
    async fn resolve(&self, node: &Map<String, Value>, base_path: &Path)
        -> ResolveResult<Resolution>;
}

/// Adapter turning an async closure into a [`Resolver`]
///
/// The closure receives owned copies of its inputs so the returned future
/// need not borrow from the engine.
pub struct FnResolver<F> {
    f: F,
}

impl<F> FnResolver<F> {
    /// Wrap a closure
    #[inline]
    #[must_use]
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnResolver<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnResolver").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> Resolver for FnResolver<F>
where
    F: Fn(Map<String, Value>, PathBuf) -> Fut + Send + Sync,
    Fut: Future<Output = ResolveResult<Resolution>> + Send,
{
    async fn resolve(
        &self,
        node: &Map<String, Value>,
        base_path: &Path,
    ) -> ResolveResult<Resolution> {
        (self.f)(node.clone(), base_path.to_path_buf()).await
    }
}

/// Wrap an async closure as a resolver
#[inline]
#[must_use]
pub fn resolver_fn<F, Fut>(f: F) -> FnResolver<F>
where
    F: Fn(Map<String, Value>, PathBuf) -> Fut + Send + Sync,
    Fut: Future<Output = ResolveResult<Resolution>> + Send,
{
    FnResolver::new(f)
}
