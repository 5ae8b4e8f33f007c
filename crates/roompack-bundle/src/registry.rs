//! Resolver registry
//!
//! Provides [`ResolverRegistry`], the caller-supplied mapping from
//! discriminator values to resolvers.

use crate::error::{ResolveError, ResolveResult};
use crate::resolver::Resolver;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Mapping from discriminator value to resolver
///
/// Built once by the caller and shared read-only with the engine for the
/// duration of a run. Cloning is cheap.
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    resolvers: HashMap<String, Arc<dyn Resolver>>,
}

impl ResolverRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolvers: HashMap::new(),
        }
    }

    /// Register a resolver under `name`, replacing any previous entry
    pub fn register<R>(&mut self, name: impl Into<String>, resolver: R) -> &mut Self
    where
        R: Resolver + 'static,
    {
        self.register_arc(name, Arc::new(resolver))
    }

    /// Register an already shared resolver
    pub fn register_arc(&mut self, name: impl Into<String>, resolver: Arc<dyn Resolver>) -> &mut Self {
        let name = name.into();
        if self.resolvers.insert(name.clone(), resolver).is_some() {
            tracing::debug!(resolver = %name, "replaced registered resolver");
        }
        self
    }

    /// Builder-style registration
    #[must_use]
    pub fn with<R>(mut self, name: impl Into<String>, resolver: R) -> Self
    where
        R: Resolver + 'static,
    {
        self.register(name, resolver);
        self
    }

    /// Look up a resolver
    ///
    /// # Errors
    /// `ResolveError::UnknownResolver` if nothing is registered under `name`
    pub fn get(&self, name: &str) -> ResolveResult<&Arc<dyn Resolver>> {
        self.resolvers
            .get(name)
            .ok_or_else(|| ResolveError::UnknownResolver(name.to_string()))
    }

    /// Check if resolver exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.resolvers.contains_key(name)
    }

    /// Remove resolver
    #[inline]
    pub fn remove(&mut self, name: &str) -> bool {
        self.resolvers.remove(name).is_some()
    }

    /// Registered names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.resolvers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered resolvers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Take every entry of `other`, replacing same-named resolvers
    pub fn extend(&mut self, other: ResolverRegistry) {
        self.resolvers.extend(other.resolvers);
    }
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverRegistry")
            .field("resolvers", &self.names())
            .finish()
    }
}
