//! roompack Bundle
//!
//! Recursive reference resolution for room documents.
//!
//! # Core Concepts
//!
//! - [`Resolver`]: pluggable async strategy for one kind of reference
//! - [`ResolverRegistry`]: caller-supplied mapping from discriminator to resolver
//! - [`engine::resolve`]: the tree walk that dispatches references and folds
//!   resources back up
//! - [`bundle`]: top-level entry point producing a [`Bundle`]
//!
//! # Example
//!
//! ```rust,ignore
//! use roompack_bundle::{bundle, ResolverRegistry};
//! use roompack_resolvers::LocalResolver;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ResolverRegistry::new().with("local", LocalResolver::new());
//! let document = serde_json::json!({
//!     "cover": { "$": "local", "path": "cover.png" }
//! });
//!
//! let bundle = bundle(document, "rooms/demo".as_ref(), &registry).await?;
//! println!("{} resources", bundle.resources.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod bundler;
pub mod engine;
pub mod error;
pub mod registry;
pub mod resolver;

pub use bundler::{bundle, Bundle, RESOURCES_FIELD};
pub use error::{ResolveError, ResolveResult};
pub use registry::ResolverRegistry;
pub use resolver::{resolver_fn, FnResolver, Resolution, Resolver, DISCRIMINATOR};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for writing resolvers
    pub use crate::{
        bundle, Bundle, ResolveError, ResolveResult, Resolution, Resolver, ResolverRegistry,
        DISCRIMINATOR,
    };
    pub use roompack_resource::{Resource, ResourceKey, ResourceMap};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
