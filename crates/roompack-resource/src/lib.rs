//! roompack Resources
//!
//! Content-addressed byte blobs referenced from room documents.
//!
//! # Core Concepts
//!
//! - [`ContentHash`]: 32-byte SHA-256 digest
//! - [`ResourceKey`]: digest plus optional extension hint, used as document
//!   value and archive member name
//! - [`Resource`]: owned bytes and media type
//! - [`ResourceMap`]: key-ordered set of resources with union merging
//!
//! # Example
//!
//! ```rust
//! use roompack_resource::{Resource, ResourceKey, ResourceMap};
//!
//! let bytes = b"fake png".to_vec();
//! let key = ResourceKey::for_content(&bytes, Some("png"));
//! let resources = ResourceMap::single(key.clone(), Resource::new(bytes, "image/png"));
//!
//! assert!(key.as_str().ends_with(".png"));
//! assert_eq!(resources.len(), 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod hash;
mod key;
mod resource;

pub use hash::{ContentHash, HashError, HASH_HEX_LEN, HASH_LEN};
pub use key::{KeyError, ResourceKey};
pub use resource::{Resource, ResourceMap, ResourceMetadata, DEFAULT_MEDIA_TYPE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
