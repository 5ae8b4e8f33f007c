//! roompack Resolvers
//!
//! The stock resolvers a room document can reference:
//!
//! - [`LocalResolver`] (`local`): a file next to the document
//! - [`CardResolver`] (`card`): vertical-text cards generated from a base image
//!
//! Neither is registered implicitly; callers pick what goes into their
//! [`ResolverRegistry`](roompack_bundle::ResolverRegistry).

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod card;
pub mod local;
pub mod media;
mod params;
pub mod render;

pub use card::{CardResolver, CARD};
pub use local::{LocalResolver, DEFAULT_MAX_FILE_SIZE, LOCAL};
pub use media::{media_type_for, media_type_or_default};
pub use render::{CardFormat, CardRenderer, GlyphCardRenderer, LayoutOptions};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
