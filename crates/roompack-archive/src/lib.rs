//! roompack Archive
//!
//! Persists a [`Bundle`](roompack_bundle::Bundle) as a zip archive holding
//! the session token, the resolved document and every resource under its
//! content key.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod token;
pub mod writer;

pub use token::generate_token;
pub use writer::{
    ArchiveError, ArchiveResult, ArchiveSummary, ArchiveWriter, Compression, DATA_MEMBER,
    TOKEN_MEMBER,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
