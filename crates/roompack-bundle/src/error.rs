//! Error types for reference resolution
//!
//! A single [`ResolveError`] flows through the engine and every resolver:
//! - Malformed or unknown references (engine)
//! - Missing or ill-typed resolver parameters
//! - I/O failures while loading referenced content
//! - Unsupported media types and rendering failures
//!
//! The engine never wraps resolver errors; what a resolver returns is what the
//! caller sees.

use serde_json::Value;
use std::path::PathBuf;

/// Errors raised while resolving a document
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Discriminator present but not a string
    #[error("resolver name ($) must be a string, found {found}")]
    MalformedReference { found: Value },

    /// Discriminator names no registered resolver
    #[error("resolver \"{0}\" not found")]
    UnknownResolver(String),

    /// Required resolver parameter absent
    #[error("{resolver} resolver requires {parameter}")]
    MissingParameter {
        resolver: &'static str,
        parameter: &'static str,
    },

    /// Resolver parameter has the wrong shape
    #[error("{resolver} resolver: {parameter} must be {expected}")]
    InvalidParameter {
        resolver: &'static str,
        parameter: &'static str,
        expected: &'static str,
    },

    /// Referenced content could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Referenced file exceeds the configured size limit
    #[error("{path} is too large: {size} bytes (max: {limit})")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    /// Media type outside the resolver's supported set
    #[error("{resolver} resolver: unsupported media type {media_type}")]
    UnsupportedMediaType {
        resolver: &'static str,
        media_type: String,
    },

    /// Content synthesis failed
    #[error("render failed: {0}")]
    Render(String),

    /// Top-level document has an unusable shape
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

impl ResolveError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create missing-parameter error
    #[inline]
    #[must_use]
    pub fn missing(resolver: &'static str, parameter: &'static str) -> Self {
        Self::MissingParameter {
            resolver,
            parameter,
        }
    }

    /// Create invalid-parameter error
    #[inline]
    #[must_use]
    pub fn invalid(resolver: &'static str, parameter: &'static str, expected: &'static str) -> Self {
        Self::InvalidParameter {
            resolver,
            parameter,
            expected,
        }
    }

    /// Whether the input document, rather than the environment, is at fault
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedReference { .. }
                | Self::UnknownResolver(_)
                | Self::MissingParameter { .. }
                | Self::InvalidParameter { .. }
                | Self::UnsupportedMediaType { .. }
                | Self::InvalidDocument(_)
        )
    }
}

/// Result type alias for resolution
pub type ResolveResult<T> = Result<T, ResolveError>;
