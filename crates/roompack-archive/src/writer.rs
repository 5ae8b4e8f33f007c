//! Archive writer
//!
//! Layout of a written archive:
//!
//! | member | content |
//! |---|---|
//! | `.token` | session token, see [`generate_token`](crate::generate_token) |
//! | `__data.json` | the resolved document |
//! | `<resource key>` | raw resource bytes, one member per key |

use crate::token::generate_token;
use roompack_bundle::Bundle;
use serde::{Deserialize, Serialize};
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Member holding the session token
pub const TOKEN_MEMBER: &str = ".token";

/// Member holding the resolved document
pub const DATA_MEMBER: &str = "__data.json";

/// Errors raised while writing an archive
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Target could not be created or written
    #[error("io error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Zip container error
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Document could not be serialized
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ArchiveError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for archive operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Member compression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Deflate every member
    #[default]
    Deflated,
    /// Store members uncompressed
    Stored,
}

impl Compression {
    fn method(self) -> CompressionMethod {
        match self {
            Self::Deflated => CompressionMethod::Deflated,
            Self::Stored => CompressionMethod::Stored,
        }
    }
}

/// What was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Token stored in `.token`
    pub token: String,
    /// Resource members written
    pub resources: usize,
    /// Raw resource bytes before compression
    pub resource_bytes: usize,
}

/// Writes bundles as zip archives
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveWriter {
    compression: Compression,
}

impl ArchiveWriter {
    /// Create writer with default compression
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With member compression
    #[inline]
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Configured compression
    #[inline]
    #[must_use]
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Write `bundle` to a new file at `path`, replacing any existing file
    ///
    /// Zip encoding is blocking, so it runs on the blocking thread pool.
    ///
    /// # Errors
    /// - `ArchiveError::Io` if the file cannot be created or written
    /// - `ArchiveError::Zip` / `ArchiveError::Serialize` on encoding failures
    pub async fn write(&self, path: impl AsRef<Path>, bundle: Bundle) -> ArchiveResult<ArchiveSummary> {
        let path = path.as_ref().to_path_buf();
        let writer = *self;
        let target = path.clone();

        let summary = tokio::task::spawn_blocking(move || writer.write_file(&target, &bundle))
            .await
            .map_err(|e| ArchiveError::io_error(&path, std::io::Error::other(e)))??;

        tracing::info!(
            path = %path.display(),
            resources = summary.resources,
            bytes = summary.resource_bytes,
            "archive written"
        );
        Ok(summary)
    }

    /// Blocking variant of [`write`](Self::write)
    ///
    /// # Errors
    /// See [`write`](Self::write).
    pub fn write_file(&self, path: &Path, bundle: &Bundle) -> ArchiveResult<ArchiveSummary> {
        let file = std::fs::File::create(path).map_err(|e| ArchiveError::io_error(path, e))?;
        let mut out = std::io::BufWriter::new(file);
        let summary = self.write_to(&mut out, bundle)?;
        out.flush().map_err(|e| ArchiveError::io_error(path, e))?;
        Ok(summary)
    }

    /// Encode `bundle` into any seekable sink with a fresh token
    ///
    /// # Errors
    /// `ArchiveError::Zip` / `ArchiveError::Serialize` on encoding failures
    pub fn write_to<W: Write + Seek>(&self, sink: W, bundle: &Bundle) -> ArchiveResult<ArchiveSummary> {
        self.write_with_token(sink, bundle, generate_token())
    }

    fn write_with_token<W: Write + Seek>(
        &self,
        sink: W,
        bundle: &Bundle,
        token: String,
    ) -> ArchiveResult<ArchiveSummary> {
        let options = SimpleFileOptions::default().compression_method(self.compression.method());
        let mut zip = ZipWriter::new(sink);

        zip.start_file(TOKEN_MEMBER, options)?;
        zip.write_all(token.as_bytes()).map_err(zip::result::ZipError::Io)?;

        zip.start_file(DATA_MEMBER, options)?;
        let data = serde_json::to_vec(&bundle.data)?;
        zip.write_all(&data).map_err(zip::result::ZipError::Io)?;

        for (key, resource) in &bundle.resources {
            zip.start_file(key.as_str(), options)?;
            zip.write_all(resource.content()).map_err(zip::result::ZipError::Io)?;
            tracing::debug!(key = %key, bytes = resource.len(), "archived resource");
        }

        zip.finish()?;

        Ok(ArchiveSummary {
            token,
            resources: bundle.resources.len(),
            resource_bytes: bundle.resources.total_bytes(),
        })
    }
}
