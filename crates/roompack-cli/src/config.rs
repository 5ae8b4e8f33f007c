//! CLI configuration
//!
//! Read from a TOML file passed with `--config`; every field is optional.
//!
//! ```toml
//! max_file_size = 10485760
//! font_path = "fonts/NotoSerifJP-Regular.otf"
//! log_level = "debug"
//! compression = "stored"
//! ```

use roompack_archive::Compression;
use roompack_resolvers::DEFAULT_MAX_FILE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("max_file_size must be greater than zero")]
    ZeroFileSize,
}

/// Settings for one bundling run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Size limit for files read by the `local` resolver, in bytes
    pub max_file_size: u64,
    /// Font for card rendering; the `card` resolver is registered only when set
    pub font_path: Option<PathBuf>,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Archive member compression
    pub compression: Compression,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            font_path: None,
            log_level: "info".to_string(),
            compression: Compression::default(),
        }
    }
}

impl CliConfig {
    /// Create config with defaults
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    #[inline]
    #[must_use]
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_font_path(mut self, font_path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(font_path.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_file_size == 0 {
            return Err(ConfigError::ZeroFileSize);
        }
        Ok(())
    }
}
