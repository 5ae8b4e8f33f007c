//! Resource keys
//!
//! A [`ResourceKey`] is the content-derived name of a resource: the hex
//! SHA-256 digest of its bytes, optionally followed by `.<ext>`. The same
//! string is the resource's archive member name and the value written into
//! the document in place of the original reference.

use crate::hash::{ContentHash, HashError, HASH_HEX_LEN};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Content-derived resource key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey {
    hash: ContentHash,
    extension: Option<String>,
    rendered: String,
}

impl ResourceKey {
    /// Derive the key for `content`
    ///
    /// The extension hint is cosmetic: it lets consumers infer a media type
    /// from the key, and never takes part in the digest. Empty hints are
    /// treated as absent.
    #[must_use]
    pub fn for_content(content: &[u8], extension: Option<&str>) -> Self {
        Self::from_parts(ContentHash::compute(content), extension)
    }

    /// Build a key from an already computed hash
    #[must_use]
    pub fn from_parts(hash: ContentHash, extension: Option<&str>) -> Self {
        let extension = extension.filter(|e| !e.is_empty()).map(str::to_owned);
        let rendered = match &extension {
            Some(ext) => format!("{hash}.{ext}"),
            None => hash.to_hex(),
        };
        Self {
            hash,
            extension,
            rendered,
        }
    }

    /// Digest part of the key
    #[inline]
    #[must_use]
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    /// Extension hint, without the dot
    #[inline]
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// Key as it appears in documents and archives
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    /// Check whether `content` is what this key names
    #[inline]
    #[must_use]
    pub fn matches(&self, content: &[u8]) -> bool {
        ContentHash::compute(content) == self.hash
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.rendered
    }
}

impl From<ResourceKey> for String {
    fn from(key: ResourceKey) -> Self {
        key.rendered
    }
}

impl FromStr for ResourceKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (digest, extension) = match s.split_once('.') {
            Some((digest, ext)) => {
                if ext.is_empty() {
                    return Err(KeyError::EmptyExtension(s.to_owned()));
                }
                (digest, Some(ext))
            }
            None => (s, None),
        };
        if digest.len() != HASH_HEX_LEN {
            return Err(KeyError::InvalidDigest {
                key: s.to_owned(),
                source: HashError::InvalidLength {
                    expected: HASH_HEX_LEN,
                    actual: digest.len(),
                },
            });
        }
        let hash = digest.parse().map_err(|source| KeyError::InvalidDigest {
            key: s.to_owned(),
            source,
        })?;
        Ok(Self::from_parts(hash, extension))
    }
}

impl serde::Serialize for ResourceKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.rendered)
    }
}

impl<'de> serde::Deserialize<'de> for ResourceKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors from parsing resource keys
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// Digest part is not 64 lowercase hex chars
    #[error("invalid digest in resource key '{key}': {source}")]
    InvalidDigest {
        key: String,
        #[source]
        source: HashError,
    },

    /// Trailing dot without an extension
    #[error("resource key '{0}' has an empty extension")]
    EmptyExtension(String),
}
