//! `local` resolver
//!
//! Replaces `{"$": "local", "path": "<relative path>"}` with the key of the
//! file's bytes and emits the file as a resource.

use crate::media::{extension_of, media_type_or_default};
use crate::params::{required_str, under_base};
use async_trait::async_trait;
use roompack_bundle::{Resolution, ResolveError, ResolveResult, Resolver};
use roompack_resource::{Resource, ResourceKey};
use serde_json::{Map, Value};
use std::path::Path;

/// Discriminator value this resolver is usually registered under
pub const LOCAL: &str = "local";

/// Default size limit for a single file (10MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Loads files relative to the document's directory
#[derive(Debug, Clone, Copy)]
pub struct LocalResolver {
    max_file_size: u64,
}

impl LocalResolver {
    /// Create resolver with the default size limit
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// With a different size limit in bytes
    #[inline]
    #[must_use]
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Configured size limit in bytes
    #[inline]
    #[must_use]
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Read `relative` under `base_path` and build its resource
    ///
    /// # Errors
    /// - `ResolveError::InvalidParameter` if `relative` is absolute or rooted
    /// - `ResolveError::Io` if the file cannot be read
    /// - `ResolveError::TooLarge` if it exceeds the size limit
    pub async fn load(&self, base_path: &Path, relative: &str) -> ResolveResult<(ResourceKey, Resource)> {
        let path = under_base(base_path, relative, LOCAL, "path")?;

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| ResolveError::io_error(&path, e))?;
        if metadata.len() > self.max_file_size {
            return Err(ResolveError::TooLarge {
                path,
                size: metadata.len(),
                limit: self.max_file_size,
            });
        }

        let content = tokio::fs::read(&path)
            .await
            .map_err(|e| ResolveError::io_error(&path, e))?;

        let key = ResourceKey::for_content(&content, extension_of(&path));
        let media_type = media_type_or_default(key.as_str());
        tracing::debug!(path = %path.display(), key = %key.hash().short(), media_type, "loaded local file");

        Ok((key, Resource::new(content, media_type)))
    }
}

impl Default for LocalResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resolver for LocalResolver {
    async fn resolve(
        &self,
        node: &Map<String, Value>,
        base_path: &Path,
    ) -> ResolveResult<Resolution> {
        let relative = required_str(node, LOCAL, "path")?;
        let (key, resource) = self.load(base_path, relative).await?;
        Ok(Resolution::single(key, resource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roompack_test_utils::{png_bytes, TempRoom};
    use serde_json::json;

    fn node(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn resolves_file_to_key() {
        let room = TempRoom::new();
        let bytes = png_bytes(4, 4, [10, 20, 30, 255]);
        room.write("a.png", &bytes);

        let result = LocalResolver::new()
            .resolve(&node(json!({ "$": "local", "path": "a.png" })), room.path())
            .await
            .unwrap();

        let key = ResourceKey::for_content(&bytes, Some("png"));
        assert_eq!(result.data, json!(key.to_string()));
        let resource = result.resources.get(&key).unwrap();
        assert_eq!(resource.content(), bytes.as_slice());
        assert_eq!(resource.media_type(), "image/png");
    }

    #[tokio::test]
    async fn nested_relative_path() {
        let room = TempRoom::new();
        room.write("img/cover.jpg", b"not really a jpeg");

        let result = LocalResolver::new()
            .resolve(&node(json!({ "$": "local", "path": "img/cover.jpg" })), room.path())
            .await
            .unwrap();

        let key = result.resources.keys().next().unwrap();
        assert_eq!(key.extension(), Some("jpg"));
        assert_eq!(result.resources.get(key).unwrap().media_type(), "image/jpeg");
    }

    #[tokio::test]
    async fn unknown_extension_is_octet_stream() {
        let room = TempRoom::new();
        room.write("blob.weird", b"data");

        let result = LocalResolver::new()
            .resolve(&node(json!({ "$": "local", "path": "blob.weird" })), room.path())
            .await
            .unwrap();
        let (_, resource) = result.resources.iter().next().unwrap();
        assert_eq!(resource.media_type(), "application/octet-stream");
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let room = TempRoom::new();
        let err = LocalResolver::new()
            .resolve(&node(json!({ "$": "local", "path": "not-exist.png" })), room.path())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Io { .. }));
    }

    #[tokio::test]
    async fn missing_path_parameter() {
        let err = LocalResolver::new()
            .resolve(&node(json!({ "$": "local" })), Path::new("."))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::MissingParameter {
                resolver: "local",
                parameter: "path"
            }
        ));
    }

    #[tokio::test]
    async fn non_string_path_parameter() {
        let err = LocalResolver::new()
            .resolve(&node(json!({ "$": "local", "path": ["a.png"] })), Path::new("."))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidParameter { .. }));
    }

    #[tokio::test]
    async fn oversized_file_rejected() {
        let room = TempRoom::new();
        room.write("big.bin", &[0u8; 64]);

        let err = LocalResolver::new()
            .with_max_file_size(16)
            .resolve(&node(json!({ "$": "local", "path": "big.bin" })), room.path())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::TooLarge { size: 64, limit: 16, .. }));
    }

    #[tokio::test]
    async fn absolute_path_cannot_leave_base() {
        let outside = TempRoom::new();
        let secret = outside.write("secret.txt", b"outside base");
        let room = TempRoom::new();

        let err = LocalResolver::new()
            .resolve(
                &node(json!({ "$": "local", "path": secret.to_str().unwrap() })),
                room.path(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::InvalidParameter {
                resolver: "local",
                parameter: "path",
                expected: "a relative path"
            }
        ));
    }
}
