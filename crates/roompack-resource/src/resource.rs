//! Resources and resource maps
//!
//! A [`Resource`] owns the bytes produced while resolving one reference. The
//! [`ResourceMap`] collects them by key; merging two maps is a plain union
//! where the later map wins, which is harmless because equal keys name equal
//! bytes.

use crate::key::ResourceKey;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// Media type used when nothing better is known
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Byte payload plus its media type
#[derive(Clone, PartialEq, Eq)]
pub struct Resource {
    content: Vec<u8>,
    media_type: String,
}

impl Resource {
    /// Create a resource
    #[inline]
    #[must_use]
    pub fn new(content: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            content,
            media_type: media_type.into(),
        }
    }

    /// Raw bytes
    #[inline]
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Media type, e.g. `image/png`
    #[inline]
    #[must_use]
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Size in bytes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Check for an empty payload
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Metadata-only view embedded into documents
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> ResourceMetadata {
        ResourceMetadata {
            media_type: self.media_type.clone(),
        }
    }
}

// Payloads can be megabytes; print the size instead.
impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("len", &self.content.len())
            .field("media_type", &self.media_type)
            .finish()
    }
}

/// Document-embedded view of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    /// Media type
    #[serde(rename = "type")]
    pub media_type: String,
}

impl ResourceMetadata {
    /// Render as the JSON record stored under the document's `resources` field
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut record = Map::new();
        record.insert("type".to_owned(), Value::String(self.media_type.clone()));
        Value::Object(record)
    }
}

/// Resources keyed by content-derived key
///
/// Ordered by key so that anything written from it is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceMap {
    entries: BTreeMap<ResourceKey, Resource>,
}

impl ResourceMap {
    /// Create empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map holding a single resource
    #[must_use]
    pub fn single(key: ResourceKey, resource: Resource) -> Self {
        let mut map = Self::new();
        map.insert(key, resource);
        map
    }

    /// Insert, replacing any previous entry under `key`
    pub fn insert(&mut self, key: ResourceKey, resource: Resource) -> Option<Resource> {
        self.entries.insert(key, resource)
    }

    /// Union `other` into `self`; entries from `other` win on collision
    pub fn merge(&mut self, other: ResourceMap) {
        for (key, resource) in other.entries {
            if let Some(previous) = self.entries.get(&key) {
                if previous.media_type() != resource.media_type() {
                    tracing::warn!(
                        key = %key,
                        previous = previous.media_type(),
                        replacement = resource.media_type(),
                        "resource key merged with differing media type"
                    );
                }
            }
            self.entries.insert(key, resource);
        }
    }

    /// Fold many maps into one, later maps winning
    #[must_use]
    pub fn union_all<I>(maps: I) -> Self
    where
        I: IntoIterator<Item = ResourceMap>,
    {
        maps.into_iter().fold(Self::new(), |mut acc, map| {
            acc.merge(map);
            acc
        })
    }

    /// Look up a resource
    #[inline]
    #[must_use]
    pub fn get(&self, key: &ResourceKey) -> Option<&Resource> {
        self.entries.get(key)
    }

    /// Look up a resource by its rendered key
    #[must_use]
    pub fn get_by_str(&self, key: &str) -> Option<&Resource> {
        key.parse::<ResourceKey>()
            .ok()
            .and_then(|key| self.entries.get(&key))
    }

    /// Check whether a key is present
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &ResourceKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of distinct resources
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total payload size in bytes
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.entries.values().map(Resource::len).sum()
    }

    /// Iterate in key order
    pub fn iter(&self) -> btree_map::Iter<'_, ResourceKey, Resource> {
        self.entries.iter()
    }

    /// Iterate over keys in order
    pub fn keys(&self) -> btree_map::Keys<'_, ResourceKey, Resource> {
        self.entries.keys()
    }

    /// Metadata records for embedding in a document, keyed by rendered key
    #[must_use]
    pub fn metadata(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(key, resource)| (key.to_string(), resource.metadata().to_value()))
            .collect()
    }
}

impl IntoIterator for ResourceMap {
    type Item = (ResourceKey, Resource);
    type IntoIter = btree_map::IntoIter<ResourceKey, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResourceMap {
    type Item = (&'a ResourceKey, &'a Resource);
    type IntoIter = btree_map::Iter<'a, ResourceKey, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(ResourceKey, Resource)> for ResourceMap {
    fn from_iter<T: IntoIterator<Item = (ResourceKey, Resource)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (key, resource) in iter {
            map.insert(key, resource);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(bytes: &[u8]) -> (ResourceKey, Resource) {
        (
            ResourceKey::for_content(bytes, Some("png")),
            Resource::new(bytes.to_vec(), "image/png"),
        )
    }

    #[test]
    fn resource_accessors() {
        let resource = Resource::new(vec![1, 2, 3], "image/png");
        assert_eq!(resource.content(), &[1, 2, 3]);
        assert_eq!(resource.media_type(), "image/png");
        assert_eq!(resource.len(), 3);
        assert!(!resource.is_empty());
    }

    #[test]
    fn resource_debug_hides_bytes() {
        let resource = Resource::new(vec![0; 4096], "image/png");
        let debug = format!("{resource:?}");
        assert!(debug.contains("4096"));
        assert!(debug.len() < 100);
    }

    #[test]
    fn metadata_value_shape() {
        let resource = Resource::new(vec![1], "image/jpeg");
        assert_eq!(
            resource.metadata().to_value(),
            serde_json::json!({ "type": "image/jpeg" })
        );
    }

    #[test]
    fn merge_identical_keys_collapses() {
        let (key, resource) = png(b"same");
        let mut left = ResourceMap::single(key.clone(), resource.clone());
        let right = ResourceMap::single(key.clone(), resource);

        left.merge(right);
        assert_eq!(left.len(), 1);
        assert!(left.contains_key(&key));
    }

    #[test]
    fn merge_later_entry_wins() {
        let key = ResourceKey::for_content(b"x", Some("bin"));
        let mut left = ResourceMap::single(key.clone(), Resource::new(b"x".to_vec(), "a/first"));
        left.merge(ResourceMap::single(
            key.clone(),
            Resource::new(b"x".to_vec(), "a/second"),
        ));
        assert_eq!(left.get(&key).unwrap().media_type(), "a/second");
    }

    #[test]
    fn union_all_of_disjoint_maps() {
        let maps = vec![
            ResourceMap::from_iter([png(b"a")]),
            ResourceMap::new(),
            ResourceMap::from_iter([png(b"b"), png(b"c")]),
        ];
        let merged = ResourceMap::union_all(maps);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.total_bytes(), 3);
    }

    #[test]
    fn get_by_str_uses_rendered_key() {
        let (key, resource) = png(b"lookup");
        let map = ResourceMap::single(key.clone(), resource);
        assert!(map.get_by_str(key.as_str()).is_some());
        assert!(map.get_by_str("not-a-key").is_none());
    }

    #[test]
    fn metadata_keyed_by_rendered_key() {
        let (key, resource) = png(b"meta");
        let map = ResourceMap::single(key.clone(), resource);
        let meta = map.metadata();
        assert_eq!(
            meta.get(key.as_str()),
            Some(&serde_json::json!({ "type": "image/png" }))
        );
    }
}
