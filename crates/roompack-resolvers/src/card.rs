//! `card` resolver
//!
//! Turns `{"$": "card", "baseImagePath": ..., "contents": [{"title", "memo"}]}`
//! into one generated image per item, keyed by a fresh random identifier.

use crate::media::{extension_of, media_type_or_default};
use crate::params::{required_array, required_str, under_base};
use crate::render::{CardFormat, CardRenderer};
use async_trait::async_trait;
use futures::future::try_join_all;
use rand::distr::Alphanumeric;
use rand::Rng;
use roompack_bundle::{Resolution, ResolveError, ResolveResult, Resolver};
use roompack_resource::{Resource, ResourceKey, ResourceMap};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

/// Discriminator value this resolver is usually registered under
pub const CARD: &str = "card";

/// Length of the identifiers assigned to card items
pub const ITEM_ID_LEN: usize = 20;

/// One entry of `contents`
#[derive(Debug, Clone, PartialEq)]
struct CardItem<'a> {
    title: &'a str,
    memo: Option<&'a Value>,
}

/// Renders card images from a shared base image
#[derive(Clone)]
pub struct CardResolver {
    renderer: Arc<dyn CardRenderer>,
}

impl CardResolver {
    /// Create resolver drawing with `renderer`
    #[must_use]
    pub fn new(renderer: impl CardRenderer + 'static) -> Self {
        Self {
            renderer: Arc::new(renderer),
        }
    }
}

impl std::fmt::Debug for CardResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardResolver").finish_non_exhaustive()
    }
}

#[async_trait]
impl Resolver for CardResolver {
    async fn resolve(
        &self,
        node: &Map<String, Value>,
        base_path: &Path,
    ) -> ResolveResult<Resolution> {
        let base_image = required_str(node, CARD, "baseImagePath")?;
        let items = parse_items(required_array(node, CARD, "contents")?)?;

        let path = under_base(base_path, base_image, CARD, "baseImagePath")?;
        let media_type = media_type_or_default(&path);
        let format = CardFormat::from_media_type(media_type).ok_or_else(|| {
            ResolveError::UnsupportedMediaType {
                resolver: CARD,
                media_type: media_type.to_string(),
            }
        })?;
        let extension = extension_of(&path);

        let base = tokio::fs::read(&path)
            .await
            .map_err(|e| ResolveError::io_error(&path, e))?;

        let renderer = &self.renderer;
        let base = base.as_slice();
        let rendered = try_join_all(
            items
                .iter()
                .map(|item| async move { renderer.render(base, item.title, format).await }),
        )
        .await?;

        let mut data = Map::with_capacity(items.len());
        let mut resources = ResourceMap::new();
        for (item, image) in items.iter().zip(rendered) {
            let key = ResourceKey::for_content(&image, extension);

            let mut entry = Map::new();
            entry.insert("imageUrl".into(), Value::String(key.to_string()));
            if let Some(memo) = item.memo {
                entry.insert("memo".into(), memo.clone());
            }
            data.insert(item_id(), Value::Object(entry));

            resources.insert(key, Resource::new(image, format.media_type()));
        }

        tracing::debug!(
            base = %path.display(),
            cards = items.len(),
            distinct = resources.len(),
            "rendered cards"
        );

        Ok(Resolution::new(Value::Object(data), resources))
    }
}

fn parse_items(contents: &[Value]) -> ResolveResult<Vec<CardItem<'_>>> {
    contents
        .iter()
        .map(|item| {
            let item = item
                .as_object()
                .ok_or_else(|| ResolveError::invalid(CARD, "contents", "an array of objects"))?;
            Ok(CardItem {
                title: required_str(item, CARD, "title")?,
                memo: item.get("memo"),
            })
        })
        .collect()
}

/// Fresh alphanumeric identifier from the thread-local CSPRNG
fn item_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ITEM_ID_LEN)
        .map(char::from)
        .collect()
}
