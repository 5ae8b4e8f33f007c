//! Testing utilities for roompack workspace
//!
//! Shared test helpers, fixtures, and stub resolvers.

#![allow(missing_docs)]

use image::{ImageFormat, Rgba, RgbaImage};
use roompack_bundle::{resolver_fn, Resolution, ResolveError, Resolver};
use roompack_resource::{Resource, ResourceKey};
use serde_json::{json, Value};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch directory standing in for a room's source folder
pub struct TempRoom {
    dir: TempDir,
}

impl TempRoom {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write `bytes` at `relative`, creating parent directories
    pub fn write(&self, relative: &str, bytes: &[u8]) -> PathBuf {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, bytes).unwrap();
        path
    }

    pub fn write_json(&self, relative: &str, value: &Value) -> PathBuf {
        self.write(relative, serde_json::to_string_pretty(value).unwrap().as_bytes())
    }
}

impl Default for TempRoom {
    fn default() -> Self {
        Self::new()
    }
}

/// Solid-color PNG
pub fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    encode(RgbaImage::from_pixel(width, height, Rgba(color)), ImageFormat::Png)
}

/// Solid-color JPEG
pub fn jpeg_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let [r, g, b] = color;
    let rgba = RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]));
    let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
    let mut out = Cursor::new(Vec::new());
    rgb.write_to(&mut out, ImageFormat::Jpeg).unwrap();
    out.into_inner()
}

fn encode(img: RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}

/// Fonts tried, in order, when `ROOMPACK_TEST_FONT` is unset
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/Library/Fonts/Arial Unicode.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// A TrueType font for rendering tests, if the machine has one
///
/// Tests that draw glyphs return early when this is `None`.
pub fn test_font() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("ROOMPACK_TEST_FONT") {
        return Some(PathBuf::from(path));
    }
    FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}

/// Resolver that turns every node into a resource holding `content`
pub fn fixed_resolver(content: &'static [u8], extension: &'static str, media_type: &'static str) -> impl Resolver {
    resolver_fn(move |_node, _base| async move {
        let key = ResourceKey::for_content(content, Some(extension));
        Ok::<_, ResolveError>(Resolution::single(key, Resource::new(content.to_vec(), media_type)))
    })
}

/// Resolver that returns the node's `value` field verbatim, with no resources
pub fn echo_resolver() -> impl Resolver {
    resolver_fn(|node, _base| async move {
        Ok::<_, ResolveError>(Resolution::data_only(
            node.get("value").cloned().unwrap_or(Value::Null),
        ))
    })
}

/// Resolver that always fails with a render error carrying `message`
pub fn failing_resolver(message: &'static str) -> impl Resolver {
    resolver_fn(move |_node, _base| async move {
        Err::<Resolution, _>(ResolveError::Render(message.to_string()))
    })
}

/// Local-file reference node
pub fn local_ref(path: &str) -> Value {
    json!({ "$": "local", "path": path })
}

/// Card reference node with one content item per title
pub fn card_ref(base_image: &str, titles: &[&str]) -> Value {
    let contents: Vec<Value> = titles.iter().map(|t| json!({ "title": t })).collect();
    json!({ "$": "card", "baseImagePath": base_image, "contents": contents })
}

/// Room document whose decks all point at the same local file
pub fn room_with_decks(deck_count: usize, image: &str) -> Value {
    let decks: Vec<Value> = (0..deck_count)
        .map(|i| json!({ "name": format!("deck-{i}"), "back": local_ref(image) }))
        .collect();
    json!({ "name": "test-room", "decks": decks })
}
