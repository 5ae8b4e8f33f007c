//! End-to-end bundling of room documents.
//!
//! These tests drive `bundle` with the stock resolvers against real files in
//! a scratch directory:
//! - Local file references become content keys with `{type}` metadata.
//! - Identical content referenced from several places is stored once.
//! - Failures anywhere in the tree abort the whole run.
//! - Synthesized cards flow through the same merge path as files.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use roompack_bundle::{bundle, ResolveError, ResolveResult, ResolverRegistry};
use roompack_resolvers::{CardFormat, CardRenderer, CardResolver, LocalResolver, CARD, LOCAL};
use roompack_resource::ResourceKey;
use roompack_test_utils::{
    card_ref, echo_resolver, failing_resolver, fixed_resolver, local_ref, png_bytes,
    room_with_decks, TempRoom,
};
use serde_json::{json, Value};

/// Helper: registry with just the `local` resolver, as the CLI builds it
/// without a font.
fn local_registry() -> ResolverRegistry {
    ResolverRegistry::new().with(LOCAL, LocalResolver::new())
}

/// Renderer that writes the title into the output instead of drawing it.
struct TitleRenderer;

#[async_trait]
impl CardRenderer for TitleRenderer {
    async fn render(&self, base: &[u8], title: &str, _format: CardFormat) -> ResolveResult<Vec<u8>> {
        let mut out = base.to_vec();
        out.extend_from_slice(title.as_bytes());
        Ok(out)
    }
}

/// A single nested file reference is replaced by `<sha256>.png` and listed in
/// `resources` with its media type.
#[tokio::test]
async fn nested_file_reference_becomes_key() {
    let room = TempRoom::new();
    let image = png_bytes(3, 3, [0, 128, 255, 255]);
    room.write("a.png", &image);

    let document = json!({ "decks": { "D1": { "cover": local_ref("a.png") } } });
    let bundled = bundle(document, room.path(), &local_registry()).await.unwrap();

    let key = ResourceKey::for_content(&image, Some("png"));
    assert_eq!(
        bundled.data,
        json!({
            "decks": { "D1": { "cover": key.to_string() } },
            "resources": { key.to_string(): { "type": "image/png" } }
        })
    );
    assert_eq!(bundled.resources.len(), 1);
    let resource = bundled.resources.get(&key).unwrap();
    assert_eq!(resource.content(), image.as_slice());
    assert_eq!(resource.media_type(), "image/png");
}

/// Two decks pointing at the same file share one stored resource.
#[tokio::test]
async fn shared_file_is_stored_once() {
    let room = TempRoom::new();
    room.write("a.png", &png_bytes(2, 2, [1, 1, 1, 255]));

    let bundled = bundle(room_with_decks(2, "a.png"), room.path(), &local_registry())
        .await
        .unwrap();

    let first = &bundled.data["decks"][0]["back"];
    let second = &bundled.data["decks"][1]["back"];
    assert_eq!(first, second);
    assert_eq!(bundled.resources.len(), 1);
    assert_eq!(bundled.metadata().unwrap().len(), 1);
}

/// Same bytes under different extensions are distinct keys.
#[tokio::test]
async fn extension_is_part_of_the_key() {
    let room = TempRoom::new();
    room.write("a.png", b"same bytes");
    room.write("b.jpg", b"same bytes");

    let document = json!({ "a": local_ref("a.png"), "b": local_ref("b.jpg") });
    let bundled = bundle(document, room.path(), &local_registry()).await.unwrap();

    assert_ne!(bundled.data["a"], bundled.data["b"]);
    assert_eq!(bundled.resources.len(), 2);
}

/// References inside arrays, arrays of objects and deep objects are all found;
/// primitives around them are untouched.
#[tokio::test]
async fn references_found_at_any_depth() {
    let room = TempRoom::new();
    room.write("img/x.png", &png_bytes(1, 1, [9, 9, 9, 255]));

    let document = json!({
        "title": "room",
        "count": 3,
        "flags": [true, null, 1.5],
        "list": [local_ref("img/x.png"), "plain"],
        "pieces": [{ "face": local_ref("img/x.png"), "n": 1 }],
        "deep": { "a": { "b": { "c": local_ref("img/x.png") } } }
    });
    let bundled = bundle(document, room.path(), &local_registry()).await.unwrap();

    let key = bundled.data["list"][0].clone();
    assert!(key.as_str().unwrap().ends_with(".png"));
    assert_eq!(bundled.data["pieces"][0]["face"], key);
    assert_eq!(bundled.data["deep"]["a"]["b"]["c"], key);
    assert_eq!(bundled.data["list"][1], json!("plain"));
    assert_eq!(bundled.data["flags"], json!([true, null, 1.5]));
    assert_eq!(bundled.data["count"], json!(3));
    assert_eq!(bundled.resources.len(), 1);
}

/// A reference-free document comes back unchanged plus an empty `resources`.
#[tokio::test]
async fn reference_free_document_is_identity() {
    let document = json!({ "name": "plain", "decks": [{ "cards": [1, 2, 3] }] });
    let bundled = bundle(document.clone(), ".".as_ref(), &ResolverRegistry::new())
        .await
        .unwrap();

    let mut expected = document;
    expected["resources"] = json!({});
    assert_eq!(bundled.data, expected);
    assert!(bundled.resources.is_empty());
}

/// Pre-existing metadata survives; fresh entries are added next to it.
#[tokio::test]
async fn existing_metadata_is_kept() {
    let room = TempRoom::new();
    room.write("a.png", &png_bytes(1, 1, [0, 0, 0, 255]));

    let document = json!({
        "cover": local_ref("a.png"),
        "resources": { "legacy.bin": { "type": "application/octet-stream" } }
    });
    let bundled = bundle(document, room.path(), &local_registry()).await.unwrap();

    let metadata = bundled.metadata().unwrap();
    assert_eq!(metadata.len(), 2);
    assert!(metadata.contains_key("legacy.bin"));
}

/// An unknown discriminator fails the whole run, wherever it sits.
#[tokio::test]
async fn unknown_resolver_fails_run() {
    let room = TempRoom::new();
    room.write("a.png", &png_bytes(1, 1, [0, 0, 0, 255]));

    let document = json!({
        "ok": local_ref("a.png"),
        "bad": [{ "x": { "$": "nonexistent" } }]
    });
    let err = bundle(document, room.path(), &local_registry()).await.unwrap_err();
    assert!(matches!(err, ResolveError::UnknownResolver(ref name) if name == "nonexistent"));
    assert!(err.is_user_error());
}

/// A missing file fails the whole run with an I/O error naming the path.
#[tokio::test]
async fn missing_file_fails_run() {
    let room = TempRoom::new();
    let err = bundle(room_with_decks(1, "not-exist.png"), room.path(), &local_registry())
        .await
        .unwrap_err();
    match err {
        ResolveError::Io { path, .. } => assert!(path.ends_with("not-exist.png")),
        other => panic!("expected io error, got {other:?}"),
    }
}

/// Different resolvers producing the same bytes under the same extension
/// share one stored resource.
#[tokio::test]
async fn identical_output_across_resolvers_is_stored_once() {
    let room = TempRoom::new();
    room.write("logo.png", b"logo bytes");

    let registry = local_registry().with("logo", fixed_resolver(b"logo bytes", "png", "image/png"));
    let document = json!({ "a": local_ref("logo.png"), "b": { "$": "logo" } });
    let bundled = bundle(document, room.path(), &registry).await.unwrap();

    assert_eq!(bundled.data["a"], bundled.data["b"]);
    assert_eq!(bundled.resources.len(), 1);
}

/// Resolver errors reach the caller exactly as raised.
#[tokio::test]
async fn resolver_error_is_not_wrapped() {
    let registry = ResolverRegistry::new().with("broken", failing_resolver("disk on fire"));
    let err = bundle(json!({ "x": { "$": "broken" } }), ".".as_ref(), &registry)
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::Render(ref m) if m == "disk on fire"));
}

/// Resolver output is trusted: a reference-shaped value it returns stays as is.
#[tokio::test]
async fn resolver_output_not_rewalked() {
    let registry = ResolverRegistry::new()
        .with("echo", echo_resolver())
        .with(LOCAL, LocalResolver::new());
    let document = json!({
        "x": { "$": "echo", "value": local_ref("never-read.png") }
    });

    let bundled = bundle(document, ".".as_ref(), &registry).await.unwrap();
    assert_eq!(bundled.data["x"], local_ref("never-read.png"));
    assert!(bundled.resources.is_empty());
}

/// Cards and files resolve side by side; card images are keyed by content
/// with the base image's extension and listed in metadata.
#[tokio::test]
async fn cards_and_files_together() {
    let room = TempRoom::new();
    room.write("base.png", &png_bytes(8, 16, [0, 0, 0, 255]));

    let registry = local_registry().with(CARD, CardResolver::new(TitleRenderer));
    let document = json!({
        "background": local_ref("base.png"),
        "deck": { "cards": card_ref("base.png", &["one", "two", "three"]) }
    });
    let bundled = bundle(document, room.path(), &registry).await.unwrap();

    let cards = bundled.data["deck"]["cards"].as_object().unwrap();
    assert_eq!(cards.len(), 3);
    // three cards plus the background
    assert_eq!(bundled.resources.len(), 4);

    let metadata = bundled.metadata().unwrap();
    for card in cards.values() {
        let url = card["imageUrl"].as_str().unwrap();
        assert!(url.ends_with(".png"));
        assert_eq!(metadata[url], json!({ "type": "image/png" }));
    }
}

/// A top-level document that is not an object is rejected before resolution.
#[tokio::test]
async fn non_object_document_rejected() {
    for document in [json!([1, 2]), json!("room"), Value::Null] {
        let err = bundle(document, ".".as_ref(), &local_registry()).await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidDocument(_)));
    }
}
