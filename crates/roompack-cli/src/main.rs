mod config;
mod logging;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command};
use config::CliConfig;
use roompack_archive::{ArchiveSummary, ArchiveWriter};
use roompack_bundle::ResolverRegistry;
use roompack_resolvers::{CardResolver, GlyphCardRenderer, LocalResolver, CARD, LOCAL};
use serde_json::Value;
use std::path::{Path, PathBuf};

fn cli() -> Command {
    Command::new("roompack")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Bundle a room document and its referenced content into a zip archive")
        .arg(
            Arg::new("source")
                .value_parser(value_parser!(PathBuf))
                .help("Room document (JSON)"),
        )
        .arg(
            Arg::new("target")
                .value_parser(value_parser!(PathBuf))
                .help("Archive to write"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("font")
                .long("font")
                .value_parser(value_parser!(PathBuf))
                .help("Font used to render cards (enables the card resolver)"),
        )
}

#[tokio::main]
async fn main() {
    let mut command = cli();
    let matches = command.clone().get_matches();

    let (Some(source), Some(target)) = (
        matches.get_one::<PathBuf>("source"),
        matches.get_one::<PathBuf>("target"),
    ) else {
        command.print_help().ok();
        println!();
        std::process::exit(0);
    };

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("roompack: {e:#}");
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init(&config.log_level) {
        eprintln!("roompack: {e:#}");
        std::process::exit(1);
    }

    match run(source, target, &config).await {
        Ok(summary) => {
            tracing::info!(resources = summary.resources, "done");
        }
        Err(e) => {
            tracing::error!("{e:#}");
            std::process::exit(1);
        }
    }
}

fn load_config(matches: &ArgMatches) -> Result<CliConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::new(),
    };
    if let Some(font) = matches.get_one::<PathBuf>("font") {
        config = config.with_font_path(font);
    }
    config.validate()?;
    Ok(config)
}

/// Registry for a run: `local` always, `card` when a font is configured
fn build_registry(config: &CliConfig) -> Result<ResolverRegistry> {
    let mut registry = ResolverRegistry::new();
    registry.register(LOCAL, LocalResolver::new().with_max_file_size(config.max_file_size));

    if let Some(font) = &config.font_path {
        let renderer = GlyphCardRenderer::from_file(font)
            .with_context(|| format!("failed to load font {}", font.display()))?;
        registry.register(CARD, CardResolver::new(renderer));
    }

    tracing::debug!(resolvers = ?registry.names(), "registry ready");
    Ok(registry)
}

async fn run(source: &Path, target: &Path, config: &CliConfig) -> Result<ArchiveSummary> {
    let raw = tokio::fs::read(source)
        .await
        .with_context(|| format!("failed to read {}", source.display()))?;
    let document: Value = serde_json::from_slice(&raw)
        .with_context(|| format!("{} is not valid JSON", source.display()))?;

    let base_path = source.parent().unwrap_or_else(|| Path::new("."));
    let registry = build_registry(config)?;

    tracing::info!(source = %source.display(), "bundling");
    let bundle = roompack_bundle::bundle(document, base_path, &registry)
        .await
        .with_context(|| format!("failed to bundle {}", source.display()))?;

    ArchiveWriter::new()
        .with_compression(config.compression)
        .write(target, bundle)
        .await
        .with_context(|| format!("failed to write {}", target.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use roompack_resource::ResourceKey;
    use roompack_test_utils::{png_bytes, room_with_decks, TempRoom};
    use serde_json::json;
    use std::io::Read;

    fn read_member(path: &Path, name: &str) -> Vec<u8> {
        let mut archive = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
        let mut buf = Vec::new();
        archive.by_name(name).unwrap().read_to_end(&mut buf).unwrap();
        buf
    }

    #[test]
    fn cli_parses_positionals_and_flags() {
        let matches = cli()
            .try_get_matches_from(["roompack", "room.json", "out.zip", "--font", "f.otf"])
            .unwrap();
        assert_eq!(matches.get_one::<PathBuf>("source"), Some(&PathBuf::from("room.json")));
        assert_eq!(matches.get_one::<PathBuf>("target"), Some(&PathBuf::from("out.zip")));

        let config = load_config(&matches).unwrap();
        assert_eq!(config.font_path, Some(PathBuf::from("f.otf")));
    }

    #[test]
    fn cli_allows_missing_positionals() {
        let matches = cli().try_get_matches_from(["roompack"]).unwrap();
        assert!(matches.get_one::<PathBuf>("source").is_none());
    }

    #[test]
    fn registry_without_font_has_only_local() {
        let registry = build_registry(&CliConfig::new()).unwrap();
        assert_eq!(registry.names(), vec![LOCAL]);
    }

    #[test]
    fn registry_with_bad_font_fails() {
        let room = TempRoom::new();
        let font = room.write("broken.otf", b"not a font");
        assert!(build_registry(&CliConfig::new().with_font_path(font)).is_err());
    }

    #[tokio::test]
    async fn run_writes_archive() {
        let room = TempRoom::new();
        let image = png_bytes(2, 2, [255, 0, 0, 255]);
        room.write("a.png", &image);
        let source = room.write_json("room.json", &room_with_decks(2, "a.png"));
        let target = room.join("room.zip");

        let summary = run(&source, &target, &CliConfig::new()).await.unwrap();
        assert_eq!(summary.resources, 1);

        let key = ResourceKey::for_content(&image, Some("png")).to_string();
        let data: Value = serde_json::from_slice(&read_member(&target, "__data.json")).unwrap();
        assert_eq!(data["decks"][0]["back"], json!(key));
        assert_eq!(data["decks"][1]["back"], json!(key));
        assert_eq!(data["resources"][&key], json!({ "type": "image/png" }));
        assert_eq!(read_member(&target, &key), image);
        assert_eq!(read_member(&target, ".token"), summary.token.as_bytes());
    }

    #[tokio::test]
    async fn run_fails_on_missing_reference() {
        let room = TempRoom::new();
        let source = room.write_json("room.json", &room_with_decks(1, "missing.png"));
        let err = run(&source, &room.join("out.zip"), &CliConfig::new())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("missing.png"));
        assert!(!room.join("out.zip").exists());
    }

    #[tokio::test]
    async fn run_fails_on_invalid_json() {
        let room = TempRoom::new();
        let source = room.write("room.json", b"{ not json");
        assert!(run(&source, &room.join("out.zip"), &CliConfig::new()).await.is_err());
    }
}
