use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::{Parser, Subcommand, ValueEnum};
use eventcard_core::{
    ApproxMeasure, CanvasGeometry, CardDocument, DecodedPhoto, EventSlug, ExportFormat, FontBook,
    ParleyMeasure, RasterOptions, RegistrantInput, RoleDetails, TextMeasure, Theme, encode,
    geometry, render_event_card,
};
use tracing_subscriber::EnvFilter;

const INVALID_JSON: &str = "Invalid card document JSON";
const INVALID_REGISTRANT: &str = "Invalid registrant";

#[derive(Parser)]
#[command(name = "eventcard", version, about = "Render event social cards")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Png,
    Jpeg,
    Svg,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a card to PNG, JPEG or SVG
    Render {
        /// Card document JSON (meta + registrant). Overrides the registrant flags.
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Event slug
        #[arg(short, long, default_value = "through-her-lens")]
        event: String,

        /// Registrant name
        #[arg(short, long)]
        name: Option<String>,

        /// attendee or speaker
        #[arg(long, default_value = "attendee")]
        role: String,

        #[arg(long)]
        talk_title: Option<String>,

        #[arg(long)]
        bio: Option<String>,

        /// Profile photo file
        #[arg(long)]
        photo: Option<PathBuf>,

        /// Template image for template cards
        #[arg(long)]
        template: Option<PathBuf>,

        /// light or dark (defaults to the event's theme)
        #[arg(long)]
        theme: Option<String>,

        /// Render at preview size for this viewport width instead of export size
        #[arg(long)]
        viewport: Option<f32>,

        /// Output format (defaults to the event's preferred format)
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// JPEG quality
        #[arg(long, default_value_t = 95)]
        quality: u8,

        /// Directory of .ttf/.otf files used for measurement and rasterization
        #[arg(long)]
        fonts: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print version info
    Version,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            event,
            name,
            role,
            talk_title,
            bio,
            photo,
            template,
            theme,
            viewport,
            format,
            quality,
            fonts,
            output,
        } => {
            let request = match input {
                Some(path) => read_document(&path),
                None => document_from_flags(
                    &event,
                    name,
                    &role,
                    talk_title.as_deref(),
                    bio.as_deref(),
                    theme.as_deref(),
                    viewport,
                ),
            };

            let photo = photo
                .map(|path| read_photo(&path))
                .or_else(|| embedded_photo(request.meta.photo_data.as_deref()));
            let template = template
                .map(|path| read_photo(&path))
                .or_else(|| embedded_photo(request.meta.template_data.as_deref()));

            let fonts = fonts.map(|dir| {
                let mut book = FontBook::new();
                match book.load_dir(&dir) {
                    Ok(count) => eprintln!("Loaded {count} fonts from {}", dir.display()),
                    Err(e) => fail(&format!("Error loading fonts: {e}")),
                }
                book.ready()
            });
            let meta = &request.meta;
            let kind = meta.event.config().card;
            let format = match format {
                Some(Format::Png) => ExportFormat::Png,
                Some(Format::Jpeg) => ExportFormat::Jpeg { quality },
                Some(Format::Svg) => ExportFormat::Svg,
                None => ExportFormat::preferred(kind),
            };

            // Raster output is drawn with the system fonts when none are
            // given, so text is measured against them too.
            let mut measure: Box<dyn TextMeasure> = match &fonts {
                Some(ready) if !ready.is_empty() => Box::new(ParleyMeasure::new(ready)),
                _ if matches!(format, ExportFormat::Svg) => Box::new(ApproxMeasure),
                _ => Box::new(ParleyMeasure::system()),
            };

            let geometry = match meta.viewport_width {
                Some(width) => geometry::resolve(kind, width),
                None => CanvasGeometry::export(kind),
            };
            let theme = meta.theme.unwrap_or(meta.event.config().default_theme);

            let card = render_event_card(
                meta.event,
                theme,
                &geometry,
                &request.registrant,
                photo.as_ref(),
                template.as_ref(),
                measure.as_mut(),
            );

            let encoded = match encode(&card, format, &RasterOptions { fonts }) {
                Ok(encoded) => encoded,
                Err(e) => fail(&format!("Encode error: {e}")),
            };

            match output {
                Some(path) => {
                    if let Err(e) = fs::write(&path, &encoded.bytes) {
                        fail(&format!("Error writing {}: {}", path.display(), e));
                    }
                    eprintln!(
                        "Wrote {} ({}x{}, {})",
                        path.display(),
                        encoded.width,
                        encoded.height,
                        encoded.mime
                    );
                }
                None => {
                    if let Err(e) = std::io::stdout().write_all(&encoded.bytes) {
                        fail(&format!("Error writing output: {e}"));
                    }
                }
            }
        }
        Commands::Version => {
            println!("eventcard {}", env!("CARGO_PKG_VERSION"));
        }
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn read_document(path: &Path) -> CardDocument {
    let json = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => fail(&format!("Error reading {}: {}", path.display(), e)),
    };
    parse_document(&json).unwrap_or_else(|message| fail(&message))
}

/// Parse and validate a card document, keeping malformed JSON and an
/// unusable registrant apart in the message.
fn parse_document(json: &str) -> Result<CardDocument, String> {
    let doc: CardDocument =
        serde_json::from_str(json).map_err(|e| format!("{INVALID_JSON}: {e}"))?;
    doc.registrant
        .validate()
        .map_err(|e| format!("{INVALID_REGISTRANT}: {e}"))?;
    Ok(doc)
}

fn document_from_flags(
    event: &str,
    name: Option<String>,
    role: &str,
    talk_title: Option<&str>,
    bio: Option<&str>,
    theme: Option<&str>,
    viewport: Option<f32>,
) -> CardDocument {
    let event: EventSlug = event.parse().unwrap_or_else(|e: String| fail(&e));
    let theme = theme.map(|t| t.parse::<Theme>().unwrap_or_else(|e| fail(&e)));
    let role = RoleDetails::from_parts(role, talk_title, bio)
        .unwrap_or_else(|e| fail(&format!("{INVALID_REGISTRANT}: {e}")));
    let Some(name) = name else {
        fail("--name is required without --input");
    };

    let registrant = RegistrantInput {
        role,
        ..RegistrantInput::attendee(name)
    };
    if let Err(e) = registrant.validate() {
        fail(&format!("{INVALID_REGISTRANT}: {e}"));
    }

    CardDocument {
        meta: eventcard_core::CardOptions {
            event,
            theme,
            viewport_width: viewport,
            photo_data: None,
            template_data: None,
        },
        registrant,
    }
}

/// Decode a base64 image embedded in a card document. Bad data is skipped
/// with a warning, as the document renderer does.
fn embedded_photo(data: Option<&str>) -> Option<DecodedPhoto> {
    let bytes = match STANDARD.decode(data?) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring embedded image with invalid base64");
            return None;
        }
    };
    DecodedPhoto::from_bytes(bytes)
        .inspect_err(|e| tracing::warn!(error = %e, "ignoring undecodable embedded image"))
        .ok()
}

fn read_photo(path: &Path) -> DecodedPhoto {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => fail(&format!("Error reading {}: {}", path.display(), e)),
    };
    match DecodedPhoto::from_bytes(bytes) {
        Ok(photo) => photo,
        Err(e) => fail(&format!("Invalid image {}: {}", path.display(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let doc = parse_document(
            r#"{ "meta": { "event": "through-her-lens" }, "registrant": { "name": "Ada", "role": "attendee" } }"#,
        )
        .unwrap();
        assert_eq!(doc.registrant.name, "Ada");
    }

    #[test]
    fn test_malformed_json_is_reported_as_json() {
        let err = parse_document("{ not json").unwrap_err();
        assert!(err.starts_with(INVALID_JSON), "{err}");
    }

    #[test]
    fn test_invalid_registrant_is_reported_separately() {
        let blank = r#"{ "meta": { "event": "through-her-lens" }, "registrant": { "name": " ", "role": "attendee" } }"#;
        let err = parse_document(blank).unwrap_err();
        assert!(err.starts_with(INVALID_REGISTRANT), "{err}");

        let speaker = r#"{ "meta": { "event": "through-her-lens" }, "registrant": { "name": "Ada", "role": "speaker", "talkTitle": "", "bio": "" } }"#;
        let err = parse_document(speaker).unwrap_err();
        assert!(err.starts_with(INVALID_REGISTRANT), "{err}");
    }
}
