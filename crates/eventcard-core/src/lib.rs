//! eventcard - branded social cards for event registrations
//!
//! Renders a registrant's card for an event: layout is resolved once with
//! all text measured up front, drawing stages produce a flat list of draw
//! instructions, and the finished card is encoded to SVG, PNG or JPEG.
//!
//! # Example
//!
//! ```
//! use eventcard_core::render_document;
//!
//! let json = r#"{
//!     "meta": { "event": "through-her-lens", "theme": "dark" },
//!     "registrant": { "name": "Ada Lovelace", "role": "attendee" }
//! }"#;
//!
//! let result = render_document(json)?;
//! assert!(result.svg.contains("<svg"));
//! println!("{}", result.svg);
//! # Ok::<(), eventcard_core::RenderError>(())
//! ```

pub mod card;
pub mod color;
pub mod config;
pub mod export;
pub mod fonts;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod legacy;
pub mod photo;
#[cfg(feature = "raster")]
pub mod raster;
pub mod render;
pub mod svg;
pub mod text;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

pub use card::{CardRenderer, RenderedCard, Stage, render_card};
pub use config::{EventConfig, EventSlug, Theme};
pub use export::{EncodeError, EncodedImage, ExportFormat, RasterOptions, encode};
pub use fonts::{FontBook, FontError, FontsReady};
pub use geometry::{CanvasGeometry, CardKind, GeometryProfile};
pub use input::{InputError, RegistrantInput, Role, RoleDetails};
pub use layout::CardLayoutSpec;
pub use photo::{DecodedPhoto, PhotoError};
pub use render::RenderTree;
pub use svg::SvgOptions;
pub use text::{ApproxMeasure, ParleyMeasure, TextMeasure};

/// Errors raised while producing a card.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No raster surface could be created for the card's size.
    #[error("render surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// The background task running a render or encode did not complete.
    #[error("render task failed: {0}")]
    Task(String),

    /// Measurement was attempted before font loading finished.
    #[error("fonts are not ready")]
    FontsNotReady,

    #[error("invalid photo: {0}")]
    Photo(#[from] PhotoError),

    #[error("invalid registrant: {0}")]
    Input(#[from] InputError),

    #[error(transparent)]
    Encode(EncodeError),

    #[error("invalid card document: {0}")]
    Document(String),

    /// A newer render for the same registrant was requested meanwhile.
    #[error("render superseded by a newer request")]
    Superseded,
}

impl From<EncodeError> for RenderError {
    fn from(err: EncodeError) -> Self {
        match err {
            #[cfg(feature = "raster")]
            EncodeError::Raster(raster::RasterError::InvalidSize { width, height }) => {
                Self::SurfaceUnavailable(format!("{width}x{height}"))
            }
            other => Self::Encode(other),
        }
    }
}

/// Render the card of `event`, dispatching on the event's card design.
///
/// `template` is only used by template cards.
pub fn render_event_card<M: TextMeasure + ?Sized>(
    event: EventSlug,
    theme: Theme,
    geometry: &CanvasGeometry,
    registrant: &RegistrantInput,
    photo: Option<&DecodedPhoto>,
    template: Option<&DecodedPhoto>,
    measure: &mut M,
) -> RenderedCard {
    let config = event.config();
    tracing::debug!(
        event = event.as_str(),
        theme = theme.as_str(),
        role = registrant.role().as_str(),
        width = geometry.canvas_width,
        "rendering card"
    );
    match config.card {
        CardKind::Composited => render_card(config, theme, geometry, registrant, photo, measure),
        CardKind::Template => {
            legacy::render_template_card(geometry, registrant, template, photo, measure)
        }
    }
}

// ============================================================================
// JSON document entry point
// ============================================================================

/// Render options carried in a card document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardOptions {
    pub event: EventSlug,
    /// Defaults to the event's theme.
    #[serde(default)]
    pub theme: Option<Theme>,
    /// Preview viewport width. Without it the export geometry is used.
    #[serde(default)]
    pub viewport_width: Option<f32>,
    /// Base64-encoded profile photo.
    #[serde(default)]
    pub photo_data: Option<String>,
    /// Base64-encoded template image for template cards.
    #[serde(default)]
    pub template_data: Option<String>,
}

/// A self-contained card document: render options plus the registrant.
///
/// ```json
/// {
///   "meta": { "event": "through-her-lens", "viewportWidth": 390 },
///   "registrant": { "name": "Ada", "role": "speaker", "talkTitle": "...", "bio": "..." }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDocument {
    pub meta: CardOptions,
    pub registrant: RegistrantInput,
}

/// Result of rendering a document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardResult {
    /// Generated SVG string
    pub svg: String,
    pub width: f32,
    pub height: f32,
    /// Non-fatal problems, such as an undecodable photo
    pub warnings: Vec<String>,
}

/// Render a JSON card document to SVG with approximate text measurement.
pub fn render_document(doc_json: &str) -> Result<CardResult, RenderError> {
    let doc: CardDocument =
        serde_json::from_str(doc_json).map_err(|e| RenderError::Document(e.to_string()))?;
    render_card_document(&doc, &mut ApproxMeasure)
}

/// Render a parsed card document to SVG.
pub fn render_card_document<M: TextMeasure + ?Sized>(
    doc: &CardDocument,
    measure: &mut M,
) -> Result<CardResult, RenderError> {
    doc.registrant.validate()?;

    let mut warnings = Vec::new();
    let mut decode = |label: &str, data: Option<&str>| -> Option<DecodedPhoto> {
        let bytes = match STANDARD.decode(data?) {
            Ok(bytes) => bytes,
            Err(e) => {
                warnings.push(format!("{label}: invalid base64: {e}"));
                return None;
            }
        };
        match DecodedPhoto::from_bytes(bytes) {
            Ok(photo) => Some(photo),
            Err(e) => {
                warnings.push(format!("{label}: {e}"));
                None
            }
        }
    };
    let photo = decode("photo", doc.meta.photo_data.as_deref());
    let template = decode("template", doc.meta.template_data.as_deref());

    let event = doc.meta.event;
    let kind = event.config().card;
    let geometry = match doc.meta.viewport_width {
        Some(width) => geometry::resolve(kind, width),
        None => CanvasGeometry::export(kind),
    };
    let theme = doc.meta.theme.unwrap_or(event.config().default_theme);

    let card = render_event_card(
        event,
        theme,
        &geometry,
        &doc.registrant,
        photo.as_ref(),
        template.as_ref(),
        measure,
    );

    Ok(CardResult {
        svg: svg::to_svg(card.tree(), &SvgOptions::default()),
        width: card.width(),
        height: card.height(),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_document_speaker() {
        let json = r###"{
            "meta": { "event": "through-her-lens", "theme": "light" },
            "registrant": {
                "name": "Ada Lovelace",
                "role": "speaker",
                "talkTitle": "Light & Shadow",
                "bio": "Photographer"
            }
        }"###;

        let result = render_document(json).unwrap();
        assert_eq!((result.width, result.height), (1080.0, 1080.0));
        assert!(result.svg.contains("SPEAKING ON"));
        assert!(result.svg.contains("Light &amp; Shadow"));
        assert!(result.svg.contains("#f8f5f0"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_preview_viewport_uses_compact_geometry() {
        let json = r#"{
            "meta": { "event": "through-her-lens", "viewportWidth": 390 },
            "registrant": { "name": "Ada", "role": "attendee" }
        }"#;
        let result = render_document(json).unwrap();
        assert_eq!(result.width, 540.0);
    }

    #[test]
    fn test_template_event_uses_template_card() {
        let json = r#"{
            "meta": { "event": "this-is-lagos" },
            "registrant": { "name": "Tolu Ade", "role": "attendee" }
        }"#;
        let result = render_document(json).unwrap();
        assert_eq!((result.width, result.height), (900.0, 1062.0));
        assert!(result.svg.contains(">TOLU</text>"));
    }

    #[test]
    fn test_bad_photo_is_a_warning() {
        let json = r#"{
            "meta": { "event": "through-her-lens", "photoData": "bm90IGFuIGltYWdl" },
            "registrant": { "name": "Ada", "role": "attendee" }
        }"#;
        let result = render_document(json).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(!result.svg.contains("<image"));
    }

    #[test]
    fn test_photo_with_corrupt_pixels_skips_photo_stage() {
        let mut png = crate::photo::tests::png_bytes(32, 32);
        png.truncate(png.len() - 16);
        let json = format!(
            r#"{{
                "meta": {{ "event": "through-her-lens", "photoData": "{}" }},
                "registrant": {{ "name": "Ada", "role": "attendee" }}
            }}"#,
            STANDARD.encode(&png)
        );
        let result = render_document(&json).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(!result.svg.contains("<image"));
        assert!(!result.svg.contains("<circle"));
        assert!(!result.svg.contains("clipPath"));
    }

    #[test]
    fn test_invalid_document() {
        let err = render_document("not valid json").unwrap_err();
        assert!(matches!(err, RenderError::Document(_)));

        let blank = r#"{
            "meta": { "event": "through-her-lens" },
            "registrant": { "name": " ", "role": "attendee" }
        }"#;
        assert!(matches!(
            render_document(blank).unwrap_err(),
            RenderError::Input(InputError::EmptyName)
        ));
    }

    #[cfg(feature = "raster")]
    #[test]
    fn test_zero_size_card_has_no_surface() {
        let card = RenderedCard::new(CardKind::Composited, RenderTree::new(0.0, 1080.0));
        let err = encode(&card, ExportFormat::Png, &RasterOptions::default()).unwrap_err();
        assert!(matches!(
            RenderError::from(err),
            RenderError::SurfaceUnavailable(size) if size == "0x1080"
        ));
    }

    #[test]
    fn test_other_encode_failures_stay_encode_errors() {
        let err = RenderError::from(EncodeError::Png("boom".into()));
        assert!(matches!(err, RenderError::Encode(EncodeError::Png(_))));
    }
}
