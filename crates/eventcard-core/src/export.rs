//! Export encoding of finished cards.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::card::RenderedCard;
use crate::fonts::FontsReady;
use crate::geometry::CardKind;
use crate::svg::{SvgOptions, to_svg};

/// Default JPEG quality for template cards.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Output format of an exported card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg { quality: u8 },
    Svg,
}

impl ExportFormat {
    /// Lossless PNG for composited cards, JPEG for photo-heavy template cards.
    pub fn preferred(kind: CardKind) -> Self {
        match kind {
            CardKind::Composited => ExportFormat::Png,
            CardKind::Template => ExportFormat::Jpeg {
                quality: DEFAULT_JPEG_QUALITY,
            },
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg { .. } => "image/jpeg",
            ExportFormat::Svg => "image/svg+xml",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg { .. } => "jpg",
            ExportFormat::Svg => "svg",
        }
    }

    /// Parse a short format name such as `"png"`, `"jpeg"`/`"jpg"` or `"svg"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpeg" | "jpg" => Some(ExportFormat::Jpeg {
                quality: DEFAULT_JPEG_QUALITY,
            }),
            "svg" => Some(ExportFormat::Svg),
            _ => None,
        }
    }
}

/// Options for raster encoding.
#[derive(Debug, Clone, Default)]
pub struct RasterOptions {
    /// Fonts for text rendering. System fonts are used when absent or empty.
    pub fonts: Option<FontsReady>,
}

/// Errors raised while encoding.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("raster output is not available in this build")]
    RasterUnavailable,

    #[cfg(feature = "raster")]
    #[error(transparent)]
    Raster(#[from] crate::raster::RasterError),

    #[error("PNG encoding failed: {0}")]
    Png(String),

    #[error("JPEG encoding failed: {0}")]
    Jpeg(#[from] image::ImageError),
}

/// An encoded card image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Encode a finished card.
pub fn encode(
    card: &RenderedCard,
    format: ExportFormat,
    options: &RasterOptions,
) -> Result<EncodedImage, EncodeError> {
    let width = card.width().round() as u32;
    let height = card.height().round() as u32;

    let bytes = match format {
        ExportFormat::Svg => to_svg(card.tree(), &SvgOptions::default()).into_bytes(),
        ExportFormat::Png => encode_png(card, options)?,
        ExportFormat::Jpeg { quality } => encode_jpeg(card, options, quality)?,
    };

    tracing::debug!(
        mime = format.mime(),
        bytes = bytes.len(),
        width,
        height,
        "encoded card"
    );

    Ok(EncodedImage {
        bytes,
        mime: format.mime(),
        width,
        height,
    })
}

#[cfg(feature = "raster")]
fn encode_png(card: &RenderedCard, options: &RasterOptions) -> Result<Vec<u8>, EncodeError> {
    let pixmap = crate::raster::rasterize(card.tree(), options.fonts.as_ref())?;
    pixmap
        .encode_png()
        .map_err(|err| EncodeError::Png(err.to_string()))
}

#[cfg(feature = "raster")]
fn encode_jpeg(
    card: &RenderedCard,
    options: &RasterOptions,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    use image::codecs::jpeg::JpegEncoder;
    use image::{DynamicImage, RgbImage};

    let pixmap = crate::raster::rasterize(card.tree(), options.fonts.as_ref())?;
    let rgb: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|px| {
            let c = px.demultiply();
            [c.red(), c.green(), c.blue()]
        })
        .collect();

    let image = RgbImage::from_raw(pixmap.width(), pixmap.height(), rgb)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| EncodeError::Png("pixel buffer size mismatch".to_string()))?;

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
    image.write_with_encoder(encoder)?;
    Ok(bytes)
}

#[cfg(not(feature = "raster"))]
fn encode_png(_card: &RenderedCard, _options: &RasterOptions) -> Result<Vec<u8>, EncodeError> {
    Err(EncodeError::RasterUnavailable)
}

#[cfg(not(feature = "raster"))]
fn encode_jpeg(
    _card: &RenderedCard,
    _options: &RasterOptions,
    _quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    Err(EncodeError::RasterUnavailable)
}
