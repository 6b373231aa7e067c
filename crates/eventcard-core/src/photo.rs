//! Profile photo decoding.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, ImageReader};

/// Errors raised while decoding a photo.
#[derive(Debug, thiserror::Error)]
pub enum PhotoError {
    #[error("unrecognized image format")]
    UnknownFormat,

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image has zero size")]
    Empty,
}

/// A photo that decoded completely.
///
/// The encoded bytes are kept as-is and embedded into draw instructions, so a
/// photo is decoded once per render input regardless of how many targets the
/// card is drawn to. A photo whose header parses but whose pixel data does
/// not is rejected, since the drawing backend would drop it silently.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPhoto {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    bytes: Vec<u8>,
}

impl DecodedPhoto {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, PhotoError> {
        let format = image::guess_format(&bytes).map_err(|_| PhotoError::UnknownFormat)?;
        let decoded = ImageReader::with_format(Cursor::new(&bytes), format).decode()?;
        let (width, height) = (decoded.width(), decoded.height());
        if width == 0 || height == 0 {
            return Err(PhotoError::Empty);
        }
        Ok(Self {
            width,
            height,
            format,
            bytes,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// `data:` URI suitable for an SVG `<image href>`.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime(), STANDARD.encode(&self.bytes))
    }
}
