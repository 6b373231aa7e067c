//! Raster backend: render trees are drawn to SVG, then rasterized by resvg.

use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;

use crate::fonts::FontsReady;
use crate::render::RenderTree;
use crate::svg::{SvgOptions, to_svg};

/// Errors raised while rasterizing.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("invalid canvas size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("failed to parse generated SVG: {0}")]
    Svg(#[from] usvg::Error),
}

/// Build usvg options with the registered fonts, or system fonts when none
/// were registered.
fn usvg_options(fonts: Option<&FontsReady>) -> usvg::Options<'static> {
    let mut options = usvg::Options::default();
    let db = options.fontdb_mut();
    match fonts.filter(|f| !f.is_empty()) {
        Some(fonts) => {
            for face in fonts.faces() {
                db.load_font_data(face.data.to_vec());
            }
        }
        None => db.load_system_fonts(),
    }
    options
}

/// Draw `tree` into a new pixmap of the tree's size.
pub fn rasterize(tree: &RenderTree, fonts: Option<&FontsReady>) -> Result<Pixmap, RasterError> {
    let width = tree.width.round() as u32;
    let height = tree.height.round() as u32;
    let mut pixmap = Pixmap::new(width, height).ok_or(RasterError::InvalidSize { width, height })?;

    let svg = to_svg(
        tree,
        &SvgOptions {
            xml_declaration: false,
            precision: 2,
        },
    );
    let options = usvg_options(fonts);
    let parsed = usvg::Tree::from_str(&svg, &options)?;
    resvg::render(&parsed, Transform::default(), &mut pixmap.as_mut());

    tracing::debug!(width, height, "rasterized card");
    Ok(pixmap)
}
