//! Canvas geometry resolution.
//!
//! Card layouts are authored at a fixed design size. On-screen previews use
//! one of two discrete profiles picked by viewport width; the compact profile
//! is the standard one at half scale. Exports always use the design size, so
//! preview and export geometries are resolved independently and never mixed.

use serde::{Deserialize, Serialize};

/// Viewports narrower than this resolve to the compact profile.
pub const COMPACT_BREAKPOINT: f32 = 768.0;

/// Discrete preview profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryProfile {
    Compact,
    Standard,
}

impl GeometryProfile {
    /// Pure step function of the viewport width, without hysteresis.
    pub fn for_viewport(viewport_width: f32) -> Self {
        if viewport_width < COMPACT_BREAKPOINT {
            GeometryProfile::Compact
        } else {
            GeometryProfile::Standard
        }
    }

    pub fn scale(self) -> f32 {
        match self {
            GeometryProfile::Compact => 0.5,
            GeometryProfile::Standard => 1.0,
        }
    }
}

/// Which card design a geometry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    /// Fully drawn card: background, rings, circular photo, typography.
    Composited,
    /// Photo and first name placed over a pre-designed template image.
    Template,
}

/// Design-size dimensions of a card kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesignSize {
    pub width: f32,
    pub height: f32,
    pub photo_width: f32,
    pub photo_height: f32,
    pub photo_offset_x: f32,
}

impl CardKind {
    pub const fn design(self) -> DesignSize {
        match self {
            CardKind::Composited => DesignSize {
                width: 1080.0,
                height: 1080.0,
                photo_width: 340.0,
                photo_height: 340.0,
                photo_offset_x: 370.0,
            },
            CardKind::Template => DesignSize {
                width: 900.0,
                height: 1062.0,
                photo_width: 398.0,
                photo_height: 488.0,
                photo_offset_x: 251.0,
            },
        }
    }
}

/// Resolved pixel geometry of one render surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    pub kind: CardKind,
    pub profile: GeometryProfile,
    pub scale: f32,
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub photo_width: f32,
    pub photo_height: f32,
    pub photo_offset_x: f32,
}

/// Resolve the preview geometry of `kind` for a viewport width.
pub fn resolve(kind: CardKind, viewport_width: f32) -> CanvasGeometry {
    CanvasGeometry::for_profile(kind, GeometryProfile::for_viewport(viewport_width))
}

impl CanvasGeometry {
    pub fn for_profile(kind: CardKind, profile: GeometryProfile) -> Self {
        let design = kind.design();
        let scale = profile.scale();
        Self {
            kind,
            profile,
            scale,
            canvas_width: design.width * scale,
            canvas_height: design.height * scale,
            photo_width: design.photo_width * scale,
            photo_height: design.photo_height * scale,
            photo_offset_x: design.photo_offset_x * scale,
        }
    }

    /// Geometry of the exported image: always the design size.
    pub fn export(kind: CardKind) -> Self {
        Self::for_profile(kind, GeometryProfile::Standard)
    }

    /// Scale a design-space length into this surface.
    pub fn px(&self, design_value: f32) -> f32 {
        design_value * self.scale
    }

    /// Integer pixel size of the surface.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.canvas_width.round() as u32,
            self.canvas_height.round() as u32,
        )
    }
}

/// Size that fills a `box_size` square completely while keeping the source
/// aspect ratio. The shorter side matches the box exactly; the overflow is
/// meant to be clipped.
pub fn cover_fit(source_width: f32, source_height: f32, box_size: f32) -> (f32, f32) {
    let aspect = source_width / source_height;
    if aspect > 1.0 {
        (box_size * aspect, box_size)
    } else {
        (box_size, box_size / aspect)
    }
}

/// Largest size that fits inside `max_width`×`max_height` keeping the source
/// aspect ratio.
pub fn contain_fit(
    source_width: f32,
    source_height: f32,
    max_width: f32,
    max_height: f32,
) -> (f32, f32) {
    let ratio = (max_width / source_width).min(max_height / source_height);
    (source_width * ratio, source_height * ratio)
}
