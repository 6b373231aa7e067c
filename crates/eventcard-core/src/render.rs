//! Draw instructions.
//!
//! Card stages never touch a surface directly: each stage returns a list of
//! [`RenderCommand`] values and a single executor applies the whole
//! [`RenderTree`] to a [`DrawTarget`] (SVG, raster, or a recording fake).

use crate::color::Color;
use crate::config::GradientStop;

/// A point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Fill style of a rectangle.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    Radial {
        center: Point,
        radius: f32,
        stops: Vec<GradientStop>,
    },
}

/// Soft shadow around a shape, equivalent to a canvas `shadowBlur` with no
/// offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub color: Color,
    pub blur: f32,
}

/// Font families used on cards. Each maps to a CSS font stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFamily {
    /// Geometric sans used for the wordmark, names and captions.
    Display,
    /// Italic serif of the title lockup.
    Serif,
    /// Neutral sans for event details and the watermark.
    Body,
}

impl FontFamily {
    pub fn css_stack(self) -> &'static str {
        match self {
            FontFamily::Display => "Poppins, sans-serif",
            FontFamily::Serif => "Playfair Display, serif",
            FontFamily::Body => "Inter, sans-serif",
        }
    }
}

/// Font used by a text instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub family: FontFamily,
    pub size: f32,
    pub weight: u16,
    pub italic: bool,
    /// Extra advance after every character, in pixels.
    pub letter_spacing: f32,
}

impl FontSpec {
    pub const fn new(family: FontFamily, weight: u16, size: f32) -> Self {
        Self {
            family,
            size,
            weight,
            italic: false,
            letter_spacing: 0.0,
        }
    }

    pub const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub const fn spaced(mut self, letter_spacing: f32) -> Self {
        self.letter_spacing = letter_spacing;
        self
    }

    /// Same font with size and spacing multiplied by `scale`.
    pub fn scaled(mut self, scale: f32) -> Self {
        self.size *= scale;
        self.letter_spacing *= scale;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }
}

/// Horizontal anchoring of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
}

/// How a text run is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextPaint {
    Fill(Color),
    Stroke { color: Color, width: f32 },
}

/// Clip region for [`RenderCommand::PushClip`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipShape {
    Circle { center: Point, radius: f32 },
    RoundedRect { rect: Rect, radius: f32 },
}

/// Render commands in draw order.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Fill a rectangle with a solid color or gradient
    FillRect { rect: Rect, paint: Paint },

    /// Stroke a straight line
    Line {
        from: Point,
        to: Point,
        color: Color,
        width: f32,
    },

    /// Stroke a circle outline
    StrokeCircle {
        center: Point,
        radius: f32,
        color: Color,
        width: f32,
        opacity: f32,
        glow: Option<Glow>,
    },

    /// Fill a rounded rectangle
    FillRoundedRect {
        rect: Rect,
        radius: f32,
        color: Color,
        shadow: Option<Glow>,
    },

    /// Draw a single line of text
    Text {
        position: Point,
        content: String,
        font: FontSpec,
        anchor: TextAnchor,
        paint: TextPaint,
        shadow: Option<Glow>,
    },

    /// Draw an image stretched to `rect`
    Image { rect: Rect, href: String },

    /// Begin a clipping region
    PushClip { shape: ClipShape },

    /// End clipping region
    PopClip,
}

/// The render tree - a flat list of commands in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTree {
    pub commands: Vec<RenderCommand>,
    pub width: f32,
    pub height: f32,
}

impl RenderTree {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            commands: Vec::new(),
            width,
            height,
        }
    }

    /// Text content of every text command, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            RenderCommand::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }
}

/// Something draw instructions can be applied to.
pub trait DrawTarget {
    fn apply(&mut self, command: &RenderCommand);
}

/// Apply every command of `tree` to `target`, in order.
pub fn execute<T: DrawTarget + ?Sized>(tree: &RenderTree, target: &mut T) {
    for command in &tree.commands {
        target.apply(command);
    }
}

/// Draw target that only records what it was asked to draw.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<RenderCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded commands matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&RenderCommand) -> bool) -> usize {
        self.commands.iter().filter(|cmd| predicate(cmd)).count()
    }
}

impl DrawTarget for RecordingSurface {
    fn apply(&mut self, command: &RenderCommand) {
        self.commands.push(command.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_preserves_order() {
        let mut tree = RenderTree::new(10.0, 10.0);
        tree.commands.push(RenderCommand::PushClip {
            shape: ClipShape::Circle {
                center: Point::new(5.0, 5.0),
                radius: 2.0,
            },
        });
        tree.commands.push(RenderCommand::PopClip);

        let mut surface = RecordingSurface::new();
        execute(&tree, &mut surface);

        assert_eq!(surface.commands, tree.commands);
        assert_eq!(surface.count(|c| matches!(c, RenderCommand::PopClip)), 1);
    }

    #[test]
    fn test_font_scaling() {
        let font = FontSpec::new(FontFamily::Display, 300, 14.0).spaced(4.0).scaled(0.5);
        assert_eq!(font.size, 7.0);
        assert_eq!(font.letter_spacing, 2.0);
        assert_eq!(font.weight, 300);
    }
}
