//! SVG generation from render commands.

use std::fmt::Write as _;

use crate::color::Color;
use crate::config::GradientStop;
use crate::render::{
    ClipShape, DrawTarget, FontSpec, Glow, Paint, Point, Rect, RenderCommand, RenderTree,
    TextAnchor, TextPaint, execute,
};

/// Options for SVG generation.
#[derive(Debug, Clone)]
pub struct SvgOptions {
    /// Include XML declaration
    pub xml_declaration: bool,
    /// Decimal precision for coordinates
    pub precision: usize,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            xml_declaration: true,
            precision: 2,
        }
    }
}

/// Generate SVG string from render tree.
pub fn to_svg(tree: &RenderTree, options: &SvgOptions) -> String {
    let mut surface = SvgSurface::new(tree.width, tree.height, options);
    execute(tree, &mut surface);
    surface.finish()
}

/// Draw target that serializes commands to SVG markup.
pub struct SvgSurface<'a> {
    output: String,
    options: &'a SvgOptions,
    /// Shared counter for clip path, gradient and filter ids.
    def_id_counter: u32,
}

impl<'a> SvgSurface<'a> {
    pub fn new(width: f32, height: f32, options: &'a SvgOptions) -> Self {
        let mut output = String::new();

        if options.xml_declaration {
            output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        }

        let _ = write!(
            output,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" \
             xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
             width=\"{:.p$}\" height=\"{:.p$}\" \
             viewBox=\"0 0 {:.p$} {:.p$}\">",
            width,
            height,
            width,
            height,
            p = options.precision
        );

        Self {
            output,
            options,
            def_id_counter: 0,
        }
    }

    pub fn finish(mut self) -> String {
        self.output.push_str("</svg>");
        self.output
    }

    fn next_id(&mut self) -> u32 {
        let id = self.def_id_counter;
        self.def_id_counter += 1;
        id
    }

    /// Emit a drop-shadow filter and return the attribute referencing it.
    ///
    /// Canvas `shadowBlur` is roughly twice the Gaussian standard deviation.
    fn glow_filter(&mut self, glow: Option<Glow>) -> String {
        let Some(glow) = glow.filter(|g| g.blur > 0.0 && g.color.a > 0) else {
            return String::new();
        };
        let id = self.next_id();
        let p = self.options.precision;
        let _ = write!(
            self.output,
            "<defs><filter id=\"glow-{id}\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\">\
             <feGaussianBlur in=\"SourceAlpha\" stdDeviation=\"{:.p$}\" result=\"blur\"/>\
             <feFlood flood-color=\"{}\" flood-opacity=\"{:.3}\"/>\
             <feComposite in2=\"blur\" operator=\"in\"/>\
             <feMerge><feMergeNode/><feMergeNode in=\"SourceGraphic\"/></feMerge>\
             </filter></defs>",
            glow.blur / 2.0,
            glow.color.to_hex(),
            glow.color.opacity(),
        );
        format!(" filter=\"url(#glow-{id})\"")
    }

    fn radial_gradient(&mut self, center: Point, radius: f32, stops: &[GradientStop]) -> u32 {
        let id = self.next_id();
        let p = self.options.precision;
        let _ = write!(
            self.output,
            "<defs><radialGradient id=\"grad-{id}\" gradientUnits=\"userSpaceOnUse\" \
             cx=\"{:.p$}\" cy=\"{:.p$}\" r=\"{:.p$}\">",
            center.x, center.y, radius,
        );
        for stop in stops {
            let _ = write!(
                self.output,
                "<stop offset=\"{:.3}\" stop-color=\"{}\" stop-opacity=\"{:.3}\"/>",
                stop.offset,
                stop.color.to_hex(),
                stop.color.opacity(),
            );
        }
        self.output.push_str("</radialGradient></defs>");
        id
    }

    fn render_fill_rect(&mut self, rect: &Rect, paint: &Paint) {
        let fill = match paint {
            Paint::Solid(color) if color.a == 0 => return,
            Paint::Solid(color) => paint_attrs("fill", *color),
            Paint::Radial {
                center,
                radius,
                stops,
            } => {
                let id = self.radial_gradient(*center, *radius, stops);
                format!("fill=\"url(#grad-{id})\"")
            }
        };
        let p = self.options.precision;
        let _ = write!(
            self.output,
            "<rect x=\"{:.p$}\" y=\"{:.p$}\" width=\"{:.p$}\" height=\"{:.p$}\" {fill}/>",
            rect.x, rect.y, rect.width, rect.height,
        );
    }

    fn render_line(&mut self, from: Point, to: Point, color: Color, width: f32) {
        if color.a == 0 || width <= 0.0 {
            return;
        }
        let p = self.options.precision;
        let _ = write!(
            self.output,
            "<line x1=\"{:.p$}\" y1=\"{:.p$}\" x2=\"{:.p$}\" y2=\"{:.p$}\" {} stroke-width=\"{:.p$}\"/>",
            from.x,
            from.y,
            to.x,
            to.y,
            paint_attrs("stroke", color),
            width,
        );
    }

    fn render_stroke_circle(
        &mut self,
        center: Point,
        radius: f32,
        color: Color,
        width: f32,
        opacity: f32,
        glow: Option<Glow>,
    ) {
        let filter = self.glow_filter(glow);
        let p = self.options.precision;
        let _ = write!(
            self.output,
            "<circle cx=\"{:.p$}\" cy=\"{:.p$}\" r=\"{:.p$}\" fill=\"none\" {} \
             stroke-width=\"{:.p$}\" opacity=\"{:.2}\"{filter}/>",
            center.x,
            center.y,
            radius,
            paint_attrs("stroke", color),
            width,
            opacity,
        );
    }

    fn render_rounded_rect(&mut self, rect: &Rect, radius: f32, color: Color, shadow: Option<Glow>) {
        let filter = self.glow_filter(shadow);
        let p = self.options.precision;
        let _ = write!(
            self.output,
            "<rect x=\"{:.p$}\" y=\"{:.p$}\" width=\"{:.p$}\" height=\"{:.p$}\" \
             rx=\"{:.p$}\" {}{filter}/>",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            radius,
            paint_attrs("fill", color),
        );
    }

    fn render_text(
        &mut self,
        position: Point,
        content: &str,
        font: &FontSpec,
        anchor: TextAnchor,
        paint: TextPaint,
        shadow: Option<Glow>,
    ) {
        if content.is_empty() {
            return;
        }

        let filter = self.glow_filter(shadow);
        let p = self.options.precision;

        let paint = match paint {
            TextPaint::Fill(color) => paint_attrs("fill", color),
            TextPaint::Stroke { color, width } => format!(
                "fill=\"none\" {} stroke-width=\"{:.p$}\" stroke-linejoin=\"round\"",
                paint_attrs("stroke", color),
                width,
            ),
        };

        let mut style = String::new();
        if anchor == TextAnchor::Middle {
            style.push_str(" text-anchor=\"middle\"");
        }
        if font.italic {
            style.push_str(" font-style=\"italic\"");
        }
        if font.letter_spacing != 0.0 {
            let _ = write!(style, " letter-spacing=\"{:.p$}\"", font.letter_spacing);
        }

        let _ = write!(
            self.output,
            "<text x=\"{:.p$}\" y=\"{:.p$}\" {paint} \
             font-family=\"{}\" \
             font-size=\"{:.p$}\" \
             font-weight=\"{}\"{style}{filter}>{}</text>",
            position.x,
            position.y,
            escape_xml(font.family.css_stack()),
            font.size,
            font.weight,
            escape_xml(content),
        );
    }

    fn render_image(&mut self, rect: &Rect, href: &str) {
        let p = self.options.precision;
        let _ = write!(
            self.output,
            "<image x=\"{:.p$}\" y=\"{:.p$}\" width=\"{:.p$}\" height=\"{:.p$}\" \
             preserveAspectRatio=\"none\" xlink:href=\"{}\"/>",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            escape_xml(href),
        );
    }

    fn push_clip(&mut self, shape: &ClipShape) {
        let clip_id = self.next_id();
        let p = self.options.precision;

        let _ = write!(self.output, "<defs><clipPath id=\"clip-{clip_id}\">");
        match shape {
            ClipShape::Circle { center, radius } => {
                let _ = write!(
                    self.output,
                    "<circle cx=\"{:.p$}\" cy=\"{:.p$}\" r=\"{:.p$}\"/>",
                    center.x, center.y, radius,
                );
            }
            ClipShape::RoundedRect { rect, radius } => {
                let _ = write!(
                    self.output,
                    "<rect x=\"{:.p$}\" y=\"{:.p$}\" width=\"{:.p$}\" height=\"{:.p$}\" rx=\"{:.p$}\"/>",
                    rect.x, rect.y, rect.width, rect.height, radius,
                );
            }
        }
        self.output.push_str("</clipPath></defs>");
        let _ = write!(self.output, "<g clip-path=\"url(#clip-{clip_id})\">");
    }

    fn pop_clip(&mut self) {
        self.output.push_str("</g>");
    }
}

impl DrawTarget for SvgSurface<'_> {
    fn apply(&mut self, command: &RenderCommand) {
        match command {
            RenderCommand::FillRect { rect, paint } => self.render_fill_rect(rect, paint),

            RenderCommand::Line {
                from,
                to,
                color,
                width,
            } => self.render_line(*from, *to, *color, *width),

            RenderCommand::StrokeCircle {
                center,
                radius,
                color,
                width,
                opacity,
                glow,
            } => self.render_stroke_circle(*center, *radius, *color, *width, *opacity, *glow),

            RenderCommand::FillRoundedRect {
                rect,
                radius,
                color,
                shadow,
            } => self.render_rounded_rect(rect, *radius, *color, *shadow),

            RenderCommand::Text {
                position,
                content,
                font,
                anchor,
                paint,
                shadow,
            } => self.render_text(*position, content, font, *anchor, *paint, *shadow),

            RenderCommand::Image { rect, href } => self.render_image(rect, href),

            RenderCommand::PushClip { shape } => self.push_clip(shape),

            RenderCommand::PopClip => self.pop_clip(),
        }
    }
}

/// `fill="#rrggbb"` (or `stroke`), plus an opacity attribute when translucent.
fn paint_attrs(attr: &str, color: Color) -> String {
    if color.a == 0 {
        format!("{attr}=\"none\"")
    } else if color.is_opaque() {
        format!("{attr}=\"{}\"", color.to_hex())
    } else {
        format!(
            "{attr}=\"{}\" {attr}-opacity=\"{:.3}\"",
            color.to_hex(),
            color.opacity()
        )
    }
}

pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::FontFamily;

    fn text_tree(content: &str, paint: TextPaint) -> RenderTree {
        let mut tree = RenderTree::new(100.0, 50.0);
        tree.commands.push(RenderCommand::Text {
            position: Point::new(50.0, 25.0),
            content: content.to_string(),
            font: FontSpec::new(FontFamily::Display, 300, 14.0).spaced(4.0),
            anchor: TextAnchor::Middle,
            paint,
            shadow: None,
        });
        tree
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("<test>"), "&lt;test&gt;");
        assert_eq!(escape_xml("I'LL BE ATTENDING"), "I&apos;LL BE ATTENDING");
    }

    #[test]
    fn test_text_attributes() {
        let svg = to_svg(
            &text_tree("PRESENTS", TextPaint::Fill(Color::rgb(0x88, 0x88, 0x88))),
            &SvgOptions::default(),
        );
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("text-anchor=\"middle\""));
        assert!(svg.contains("letter-spacing=\"4.00\""));
        assert!(svg.contains("font-family=\"Poppins, sans-serif\""));
        assert!(svg.contains(">PRESENTS</text>"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_stroked_text_has_no_fill() {
        let svg = to_svg(
            &text_tree(
                "ADA",
                TextPaint::Stroke {
                    color: Color::rgba(0, 0, 0, 153),
                    width: 4.0,
                },
            ),
            &SvgOptions::default(),
        );
        assert!(svg.contains("fill=\"none\" stroke=\"#000000\" stroke-opacity=\"0.600\""));
    }

    #[test]
    fn test_clip_ids_are_unique() {
        let mut tree = RenderTree::new(100.0, 100.0);
        for _ in 0..2 {
            tree.commands.push(RenderCommand::PushClip {
                shape: ClipShape::Circle {
                    center: Point::new(50.0, 50.0),
                    radius: 10.0,
                },
            });
            tree.commands.push(RenderCommand::PopClip);
        }
        let svg = to_svg(&tree, &SvgOptions::default());
        assert!(svg.contains("id=\"clip-0\""));
        assert!(svg.contains("id=\"clip-1\""));
        assert_eq!(svg.matches("<g clip-path").count(), svg.matches("</g>").count());
    }

    #[test]
    fn test_glow_emits_filter() {
        let mut tree = RenderTree::new(100.0, 100.0);
        tree.commands.push(RenderCommand::StrokeCircle {
            center: Point::new(50.0, 50.0),
            radius: 20.0,
            color: Color::rgb(220, 38, 38),
            width: 2.0,
            opacity: 0.5,
            glow: Some(Glow {
                color: Color::rgb(220, 38, 38),
                blur: 10.0,
            }),
        });
        let svg = to_svg(&tree, &SvgOptions { xml_declaration: false, precision: 1 });
        assert!(svg.contains("stdDeviation=\"5.0\""));
        assert!(svg.contains("filter=\"url(#glow-0)\""));
        assert!(svg.contains("opacity=\"0.50\""));
    }

    #[test]
    fn test_transparent_fill_is_skipped() {
        let mut tree = RenderTree::new(10.0, 10.0);
        tree.commands.push(RenderCommand::FillRect {
            rect: Rect {
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
            },
            paint: Paint::Solid(Color::TRANSPARENT),
        });
        assert!(!to_svg(&tree, &SvgOptions::default()).contains("<rect"));
    }
}
