//! Template card: the registrant's photo and first name placed over a
//! pre-designed template image.

use crate::card::RenderedCard;
use crate::color::Color;
use crate::config::Theme;
use crate::geometry::{CanvasGeometry, CardKind, contain_fit};
use crate::input::RegistrantInput;
use crate::photo::DecodedPhoto;
use crate::render::{
    ClipShape, FontFamily, FontSpec, Paint, Point, Rect, RenderCommand, RenderTree, TextAnchor,
    TextPaint,
};
use crate::text::{TextMeasure, fit_font_size, measure_at_size};

const PHOTO_CORNER_RATIO: f32 = 0.022;
const PHOTO_DROP_RATIO: f32 = 0.036;
const NAME_MAX_WIDTH_RATIO: f32 = 0.149;
const NAME_START_RATIO: f32 = 0.071;
const NAME_MIN_RATIO: f32 = 0.02;
const NAME_LEFT_RATIO: f32 = 0.139;
const NAME_PADDING_RATIO: f32 = 0.011;
const NAME_BASELINE_RATIO: f32 = 0.846;
const NAME_STROKE_PASSES: usize = 3;
const NAME_FILL_PASSES: usize = 2;

/// Resolved positions of the template card.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLayout {
    pub width: f32,
    pub height: f32,
    pub photo_box: Rect,
    pub photo_radius: f32,
    pub name: String,
    pub name_position: Point,
    pub name_font: FontSpec,
    pub name_max_width: f32,
}

impl TemplateLayout {
    pub fn resolve<M: TextMeasure + ?Sized>(
        geometry: &CanvasGeometry,
        input: &RegistrantInput,
        measure: &mut M,
    ) -> Self {
        let w = geometry.canvas_width;
        let h = geometry.canvas_height;

        let photo_y = ((h - geometry.photo_height) / 2.0).round() + h * PHOTO_DROP_RATIO;
        let name = input.first_name();
        let name_max_width = w * NAME_MAX_WIDTH_RATIO;
        let base_font = FontSpec::new(FontFamily::Display, 400, w * NAME_START_RATIO);
        let size = fit_font_size(
            &name,
            w * NAME_START_RATIO,
            w * NAME_MIN_RATIO,
            name_max_width,
            measure_at_size(measure, base_font),
        );

        // Baseline rises by half the extra line height of a 1.2 line box.
        let name_y = h * NAME_BASELINE_RATIO - size * 0.1;
        let name_x = w * NAME_LEFT_RATIO + w * NAME_PADDING_RATIO + name_max_width / 2.0;

        Self {
            width: w,
            height: h,
            photo_box: Rect {
                x: geometry.photo_offset_x,
                y: photo_y,
                width: geometry.photo_width,
                height: geometry.photo_height,
            },
            photo_radius: w * PHOTO_CORNER_RATIO,
            name,
            name_position: Point::new(name_x, name_y),
            name_font: base_font.with_size(size),
            name_max_width,
        }
    }
}

/// Render the template card.
///
/// Without a template image the canvas is filled with the light palette
/// background so the photo and name still have something to sit on.
pub fn render_template_card<M: TextMeasure + ?Sized>(
    geometry: &CanvasGeometry,
    input: &RegistrantInput,
    template: Option<&DecodedPhoto>,
    photo: Option<&DecodedPhoto>,
    measure: &mut M,
) -> RenderedCard {
    let layout = TemplateLayout::resolve(geometry, input, measure);
    let mut tree = RenderTree::new(layout.width, layout.height);
    let full = Rect {
        x: 0.0,
        y: 0.0,
        width: layout.width,
        height: layout.height,
    };

    match template {
        Some(template) => tree.commands.push(RenderCommand::Image {
            rect: full,
            href: template.data_uri(),
        }),
        None => tree.commands.push(RenderCommand::FillRect {
            rect: full,
            paint: Paint::Solid(Theme::Light.palette().background),
        }),
    }

    match photo {
        Some(photo) => {
            let boxed = layout.photo_box;
            let (pw, ph) = contain_fit(
                photo.width as f32,
                photo.height as f32,
                boxed.width,
                boxed.height,
            );
            tree.commands.push(RenderCommand::PushClip {
                shape: ClipShape::RoundedRect {
                    rect: boxed,
                    radius: layout.photo_radius,
                },
            });
            tree.commands.push(RenderCommand::Image {
                rect: Rect {
                    x: boxed.x + (boxed.width - pw) / 2.0,
                    y: boxed.y + (boxed.height - ph) / 2.0,
                    width: pw,
                    height: ph,
                },
                href: photo.data_uri(),
            });
            tree.commands.push(RenderCommand::PopClip);
        }
        None if input.photo.is_some() => {
            tracing::warn!("photo unavailable, drawing template card without it");
        }
        None => {}
    }

    if !layout.name.is_empty() {
        let run = |paint| RenderCommand::Text {
            position: layout.name_position,
            content: layout.name.clone(),
            font: layout.name_font,
            anchor: TextAnchor::Middle,
            paint,
            shadow: None,
        };
        let stroke = TextPaint::Stroke {
            color: Color::BLACK,
            width: 1.0,
        };
        tree.commands
            .extend(std::iter::repeat_n(run(stroke), NAME_STROKE_PASSES));
        tree.commands.extend(std::iter::repeat_n(
            run(TextPaint::Fill(Color::WHITE)),
            NAME_FILL_PASSES,
        ));
    }

    tracing::debug!(commands = tree.commands.len(), "template card rendered");
    RenderedCard::new(CardKind::Template, tree)
}
