//! The composited social card.
//!
//! A card is drawn in a fixed sequence of [`Stage`]s. [`CardRenderer`] walks
//! the sequence one stage at a time; each stage is a pure function of the
//! theme palette, the resolved [`CardLayoutSpec`], the registrant and the
//! decoded photo, and returns draw instructions that are appended to the
//! card's [`RenderTree`]. A [`RenderedCard`] only exists once every stage has
//! run.

use crate::color::Color;
use crate::config::{ACCENT, EventConfig, Palette, Theme};
use crate::geometry::{CanvasGeometry, CardKind, cover_fit};
use crate::input::RegistrantInput;
use crate::layout::{CardLayoutSpec, RoleBlockLayout, Segment, TextLine};
use crate::photo::DecodedPhoto;
use crate::render::{
    ClipShape, Glow, Paint, Point, Rect, RenderCommand, RenderTree, TextAnchor, TextPaint,
};
use crate::text::TextMeasure;

/// Soft red used for the name and badge shadows.
const ACCENT_SHADOW: Color = Color::rgba(220, 38, 38, 77);
/// Dashes flanking the accent word of the title lockup.
const ACCENT_DASH: Color = Color::rgba(220, 38, 38, 102);
/// Outer, middle and inner ring opacity.
const RING_OPACITY: [f32; 3] = [0.3, 0.5, 1.0];
const NAME_STROKE_PASSES: usize = 3;
const NAME_FILL_PASSES: usize = 2;

/// Drawing stages, in the only order they can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Background,
    DecorativeLines,
    Logo,
    PresentedBy,
    Photo,
    Name,
    Badge,
    Divider,
    RoleBlock,
    EventTitle,
    ThinSeparator,
    EventDetails,
    Watermark,
    Done,
}

impl Stage {
    pub const ALL: [Stage; 14] = [
        Stage::Background,
        Stage::DecorativeLines,
        Stage::Logo,
        Stage::PresentedBy,
        Stage::Photo,
        Stage::Name,
        Stage::Badge,
        Stage::Divider,
        Stage::RoleBlock,
        Stage::EventTitle,
        Stage::ThinSeparator,
        Stage::EventDetails,
        Stage::Watermark,
        Stage::Done,
    ];

    /// The stage that follows this one. `Done` is terminal.
    pub fn next(self) -> Stage {
        match self {
            Stage::Background => Stage::DecorativeLines,
            Stage::DecorativeLines => Stage::Logo,
            Stage::Logo => Stage::PresentedBy,
            Stage::PresentedBy => Stage::Photo,
            Stage::Photo => Stage::Name,
            Stage::Name => Stage::Badge,
            Stage::Badge => Stage::Divider,
            Stage::Divider => Stage::RoleBlock,
            Stage::RoleBlock => Stage::EventTitle,
            Stage::EventTitle => Stage::ThinSeparator,
            Stage::ThinSeparator => Stage::EventDetails,
            Stage::EventDetails => Stage::Watermark,
            Stage::Watermark | Stage::Done => Stage::Done,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Background => "background",
            Stage::DecorativeLines => "decorative-lines",
            Stage::Logo => "logo",
            Stage::PresentedBy => "presented-by",
            Stage::Photo => "photo",
            Stage::Name => "name",
            Stage::Badge => "badge",
            Stage::Divider => "divider",
            Stage::RoleBlock => "role-block",
            Stage::EventTitle => "event-title",
            Stage::ThinSeparator => "thin-separator",
            Stage::EventDetails => "event-details",
            Stage::Watermark => "watermark",
            Stage::Done => "done",
        }
    }
}

/// Everything a stage may read.
#[derive(Debug, Clone, Copy)]
pub struct StageInput<'a> {
    pub palette: &'static Palette,
    pub layout: &'a CardLayoutSpec,
    pub registrant: &'a RegistrantInput,
    pub photo: Option<&'a DecodedPhoto>,
}

/// Draw instructions for one stage.
pub fn draw_stage(stage: Stage, input: &StageInput<'_>) -> Vec<RenderCommand> {
    match stage {
        Stage::Background => background(input),
        Stage::DecorativeLines => decorative_lines(input),
        Stage::Logo => logo(input),
        Stage::PresentedBy => vec![text(&input.layout.presented_by, input.palette.presented_by)],
        Stage::Photo => photo(input),
        Stage::Name => name(input),
        Stage::Badge => badge(input),
        Stage::Divider => vec![line(input.layout.divider, ACCENT, 2.0 * input.layout.scale)],
        Stage::RoleBlock => role_block(input),
        Stage::EventTitle => event_title(input),
        Stage::ThinSeparator => vec![line(
            input.layout.separator,
            input.palette.separator,
            input.layout.scale,
        )],
        Stage::EventDetails => vec![
            text(&input.layout.schedule, input.palette.muted),
            text(&input.layout.venue, input.palette.muted),
        ],
        Stage::Watermark => vec![text(&input.layout.watermark, input.palette.watermark)],
        Stage::Done => Vec::new(),
    }
}

fn text(line: &TextLine, color: Color) -> RenderCommand {
    RenderCommand::Text {
        position: line.position,
        content: line.text.clone(),
        font: line.font,
        anchor: TextAnchor::Middle,
        paint: TextPaint::Fill(color),
        shadow: None,
    }
}

fn line(segment: Segment, color: Color, width: f32) -> RenderCommand {
    RenderCommand::Line {
        from: segment.from,
        to: segment.to,
        color,
        width,
    }
}

fn background(input: &StageInput<'_>) -> Vec<RenderCommand> {
    let layout = input.layout;
    let palette = input.palette;
    let full = Rect {
        x: 0.0,
        y: 0.0,
        width: layout.width,
        height: layout.height,
    };

    let mut commands = vec![
        RenderCommand::FillRect {
            rect: full,
            paint: Paint::Solid(palette.background),
        },
        RenderCommand::FillRect {
            rect: full,
            paint: Paint::Radial {
                center: layout.glow_center,
                radius: layout.glow_radius,
                stops: palette.background_glow.to_vec(),
            },
        },
    ];

    if let Some(stops) = palette.corner_glow {
        commands.push(RenderCommand::FillRect {
            rect: full,
            paint: Paint::Radial {
                center: Point::new(0.0, layout.height),
                radius: layout.corner_radius,
                stops: stops.to_vec(),
            },
        });
    }

    commands
}

fn decorative_lines(input: &StageInput<'_>) -> Vec<RenderCommand> {
    let [strong, faint] = input.layout.decorative;
    let width = input.layout.scale;
    vec![
        line(strong, input.palette.decorative_strong, width),
        line(faint, input.palette.decorative_faint, width),
    ]
}

fn logo(input: &StageInput<'_>) -> Vec<RenderCommand> {
    let wordmark = &input.layout.wordmark;
    [
        (&wordmark.lead, input.palette.ink),
        (&wordmark.accent, ACCENT),
    ]
    .into_iter()
    .map(|(line, color)| RenderCommand::Text {
        position: line.position,
        content: line.text.clone(),
        font: line.font,
        anchor: TextAnchor::Start,
        paint: TextPaint::Fill(color),
        shadow: None,
    })
    .collect()
}

fn photo(input: &StageInput<'_>) -> Vec<RenderCommand> {
    let Some(photo) = input.photo else {
        if input.registrant.photo.is_some() {
            tracing::warn!("photo unavailable, drawing card without it");
        }
        return Vec::new();
    };

    let layout = &input.layout.photo;
    let mut commands = Vec::with_capacity(6);

    for ring in 0..3 {
        commands.push(RenderCommand::StrokeCircle {
            center: layout.center,
            radius: layout.radius + layout.ring_offsets[ring],
            color: ACCENT,
            width: layout.ring_widths[ring],
            opacity: RING_OPACITY[ring],
            glow: Some(Glow {
                color: ACCENT,
                blur: input.palette.ring_blur[ring] * input.layout.scale,
            }),
        });
    }

    let (draw_w, draw_h) = cover_fit(photo.width as f32, photo.height as f32, layout.radius * 2.0);
    commands.push(RenderCommand::PushClip {
        shape: ClipShape::Circle {
            center: layout.center,
            radius: layout.radius,
        },
    });
    commands.push(RenderCommand::Image {
        rect: Rect {
            x: layout.center.x - draw_w / 2.0,
            y: layout.center.y - draw_h / 2.0,
            width: draw_w,
            height: draw_h,
        },
        href: photo.data_uri(),
    });
    commands.push(RenderCommand::PopClip);

    commands
}

fn name(input: &StageInput<'_>) -> Vec<RenderCommand> {
    let layout = input.layout;
    let run = |paint, shadow| RenderCommand::Text {
        position: layout.name.position,
        content: layout.name.text.clone(),
        font: layout.name.font,
        anchor: TextAnchor::Middle,
        paint,
        shadow,
    };

    let stroke = TextPaint::Stroke {
        color: input.palette.name_outline,
        width: layout.name_stroke_width,
    };
    let shadow = Glow {
        color: ACCENT_SHADOW,
        blur: layout.name_shadow_blur,
    };

    std::iter::repeat_n(run(stroke, None), NAME_STROKE_PASSES)
        .chain(std::iter::repeat_n(
            run(TextPaint::Fill(input.palette.ink), Some(shadow)),
            NAME_FILL_PASSES,
        ))
        .collect()
}

fn badge(input: &StageInput<'_>) -> Vec<RenderCommand> {
    let badge = &input.layout.badge;
    vec![
        RenderCommand::FillRoundedRect {
            rect: badge.rect,
            radius: badge.radius,
            color: ACCENT,
            shadow: Some(Glow {
                color: ACCENT_SHADOW,
                blur: badge.shadow_blur,
            }),
        },
        text(&badge.label, Color::WHITE),
    ]
}

fn role_block(input: &StageInput<'_>) -> Vec<RenderCommand> {
    let muted = input.palette.muted;
    match &input.layout.role_block {
        RoleBlockLayout::Attendee { caption } => vec![text(caption, muted)],
        RoleBlockLayout::Speaker { caption, title, at } => {
            let mut commands = vec![text(caption, muted)];
            commands.extend(title.iter().map(|line| text(line, ACCENT)));
            commands.push(text(at, muted));
            commands
        }
    }
}

fn event_title(input: &StageInput<'_>) -> Vec<RenderCommand> {
    let lockup = &input.layout.lockup;
    let color = input.palette.lockup;
    let mut commands = Vec::with_capacity(5);

    if let Some(lead) = &lockup.lead {
        commands.push(text(lead, color));
    }
    commands.push(text(&lockup.accent, ACCENT));
    for dash in lockup.dashes {
        commands.push(line(dash, ACCENT_DASH, input.layout.scale));
    }
    if let Some(tail) = &lockup.tail {
        commands.push(text(tail, color));
    }

    commands
}

// ============================================================================
// Renderer
// ============================================================================

/// A card whose every stage has run. The only thing the export encoder
/// accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCard {
    kind: CardKind,
    tree: RenderTree,
}

impl RenderedCard {
    pub(crate) fn new(kind: CardKind, tree: RenderTree) -> Self {
        Self { kind, tree }
    }

    pub fn kind(&self) -> CardKind {
        self.kind
    }

    pub fn tree(&self) -> &RenderTree {
        &self.tree
    }

    pub fn into_tree(self) -> RenderTree {
        self.tree
    }

    pub fn width(&self) -> f32 {
        self.tree.width
    }

    pub fn height(&self) -> f32 {
        self.tree.height
    }
}

/// Steps through the card stages.
pub struct CardRenderer<'a> {
    stage: Stage,
    input: StageInput<'a>,
    tree: RenderTree,
}

impl<'a> CardRenderer<'a> {
    pub fn new(
        theme: Theme,
        layout: &'a CardLayoutSpec,
        registrant: &'a RegistrantInput,
        photo: Option<&'a DecodedPhoto>,
    ) -> Self {
        Self {
            stage: Stage::Background,
            input: StageInput {
                palette: theme.palette(),
                layout,
                registrant,
                photo,
            },
            tree: RenderTree::new(layout.width, layout.height),
        }
    }

    /// The stage the next call to [`advance`](Self::advance) will run.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn tree(&self) -> &RenderTree {
        &self.tree
    }

    /// Run exactly one stage and move to the next. Returns the new stage.
    pub fn advance(&mut self) -> Stage {
        if self.stage == Stage::Done {
            return Stage::Done;
        }

        let commands = draw_stage(self.stage, &self.input);
        tracing::debug!(
            stage = self.stage.name(),
            commands = commands.len(),
            "card stage"
        );
        self.tree.commands.extend(commands);
        self.stage = self.stage.next();
        self.stage
    }

    /// Run the remaining stages.
    pub fn finish(mut self) -> RenderedCard {
        while self.advance() != Stage::Done {}
        RenderedCard::new(CardKind::Composited, self.tree)
    }
}

/// Resolve the layout and run every stage in one call.
pub fn render_card<M: TextMeasure + ?Sized>(
    event: &EventConfig,
    theme: Theme,
    geometry: &CanvasGeometry,
    registrant: &RegistrantInput,
    photo: Option<&DecodedPhoto>,
    measure: &mut M,
) -> RenderedCard {
    let layout = CardLayoutSpec::resolve(event, geometry, registrant, measure);
    CardRenderer::new(theme, &layout, registrant, photo).finish()
}
