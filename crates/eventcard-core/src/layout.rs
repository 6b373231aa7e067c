//! Card layout resolution.
//!
//! Converts an event, a registrant and a canvas geometry into absolute
//! positions and fonts for every element of the composited card. All text
//! measurement happens here, up front; render stages only read the result.

use crate::config::EventConfig;
use crate::geometry::CanvasGeometry;
use crate::input::{RegistrantInput, Role, RoleDetails};
use crate::render::{FontFamily, FontSpec, Point, Rect};
use crate::text::{TextMeasure, fit_font_size, measure_at_size, measure_with, wrap};

/// Name must fit within this fraction of the canvas width.
pub const NAME_WIDTH_RATIO: f32 = 0.85;
/// Talk titles wrap within this fraction of the canvas width.
pub const TITLE_WIDTH_RATIO: f32 = 0.75;

const WORDMARK_FONT: FontSpec = FontSpec::new(FontFamily::Display, 700, 42.0);
const PRESENTED_BY_FONT: FontSpec = FontSpec::new(FontFamily::Display, 300, 14.0).spaced(4.0);
const NAME_FONT: FontSpec = FontSpec::new(FontFamily::Display, 700, 48.0);
const BADGE_FONT: FontSpec = FontSpec::new(FontFamily::Display, 700, 14.0);
const TALK_TITLE_FONT: FontSpec = FontSpec::new(FontFamily::Display, 500, 18.0).italic();
const WATERMARK_FONT: FontSpec = FontSpec::new(FontFamily::Body, 300, 10.0);

const LOGO_Y: f32 = 75.0;
const PRESENTED_BY_Y: f32 = 115.0;
const BADGE_HEIGHT: f32 = 34.0;
const BADGE_PADDING: f32 = 50.0;
const BADGE_LIFT: f32 = 5.0;
const DIVIDER_HALF_WIDTH: f32 = 120.0;
const SEPARATOR_HALF_WIDTH: f32 = 200.0;
const TITLE_LINE_HEIGHT: f32 = 26.0;
const TITLE_FIRST_BASELINE: f32 = 660.0;
/// Gap between the last talk title line box and the "AT" caption.
const TITLE_FLOW_GAP: f32 = 10.0;
/// Accent dashes sit this far above the accent baseline.
const DASH_RISE: f32 = 12.0;
const DASH_INNER: f32 = 8.0;
const DASH_OUTER: f32 = 30.0;

/// Positions of the title lockup and everything below it, relative to the
/// flow origin.
struct FlowMetrics {
    lead_size: f32,
    accent_size: f32,
    tail_size: f32,
    lead_dy: f32,
    accent_dy: f32,
    tail_dy: f32,
    separator_dy: f32,
    schedule_dy: f32,
    venue_dy: f32,
    details_size: f32,
    watermark_dy: f32,
}

/// Fixed design-space metrics of one role layout.
struct RoleMetrics {
    photo_radius: f32,
    photo_center_y: f32,
    name_y: f32,
    name_max: f32,
    name_min: f32,
    badge_y: f32,
    divider_y: f32,
    caption: &'static str,
    caption_font: FontSpec,
    caption_y: f32,
    flow: FlowMetrics,
}

const ATTENDEE: RoleMetrics = RoleMetrics {
    photo_radius: 170.0,
    photo_center_y: 320.0,
    name_y: 550.0,
    name_max: 48.0,
    name_min: 24.0,
    badge_y: 590.0,
    divider_y: 630.0,
    caption: "I'LL BE ATTENDING",
    caption_font: FontSpec::new(FontFamily::Display, 300, 16.0).spaced(3.0),
    caption_y: 665.0,
    flow: FlowMetrics {
        lead_size: 20.0,
        accent_size: 64.0,
        tail_size: 44.0,
        lead_dy: 710.0,
        accent_dy: 765.0,
        tail_dy: 815.0,
        separator_dy: 845.0,
        schedule_dy: 875.0,
        venue_dy: 900.0,
        details_size: 16.0,
        watermark_dy: 940.0,
    },
};

const SPEAKER: RoleMetrics = RoleMetrics {
    photo_radius: 160.0,
    photo_center_y: 310.0,
    name_y: 525.0,
    name_max: 44.0,
    name_min: 22.0,
    badge_y: 565.0,
    divider_y: 600.0,
    caption: "SPEAKING ON",
    caption_font: FontSpec::new(FontFamily::Display, 300, 13.0).spaced(3.0),
    caption_y: 632.0,
    flow: FlowMetrics {
        lead_size: 18.0,
        accent_size: 52.0,
        tail_size: 36.0,
        lead_dy: 30.0,
        accent_dy: 78.0,
        tail_dy: 118.0,
        separator_dy: 145.0,
        schedule_dy: 173.0,
        venue_dy: 195.0,
        details_size: 15.0,
        watermark_dy: 230.0,
    },
};

impl RoleMetrics {
    fn for_role(role: Role) -> &'static RoleMetrics {
        match role {
            Role::Attendee => &ATTENDEE,
            Role::Speaker => &SPEAKER,
        }
    }
}

/// A single positioned run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub position: Point,
    pub font: FontSpec,
}

/// A straight stroke between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    fn horizontal(center_x: f32, half_width: f32, y: f32) -> Self {
        Self {
            from: Point::new(center_x - half_width, y),
            to: Point::new(center_x + half_width, y),
        }
    }
}

/// Two-color wordmark, left-anchored so the pair is centered as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct WordmarkLayout {
    pub lead: TextLine,
    pub accent: TextLine,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoLayout {
    pub center: Point,
    pub radius: f32,
    /// Offsets of the outer, middle and inner ring from the photo edge.
    pub ring_offsets: [f32; 3],
    pub ring_widths: [f32; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct BadgeLayout {
    pub rect: Rect,
    pub radius: f32,
    pub label: TextLine,
    pub shadow_blur: f32,
}

/// Caption and role-specific copy between the divider and the title lockup.
#[derive(Debug, Clone, PartialEq)]
pub enum RoleBlockLayout {
    Attendee {
        caption: TextLine,
    },
    Speaker {
        caption: TextLine,
        /// Wrapped talk title, at most two lines.
        title: Vec<TextLine>,
        /// The "AT" caption that starts the dynamic flow.
        at: TextLine,
    },
}

impl RoleBlockLayout {
    pub fn lines(&self) -> Vec<&TextLine> {
        match self {
            RoleBlockLayout::Attendee { caption } => vec![caption],
            RoleBlockLayout::Speaker { caption, title, at } => {
                let mut lines = vec![caption];
                lines.extend(title);
                lines.push(at);
                lines
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LockupLayout {
    pub lead: Option<TextLine>,
    pub accent: TextLine,
    pub dashes: [Segment; 2],
    pub tail: Option<TextLine>,
}

/// Fully resolved layout of one composited card.
///
/// Derived fresh for every render from the event, registrant and geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct CardLayoutSpec {
    pub role: Role,
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub center_x: f32,
    /// Background gradient centers and radii.
    pub glow_center: Point,
    pub glow_radius: f32,
    pub corner_radius: f32,
    /// Strong then faint decorative diagonal.
    pub decorative: [Segment; 2],
    pub wordmark: WordmarkLayout,
    pub presented_by: TextLine,
    pub photo: PhotoLayout,
    pub name: TextLine,
    pub name_max_width: f32,
    pub name_min_size: f32,
    pub name_stroke_width: f32,
    pub name_shadow_blur: f32,
    pub badge: BadgeLayout,
    pub divider: Segment,
    pub role_block: RoleBlockLayout,
    /// Baseline everything below the role block is positioned from.
    pub flow_origin: f32,
    pub lockup: LockupLayout,
    pub separator: Segment,
    pub schedule: TextLine,
    pub venue: TextLine,
    pub watermark: TextLine,
}

impl CardLayoutSpec {
    /// Resolve the layout, measuring every text run with `measure`.
    pub fn resolve<M: TextMeasure + ?Sized>(
        event: &EventConfig,
        geometry: &CanvasGeometry,
        input: &RegistrantInput,
        measure: &mut M,
    ) -> Self {
        let role = input.role();
        let metrics = RoleMetrics::for_role(role);
        let px = |v: f32| geometry.px(v);
        let width = geometry.canvas_width;
        let height = geometry.canvas_height;
        let cx = width / 2.0;

        let text = |text: &str, x: f32, y: f32, font: FontSpec| TextLine {
            text: text.to_string(),
            position: Point::new(x, y),
            font,
        };

        // Wordmark: measured so lead and accent center as one run
        let wordmark_font = WORDMARK_FONT.scaled(geometry.scale);
        let lead_w = measure.measure(event.wordmark.lead, &wordmark_font);
        let accent_w = measure.measure(event.wordmark.accent, &wordmark_font);
        let start_x = (width - lead_w - accent_w) / 2.0;
        let wordmark = WordmarkLayout {
            lead: text(event.wordmark.lead, start_x, px(LOGO_Y), wordmark_font),
            accent: text(event.wordmark.accent, start_x + lead_w, px(LOGO_Y), wordmark_font),
        };

        // Name
        let display_name = input.first_name();
        let name_max_width = width * NAME_WIDTH_RATIO;
        let name_font = NAME_FONT.scaled(geometry.scale);
        let name_size = fit_font_size(
            &display_name,
            px(metrics.name_max),
            px(metrics.name_min),
            name_max_width,
            measure_at_size(measure, name_font),
        );

        // Badge
        let badge_font = BADGE_FONT.scaled(geometry.scale);
        let badge_label = role.badge_label();
        let badge_w = measure.measure(badge_label, &badge_font) + px(BADGE_PADDING);
        let badge_h = px(BADGE_HEIGHT);
        let badge_y = px(metrics.badge_y);
        let badge = BadgeLayout {
            rect: Rect {
                x: (width - badge_w) / 2.0,
                y: badge_y - badge_h / 2.0 - px(BADGE_LIFT),
                width: badge_w,
                height: badge_h,
            },
            radius: badge_h / 2.0,
            label: text(badge_label, cx, badge_y + px(1.0), badge_font),
            shadow_blur: px(12.0),
        };

        // Role block and flow origin
        let caption = text(
            metrics.caption,
            cx,
            px(metrics.caption_y),
            metrics.caption_font.scaled(geometry.scale),
        );
        let (role_block, flow_origin) = match &input.role {
            RoleDetails::Attendee => (RoleBlockLayout::Attendee { caption }, 0.0),
            RoleDetails::Speaker { talk_title, .. } => {
                let title_font = TALK_TITLE_FONT.scaled(geometry.scale);
                let lines = wrap(
                    talk_title,
                    width * TITLE_WIDTH_RATIO,
                    measure_with(measure, title_font),
                );
                let line_height = px(TITLE_LINE_HEIGHT);
                let mut y = px(TITLE_FIRST_BASELINE);
                let mut title = Vec::with_capacity(lines.len());
                for line in lines {
                    title.push(text(&line, cx, y, title_font));
                    y += line_height;
                }
                let origin = y + px(TITLE_FLOW_GAP);
                let at = text("AT", cx, origin, metrics.caption_font.scaled(geometry.scale));
                (
                    RoleBlockLayout::Speaker { caption, title, at },
                    origin,
                )
            }
        };
        let flow = &metrics.flow;
        let fy = |dy: f32| flow_origin + px(dy);

        // Title lockup
        let lead_font = FontSpec::new(FontFamily::Display, 300, flow.lead_size)
            .spaced(6.0)
            .scaled(geometry.scale);
        let accent_font = FontSpec::new(FontFamily::Serif, 700, flow.accent_size)
            .italic()
            .scaled(geometry.scale);
        let tail_font = FontSpec::new(FontFamily::Serif, 400, flow.tail_size)
            .italic()
            .scaled(geometry.scale);
        let accent_y = fy(flow.accent_dy);
        let half_accent = measure.measure(event.lockup.accent, &accent_font) / 2.0;
        let dash_y = accent_y - px(DASH_RISE);
        let dash = |sign: f32| Segment {
            from: Point::new(cx + sign * (half_accent + px(DASH_OUTER)), dash_y),
            to: Point::new(cx + sign * (half_accent + px(DASH_INNER)), dash_y),
        };
        let non_empty = |s: &'static str| (!s.is_empty()).then_some(s);
        let lockup = LockupLayout {
            lead: non_empty(event.lockup.lead).map(|s| text(s, cx, fy(flow.lead_dy), lead_font)),
            accent: text(event.lockup.accent, cx, accent_y, accent_font),
            dashes: [dash(-1.0), dash(1.0)],
            tail: non_empty(event.lockup.tail).map(|s| text(s, cx, fy(flow.tail_dy), tail_font)),
        };

        let details_font =
            FontSpec::new(FontFamily::Body, 400, flow.details_size).scaled(geometry.scale);

        Self {
            role,
            width,
            height,
            scale: geometry.scale,
            center_x: cx,
            glow_center: Point::new(cx, height / 3.0),
            glow_radius: height * 0.8,
            corner_radius: height * 0.6,
            decorative: [
                Segment {
                    from: Point::new(0.0, px(80.0)),
                    to: Point::new(width * 0.4, height * 0.35),
                },
                Segment {
                    from: Point::new(width * 0.7, 0.0),
                    to: Point::new(width, height * 0.2),
                },
            ],
            wordmark,
            presented_by: text(
                event.presented_by,
                cx,
                px(PRESENTED_BY_Y),
                PRESENTED_BY_FONT.scaled(geometry.scale),
            ),
            photo: PhotoLayout {
                center: Point::new(cx, px(metrics.photo_center_y)),
                radius: px(metrics.photo_radius),
                ring_offsets: [px(18.0), px(10.0), px(4.0)],
                ring_widths: [px(1.0), px(2.0), px(3.0)],
            },
            name: text(&display_name, cx, px(metrics.name_y), name_font.with_size(name_size)),
            name_max_width,
            name_min_size: px(metrics.name_min),
            name_stroke_width: px(4.0),
            name_shadow_blur: px(10.0),
            badge,
            divider: Segment::horizontal(cx, px(DIVIDER_HALF_WIDTH), px(metrics.divider_y)),
            role_block,
            flow_origin,
            lockup,
            separator: Segment::horizontal(cx, px(SEPARATOR_HALF_WIDTH), fy(flow.separator_dy)),
            schedule: text(&event.schedule_line(), cx, fy(flow.schedule_dy), details_font),
            venue: text(event.venue, cx, fy(flow.venue_dy), details_font),
            watermark: text(
                event.watermark,
                cx,
                fy(flow.watermark_dy),
                WATERMARK_FONT.scaled(geometry.scale),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::THROUGH_HER_LENS;
    use crate::geometry::{CardKind, GeometryProfile};
    use crate::text::{ApproxMeasure, estimate_text_width};

    fn export() -> CanvasGeometry {
        CanvasGeometry::export(CardKind::Composited)
    }

    #[test]
    fn test_attendee_fixed_positions() {
        let input = RegistrantInput::attendee("Ngozi Okafor");
        let layout = CardLayoutSpec::resolve(&THROUGH_HER_LENS, &export(), &input, &mut ApproxMeasure);

        assert_eq!(layout.photo.radius, 170.0);
        assert_eq!(layout.photo.center, Point::new(540.0, 320.0));
        assert_eq!(layout.name.text, "NGOZI");
        assert_eq!(layout.name.position.y, 550.0);
        assert_eq!(layout.divider.from.y, 630.0);
        assert_eq!(layout.lockup.accent.position.y, 765.0);
        assert_eq!(layout.separator.from.y, 845.0);
        assert_eq!(layout.watermark.position.y, 940.0);
        assert_eq!(layout.flow_origin, 0.0);
    }

    #[test]
    fn test_speaker_flow_follows_title_lines() {
        let one_line = RegistrantInput::speaker("Ada", "Short", "Bio");
        let layout =
            CardLayoutSpec::resolve(&THROUGH_HER_LENS, &export(), &one_line, &mut ApproxMeasure);
        // one line at 660, next baseline 686, gap 10
        assert_eq!(layout.flow_origin, 696.0);
        assert_eq!(layout.separator.from.y, 696.0 + 145.0);
        assert_eq!(layout.watermark.position.y, 696.0 + 230.0);

        let long = RegistrantInput::speaker(
            "Ada",
            "Reframing the Lens: How African Women Photographers Are Rewriting Visual Narratives Across the Continent and Beyond, From Lagos Studios to Nairobi Streets, Archives, Galleries and the Everyday Spaces In Between",
            "Bio",
        );
        let layout = CardLayoutSpec::resolve(&THROUGH_HER_LENS, &export(), &long, &mut ApproxMeasure);
        let RoleBlockLayout::Speaker { title, at, .. } = &layout.role_block else {
            panic!("speaker layout expected");
        };
        assert_eq!(title.len(), 2);
        assert!(title[1].text.ends_with("..."));
        assert_eq!(at.position.y, 660.0 + 26.0 * 2.0 + 10.0);
        assert_eq!(layout.flow_origin, 722.0);
    }

    #[test]
    fn test_name_fits_width_or_floors() {
        for name in ["Ada", "Wolfeschlegelsteinhausenbergerdorff", "Chimamanda Adichie"] {
            let input = RegistrantInput::attendee(name);
            let layout =
                CardLayoutSpec::resolve(&THROUGH_HER_LENS, &export(), &input, &mut ApproxMeasure);
            assert!(layout.name.font.size >= layout.name_min_size);
            let width = estimate_text_width(&layout.name.text, &layout.name.font);
            assert!(
                width <= layout.name_max_width || layout.name.font.size == layout.name_min_size,
                "{name}"
            );
        }
    }

    #[test]
    fn test_badge_width_tracks_label() {
        let attendee = CardLayoutSpec::resolve(
            &THROUGH_HER_LENS,
            &export(),
            &RegistrantInput::attendee("A"),
            &mut ApproxMeasure,
        );
        let font = BADGE_FONT;
        assert_eq!(
            attendee.badge.rect.width,
            estimate_text_width("ATTENDEE", &font) + 50.0
        );
        assert_eq!(attendee.badge.rect.height, 34.0);
        assert_eq!(attendee.badge.rect.y, 590.0 - 17.0 - 5.0);
    }

    #[test]
    fn test_compact_layout_is_half_scale() {
        let input = RegistrantInput::attendee("Ada");
        let compact = CanvasGeometry::for_profile(CardKind::Composited, GeometryProfile::Compact);
        let small = CardLayoutSpec::resolve(&THROUGH_HER_LENS, &compact, &input, &mut ApproxMeasure);
        let big = CardLayoutSpec::resolve(&THROUGH_HER_LENS, &export(), &input, &mut ApproxMeasure);
        assert_eq!(small.photo.radius * 2.0, big.photo.radius);
        assert_eq!(small.watermark.position.y * 2.0, big.watermark.position.y);
        assert_eq!(small.name.font.size * 2.0, big.name.font.size);
    }
}
