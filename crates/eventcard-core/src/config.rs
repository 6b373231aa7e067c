//! Static event and theme configuration.
//!
//! Every table here is a `static` built at compile time and looked up through
//! a closed enum, so render stages never carry color or copy literals.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::geometry::CardKind;

/// Brand red shared by both themes.
pub const ACCENT: Color = Color::rgb(0xdc, 0x26, 0x26);

// ============================================================================
// Themes
// ============================================================================

/// Visual theme of a card. Affects colors only, never positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn palette(self) -> &'static Palette {
        match self {
            Theme::Light => &LIGHT_PALETTE,
            Theme::Dark => &DARK_PALETTE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

/// A color stop of a radial gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

const fn stop(offset: f32, color: Color) -> GradientStop {
    GradientStop { offset, color }
}

/// Colors and effect intensities for one theme.
#[derive(Debug)]
pub struct Palette {
    pub theme: Theme,
    /// Solid fill under the gradients.
    pub background: Color,
    /// Radial gradient centered at (W/2, H/3) with radius 0.8·H.
    pub background_glow: &'static [GradientStop],
    /// Optional gradient anchored at the bottom-left corner with radius 0.6·H.
    pub corner_glow: Option<&'static [GradientStop]>,
    pub decorative_strong: Color,
    pub decorative_faint: Color,
    /// Name, wordmark and other primary ink.
    pub ink: Color,
    /// Outline stroked under the name.
    pub name_outline: Color,
    pub presented_by: Color,
    /// Role captions and event details.
    pub muted: Color,
    /// "THROUGH" / "Lens" parts of the title lockup.
    pub lockup: Color,
    pub separator: Color,
    pub watermark: Color,
    /// Shadow blur of the outer, middle and inner photo rings.
    pub ring_blur: [f32; 3],
}

static LIGHT_GLOW: [GradientStop; 2] = [
    stop(0.0, Color::rgb(0xf8, 0xf5, 0xf0)),
    stop(1.0, Color::rgb(0xef, 0xe8, 0xdf)),
];

static DARK_GLOW: [GradientStop; 3] = [
    stop(0.0, Color::rgb(0x1a, 0x08, 0x08)),
    stop(0.5, Color::rgb(0x0a, 0x03, 0x03)),
    stop(1.0, Color::rgb(0x05, 0x05, 0x05)),
];

static DARK_CORNER_GLOW: [GradientStop; 2] = [
    stop(0.0, Color::rgba(26, 5, 5, 77)),
    stop(1.0, Color::TRANSPARENT),
];

pub static LIGHT_PALETTE: Palette = Palette {
    theme: Theme::Light,
    background: Color::rgb(0xf8, 0xf5, 0xf0),
    background_glow: &LIGHT_GLOW,
    corner_glow: None,
    decorative_strong: Color::rgba(220, 38, 38, 26),
    decorative_faint: Color::rgba(220, 38, 38, 13),
    ink: Color::rgb(0x1a, 0x1a, 0x1a),
    name_outline: Color::rgba(255, 255, 255, 153),
    presented_by: Color::rgb(0x99, 0x99, 0x99),
    muted: Color::rgb(0x66, 0x66, 0x66),
    lockup: Color::rgb(0x33, 0x33, 0x33),
    separator: Color::rgba(0, 0, 0, 38),
    watermark: Color::rgba(0, 0, 0, 38),
    ring_blur: [15.0, 10.0, 8.0],
};

pub static DARK_PALETTE: Palette = Palette {
    theme: Theme::Dark,
    background: Color::rgb(0x05, 0x05, 0x05),
    background_glow: &DARK_GLOW,
    corner_glow: Some(&DARK_CORNER_GLOW),
    decorative_strong: Color::rgba(220, 38, 38, 38),
    decorative_faint: Color::rgba(220, 38, 38, 20),
    ink: Color::WHITE,
    name_outline: Color::rgba(0, 0, 0, 153),
    presented_by: Color::rgb(0x88, 0x88, 0x88),
    muted: Color::rgb(0x88, 0x88, 0x88),
    lockup: Color::WHITE,
    separator: Color::rgba(136, 136, 136, 77),
    watermark: Color::rgba(136, 136, 136, 51),
    ring_blur: [25.0, 15.0, 8.0],
};

// ============================================================================
// Events
// ============================================================================

/// Closed set of events that accept registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventSlug {
    ThisIsLagos,
    ThroughHerLens,
}

impl EventSlug {
    pub const ALL: [EventSlug; 2] = [EventSlug::ThisIsLagos, EventSlug::ThroughHerLens];

    /// The first event. Records imported without an event field belong to it.
    pub const LEGACY: EventSlug = EventSlug::ThisIsLagos;

    pub fn config(self) -> &'static EventConfig {
        match self {
            EventSlug::ThisIsLagos => &THIS_IS_LAGOS,
            EventSlug::ThroughHerLens => &THROUGH_HER_LENS,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.config().slug_str
    }
}

impl fmt::Display for EventSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventSlug {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventSlug::ALL
            .into_iter()
            .find(|slug| slug.as_str() == s)
            .ok_or_else(|| format!("unknown event: {s}"))
    }
}

/// Two-color wordmark drawn at the top of the card, e.g. "BLK" + "@".
#[derive(Debug)]
pub struct Wordmark {
    pub lead: &'static str,
    pub accent: &'static str,
}

/// Three-part typographic event title: a spaced caps lead, an accented serif
/// word flanked by dashes, and a serif tail.
#[derive(Debug)]
pub struct TitleLockup {
    pub lead: &'static str,
    pub accent: &'static str,
    pub tail: &'static str,
}

/// Immutable per-event configuration.
#[derive(Debug)]
pub struct EventConfig {
    pub slug: EventSlug,
    slug_str: &'static str,
    pub name: &'static str,
    pub tagline: &'static str,
    pub date: &'static str,
    pub time: &'static str,
    pub venue: &'static str,
    pub default_theme: Theme,
    pub primary: Color,
    pub card: CardKind,
    pub speakers_enabled: bool,
    pub wordmark: Wordmark,
    pub presented_by: &'static str,
    pub lockup: TitleLockup,
    pub watermark: &'static str,
    /// Public page linked from confirmation emails.
    pub page_path: &'static str,
}

impl EventConfig {
    /// `"{date}  |  {time}"` as printed on the card.
    pub fn schedule_line(&self) -> String {
        format!("{}  |  {}", self.date, self.time)
    }
}

pub static THIS_IS_LAGOS: EventConfig = EventConfig {
    slug: EventSlug::ThisIsLagos,
    slug_str: "this-is-lagos",
    name: "This Is Lagos",
    tagline: "Pre seed launch of the African Creative Fund",
    date: "November 20th, 2024",
    time: "10:00 AM - 4:00 PM",
    venue: "Alliance Francaise, Ikoyi, Lagos",
    default_theme: Theme::Light,
    primary: Color::rgb(0xff, 0x00, 0x00),
    card: CardKind::Template,
    speakers_enabled: false,
    wordmark: Wordmark { lead: "BLK", accent: "@" },
    presented_by: "PRESENTS",
    lockup: TitleLockup {
        lead: "THIS IS",
        accent: "Lagos",
        tail: "",
    },
    watermark: "blkat.io",
    page_path: "/events/this-is-lagos",
};

pub static THROUGH_HER_LENS: EventConfig = EventConfig {
    slug: EventSlug::ThroughHerLens,
    slug_str: "through-her-lens",
    name: "Through Her Lens",
    tagline: "Celebrating the Female Gender and Gender Equality in the Creative Space",
    date: "March 30, 2026",
    time: "9:00 AM - 3:00 PM",
    venue: "Alliance Francaise de Lagos",
    default_theme: Theme::Dark,
    primary: ACCENT,
    card: CardKind::Composited,
    speakers_enabled: true,
    wordmark: Wordmark { lead: "BLK", accent: "@" },
    presented_by: "PRESENTS",
    lockup: TitleLockup {
        lead: "THROUGH",
        accent: "Her",
        tail: "Lens",
    },
    watermark: "blkat.io",
    page_path: "/events/through-her-lens",
};
