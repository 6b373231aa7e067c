//! Text measurement, wrapping and font-size fitting.
//!
//! `wrap` and `fit_font_size` are pure: they only see the world through an
//! injected measuring function, so they behave identically against Parley,
//! the approximate measurer, or a test closure.

use std::borrow::Cow;

use parley::layout::Layout;
use parley::style::{FontStack, FontStyle, FontWeight, LineHeight, StyleProperty};
use parley::{FontContext, LayoutContext};

use crate::fonts::FontsReady;
use crate::render::FontSpec;

/// Maximum number of lines produced by [`wrap`].
pub const MAX_WRAPPED_LINES: usize = 2;

const ELLIPSIS: &str = "...";

/// Greedy word wrap to at most two lines.
///
/// Words are appended to the current line while `measure(current + " " + word)`
/// stays within `max_width`. A word wider than `max_width` keeps a line of its
/// own, unbroken. If more than two lines result, the second line loses its
/// last three characters and gets `"..."` appended. Empty input yields a
/// single empty line.
pub fn wrap<F>(text: &str, max_width: f32, mut measure: F) -> Vec<String>
where
    F: FnMut(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut words = text.split_whitespace();
    let mut current = words.next().unwrap_or_default().to_string();

    for word in words {
        let candidate = format!("{current} {word}");
        if measure(&candidate) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    lines.push(current);

    if lines.len() > MAX_WRAPPED_LINES {
        lines.truncate(MAX_WRAPPED_LINES);
        let second = &mut lines[MAX_WRAPPED_LINES - 1];
        let keep = second.chars().count().saturating_sub(ELLIPSIS.len());
        *second = second.chars().take(keep).collect::<String>() + ELLIPSIS;
    }

    lines
}

/// Shrink a font size 1px at a time until `text` fits `max_width`.
///
/// Starts at `start_size` (raised to `min_size` if below it) and stops at
/// `min_size` even when the text still overflows.
pub fn fit_font_size<F>(
    text: &str,
    start_size: f32,
    min_size: f32,
    max_width: f32,
    mut measure_at: F,
) -> f32
where
    F: FnMut(&str, f32) -> f32,
{
    let mut size = start_size.max(min_size);
    while size > min_size && measure_at(text, size) > max_width {
        size = (size - 1.0).max(min_size);
    }
    size
}

// ============================================================================
// Measurers
// ============================================================================

/// Measures the advance width of a single line of text.
pub trait TextMeasure {
    fn measure(&mut self, text: &str, font: &FontSpec) -> f32;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &mut T {
    fn measure(&mut self, text: &str, font: &FontSpec) -> f32 {
        (**self).measure(text, font)
    }
}

/// Approximate average character width as a fraction of font size.
const CHAR_WIDTH_RATIO: f32 = 0.55;
/// Extra width for bold weights.
const BOLD_WIDTH_RATIO: f32 = 0.6;
/// Light weights run narrower.
const LIGHT_WIDTH_RATIO: f32 = 0.5;

/// Deterministic width estimate from character counts.
///
/// Used where no font backend exists (the browser preview) and wherever
/// reproducibility matters more than typographic accuracy (tests, snapshots).
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMeasure;

impl TextMeasure for ApproxMeasure {
    fn measure(&mut self, text: &str, font: &FontSpec) -> f32 {
        estimate_text_width(text, font)
    }
}

/// Estimate text width for a string in a given font.
pub fn estimate_text_width(text: &str, font: &FontSpec) -> f32 {
    let ratio = match font.weight {
        0..=349 => LIGHT_WIDTH_RATIO,
        350..=599 => CHAR_WIDTH_RATIO,
        _ => BOLD_WIDTH_RATIO,
    };
    let chars = text.chars().count() as f32;
    chars * font.size * ratio + chars * font.letter_spacing
}

/// Text measurement through Parley using the registered card fonts.
///
/// Parley's collection also sees the system fonts, which is what the raster
/// backend draws with when no card fonts are registered.
pub struct ParleyMeasure {
    font_cx: FontContext,
    layout_cx: LayoutContext<[u8; 4]>,
}

impl ParleyMeasure {
    /// Build a measurer over the fonts of a ready font book.
    pub fn new(fonts: &FontsReady) -> Self {
        let mut font_cx = FontContext::new();
        for face in fonts.faces() {
            font_cx.collection.register_fonts(face.data.to_vec().into(), None);
        }
        Self {
            font_cx,
            layout_cx: LayoutContext::new(),
        }
    }

    /// A measurer over the system fonts only.
    pub fn system() -> Self {
        Self {
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
        }
    }
}

impl TextMeasure for ParleyMeasure {
    fn measure(&mut self, text: &str, font: &FontSpec) -> f32 {
        if text.is_empty() {
            return 0.0;
        }

        let mut builder = self
            .layout_cx
            .ranged_builder(&mut self.font_cx, text, 1.0, false);

        builder.push_default(StyleProperty::FontSize(font.size));
        builder.push_default(StyleProperty::FontWeight(FontWeight::new(font.weight as f32)));
        builder.push_default(StyleProperty::LineHeight(LineHeight::FontSizeRelative(1.2)));
        builder.push_default(StyleProperty::LetterSpacing(font.letter_spacing));
        builder.push_default(StyleProperty::FontStack(FontStack::Source(Cow::Borrowed(
            font.family.css_stack(),
        ))));
        if font.italic {
            builder.push_default(StyleProperty::FontStyle(FontStyle::Italic));
        }

        let mut layout: Layout<[u8; 4]> = builder.build(text);
        layout.break_all_lines(None);

        let width = layout.width();

        // Parley reports zero width when no registered or system font could
        // shape the run; fall back to the estimate so fitting still converges.
        if width == 0.0 {
            return estimate_text_width(text, font);
        }

        width
    }
}

/// Measure for a family with a fixed weight and size, as a closure for [`wrap`].
pub fn measure_with<'a, M: TextMeasure + ?Sized>(
    measure: &'a mut M,
    font: FontSpec,
) -> impl FnMut(&str) -> f32 + 'a {
    move |text| measure.measure(text, &font)
}

/// Measure at a variable size, as a closure for [`fit_font_size`].
pub fn measure_at_size<'a, M: TextMeasure + ?Sized>(
    measure: &'a mut M,
    font: FontSpec,
) -> impl FnMut(&str, f32) -> f32 + 'a {
    move |text, size| measure.measure(text, &font.with_size(size))
}

/// First whitespace-delimited token of a name, uppercased.
pub fn display_first_name(name: &str) -> String {
    name.split_whitespace()
        .next()
        .unwrap_or_default()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::FontFamily;

    /// 10px per character, spaces included.
    fn mono(text: &str) -> f32 {
        text.chars().count() as f32 * 10.0
    }

    #[test]
    fn test_wrap_fits_on_one_line() {
        assert_eq!(wrap("Light and Shadow", 500.0, mono), vec!["Light and Shadow"]);
    }

    #[test]
    fn test_wrap_breaks_greedily() {
        let lines = wrap("aaaa bbbb cccc", 90.0, mono);
        assert_eq!(lines, vec!["aaaa bbbb", "cccc"]);
    }

    #[test]
    fn test_wrap_truncates_after_two_lines() {
        let lines = wrap("aaaa bbbb cccc dddd eeee", 90.0, mono);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "aaaa bbbb");
        assert_eq!(lines[1], "cccc d...");
    }

    #[test]
    fn test_wrap_long_speaker_title() {
        let title = "A Very Long Talk Title That Exceeds The Maximum Width Of The Card And Must Wrap Across Two Lines And Then Some";
        let lines = wrap(title, 300.0, mono);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("..."));

        let untruncated = {
            let mut all = Vec::new();
            let mut current = String::new();
            for word in title.split_whitespace() {
                let candidate = if current.is_empty() {
                    word.to_string()
                } else {
                    format!("{current} {word}")
                };
                if !current.is_empty() && mono(&candidate) > 300.0 {
                    all.push(std::mem::replace(&mut current, word.to_string()));
                } else {
                    current = candidate;
                }
            }
            all.push(current);
            all
        };
        let body = lines[1].trim_end_matches("...");
        assert_eq!(body.chars().count(), untruncated[1].chars().count() - 3);
    }

    #[test]
    fn test_wrap_keeps_oversized_word_whole() {
        let lines = wrap("Supercalifragilistic talk", 50.0, mono);
        assert_eq!(lines, vec!["Supercalifragilistic", "talk"]);
    }

    #[test]
    fn test_wrap_empty_input() {
        assert_eq!(wrap("", 100.0, mono), vec![String::new()]);
        assert_eq!(wrap("   ", 100.0, mono), vec![String::new()]);
    }

    #[test]
    fn test_wrap_short_second_line_becomes_ellipsis() {
        let lines = wrap("aaaaaaaa bb cccccccc", 80.0, mono);
        assert_eq!(lines, vec!["aaaaaaaa", "..."]);
    }

    #[test]
    fn test_fit_keeps_start_when_text_fits() {
        let size = fit_font_size("ADA", 48.0, 24.0, 1000.0, |t, s| t.len() as f32 * s);
        assert_eq!(size, 48.0);
    }

    #[test]
    fn test_fit_shrinks_until_width_fits() {
        // 10 chars * size <= 400 => size <= 40
        let size = fit_font_size("ABCDEFGHIJ", 48.0, 24.0, 400.0, |t, s| t.len() as f32 * s);
        assert_eq!(size, 40.0);
    }

    #[test]
    fn test_fit_stops_at_floor() {
        let size = fit_font_size("WOLFESCHLEGELSTEINHAUSEN", 48.0, 24.0, 10.0, |t, s| {
            t.len() as f32 * s
        });
        assert_eq!(size, 24.0);
    }

    #[test]
    fn test_fit_never_returns_below_floor() {
        assert_eq!(fit_font_size("X", 10.0, 24.0, 1.0, |_, s| s), 24.0);
        assert_eq!(fit_font_size("X", 24.5, 24.0, 1.0, |_, s| s), 24.0);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let measure = |t: &str, s: f32| estimate_text_width(t, &FontSpec::new(FontFamily::Display, 700, s));
        let a = fit_font_size("BARTHOLOMEW", 48.0, 24.0, 300.0, measure);
        let b = fit_font_size("BARTHOLOMEW", 48.0, 24.0, 300.0, measure);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fitted_name_respects_bound_for_many_names() {
        let names = ["ADA", "OLUWASEUN", "CHIMAMANDA", "MARIE-ANTOINETTE", "Ō", "NGOZI"];
        let max_width = 1080.0 * 0.85;
        for name in names {
            let size = fit_font_size(name, 48.0, 24.0, max_width, |t, s| {
                estimate_text_width(t, &FontSpec::new(FontFamily::Display, 700, s))
            });
            assert!(size >= 24.0);
            let width = estimate_text_width(name, &FontSpec::new(FontFamily::Display, 700, size));
            assert!(width <= max_width, "{name} overflows at {size}");
        }
    }

    #[test]
    fn test_display_first_name() {
        assert_eq!(display_first_name("  Ada  Lovelace "), "ADA");
        assert_eq!(display_first_name("zoë"), "ZOË");
        assert_eq!(display_first_name(""), "");
    }

    #[test]
    fn test_estimate_includes_letter_spacing() {
        let plain = FontSpec::new(FontFamily::Display, 300, 14.0);
        let spaced = plain.spaced(4.0);
        assert_eq!(
            estimate_text_width("PRESENTS", &spaced) - estimate_text_width("PRESENTS", &plain),
            32.0
        );
    }
}
