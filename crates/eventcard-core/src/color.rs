//! RGBA colors used by palettes and draw instructions.

use serde::Deserialize;

/// Color value - supports hex (#RGB, #RRGGBB, #RRGGBBAA) and rgb/rgba functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with the alpha channel scaled by `opacity` (0..=1).
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (f32::from(self.a) * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// `#rrggbb` without alpha.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Alpha as a 0..=1 float.
    pub fn opacity(&self) -> f32 {
        f32::from(self.a) / 255.0
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Convert to CSS color string.
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            self.to_hex()
        } else if self.a == 0 {
            "none".to_string()
        } else {
            format!(
                "rgba({},{},{},{:.3})",
                self.r,
                self.g,
                self.b,
                self.opacity()
            )
        }
    }

    /// Parse a color string.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();

        if let Some(hex) = s.strip_prefix('#') {
            let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
            return match hex.len() {
                3 => {
                    // #RGB
                    let r = channel(0..1)? * 17;
                    let g = channel(1..2)? * 17;
                    let b = channel(2..3)? * 17;
                    Some(Self::rgb(r, g, b))
                }
                6 => Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
                8 => Some(Self::rgba(
                    channel(0..2)?,
                    channel(2..4)?,
                    channel(4..6)?,
                    channel(6..8)?,
                )),
                _ => None,
            };
        }

        // rgb(r, g, b) or rgba(r, g, b, a)
        if s.starts_with("rgb") {
            let inner = s
                .trim_start_matches("rgba")
                .trim_start_matches("rgb")
                .trim_start_matches('(')
                .trim_end_matches(')');
            let parts: Vec<&str> = inner.split(',').map(str::trim).collect();

            if parts.len() >= 3 {
                let r = parts[0].parse().ok()?;
                let g = parts[1].parse().ok()?;
                let b = parts[2].parse().ok()?;
                let a = if parts.len() >= 4 {
                    let a_float: f32 = parts[3].parse().ok()?;
                    (a_float.clamp(0.0, 1.0) * 255.0) as u8
                } else {
                    255
                };
                return Some(Self { r, g, b, a });
            }
        }

        match s.to_lowercase().as_str() {
            "transparent" => Some(Self::TRANSPARENT),
            "black" => Some(Self::BLACK),
            "white" => Some(Self::WHITE),
            "red" => Some(Self::rgb(255, 0, 0)),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(Color::parse("#fff").unwrap().r, 255);
        assert_eq!(Color::parse("#dc2626").unwrap(), Color::rgb(0xdc, 0x26, 0x26));
        assert_eq!(Color::parse("rgb(255, 0, 0)").unwrap().r, 255);
        assert_eq!(Color::parse("rgba(220,38,38,0.5)").unwrap().a, 127);
        assert!(Color::parse("#12").is_none());
    }

    #[test]
    fn test_css_output() {
        assert_eq!(Color::rgb(26, 26, 26).to_css(), "#1a1a1a");
        assert_eq!(Color::TRANSPARENT.to_css(), "none");
        assert_eq!(Color::rgba(0, 0, 0, 51).to_css(), "rgba(0,0,0,0.200)");
    }

    #[test]
    fn test_with_opacity() {
        let c = Color::rgb(220, 38, 38).with_opacity(0.5);
        assert_eq!(c.a, 128);
        assert_eq!(c.to_hex(), "#dc2626");
    }
}
