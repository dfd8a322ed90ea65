//! RGBA colors and CSS color string parsing.
//!
//! Aura configurations carry colors as CSS strings (`#ff5500`, `rgba(255, 85, 0, 0.5)`),
//! so [`Color`] serializes to and from that representation.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Straight (non-premultiplied) RGBA color, each channel in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Multiplies the alpha channel, clamping the result into `0.0..=1.0`.
    pub fn fade(self, factor: f32) -> Self {
        Self {
            a: (self.a * factor).clamp(0.0, 1.0),
            ..self
        }
    }

    /// Linear mix, `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl FromStr for Color {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let bad = || ConfigError::InvalidColor(s.to_string());

        if let Some(hex) = text.strip_prefix('#') {
            let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
            if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(bad());
            }
            let rgba = match hex.len() {
                3 => (nibble(0), nibble(1), nibble(2), Ok(255)),
                4 => (nibble(0), nibble(1), nibble(2), nibble(3)),
                6 => (byte(0), byte(2), byte(4), Ok(255)),
                8 => (byte(0), byte(2), byte(4), byte(6)),
                _ => return Err(bad()),
            };
            return match rgba {
                (Ok(r), Ok(g), Ok(b), Ok(a)) => {
                    Ok(Color::from_rgb8(r, g, b).with_alpha(a as f32 / 255.0))
                }
                _ => Err(bad()),
            };
        }

        let lower = text.to_ascii_lowercase();
        let body = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(bad)?;
        let parts: Vec<f32> = body
            .split(',')
            .map(|p| p.trim().parse::<f32>())
            .collect::<Result<_, _>>()
            .map_err(|_| bad())?;
        match parts.as_slice() {
            [r, g, b] => Ok(Color::new(r / 255.0, g / 255.0, b / 255.0, 1.0).clamped()),
            [r, g, b, a] => Ok(Color::new(r / 255.0, g / 255.0, b / 255.0, *a).clamped()),
            _ => Err(bad()),
        }
    }
}

impl Color {
    fn clamped(self) -> Self {
        Self::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!("#ff5500".parse::<Color>().unwrap().to_rgba8(), [255, 85, 0, 255]);
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("#00000080".parse::<Color>().unwrap().to_rgba8(), [0, 0, 0, 128]);
    }

    #[test]
    fn test_parse_functional_forms() {
        let c: Color = "rgba(255, 0, 0, 0.5)".parse().unwrap();
        assert_eq!(c.to_rgba8(), [255, 0, 0, 128]);
        let c: Color = "RGB(0,255,0)".parse().unwrap();
        assert_eq!(c.to_rgba8(), [0, 255, 0, 255]);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("#12345".parse::<Color>().is_err());
        assert!("orange".parse::<Color>().is_err());
        assert!("rgb(1,2)".parse::<Color>().is_err());
        assert!("#gg0000".parse::<Color>().is_err());
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Color::BLACK;
        let b = Color::WHITE;
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5).r, 0.5);
    }

    #[test]
    fn test_serde_as_css_string() {
        let c: Color = serde_json::from_str("\"#aa00ff\"").unwrap();
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#aa00ff\"");
    }
}
