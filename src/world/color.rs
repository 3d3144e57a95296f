// color.rs - Structured colour values and alpha blending
//
// Colours are kept as channels plus a separate alpha factor and only turned
// into CSS strings at the canvas boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional).
    pub fn from_hex(s: &str) -> Result<Self, ConfigError> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        let bad = || ConfigError::BadColor(s.to_string());
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(bad());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
        Ok(Self { r: channel(0)?, g: channel(2)?, b: channel(4)? })
    }

    #[inline]
    pub fn with_alpha(self, alpha: f32) -> Paint {
        blend(self, alpha)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::from_hex(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&s)
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> String {
        c.to_string()
    }
}

/// A colour with its opacity, ready to paint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paint {
    pub rgb: Rgb,
    pub alpha: f32,
}

impl Paint {
    pub const fn solid(rgb: Rgb) -> Self {
        Self { rgb, alpha: 1.0 }
    }

    /// Further fade an existing paint.
    #[inline]
    pub fn fade(self, alpha: f32) -> Paint {
        blend(self.rgb, self.alpha * alpha)
    }

    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.rgb.r, self.rgb.g, self.rgb.b, self.alpha)
    }
}

impl From<Rgb> for Paint {
    fn from(rgb: Rgb) -> Self {
        Paint::solid(rgb)
    }
}

/// Combine a colour with an opacity factor; NaN collapses to transparent.
#[inline]
pub fn blend(rgb: Rgb, alpha: f32) -> Paint {
    let alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
    Paint { rgb, alpha }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let c: Rgb = "#7c5cfc".parse().unwrap();
        assert_eq!(c, Rgb::new(124, 92, 252));
        assert_eq!(c.to_string(), "#7c5cfc");
        assert_eq!(Rgb::from_hex("22c55e").unwrap(), Rgb::new(34, 197, 94));
    }

    #[test]
    fn rejects_malformed_hex() {
        for s in ["", "#fff", "#12345g", "#1234567", "#ééé"] {
            assert!(matches!(Rgb::from_hex(s), Err(ConfigError::BadColor(_))), "{s}");
        }
    }

    #[test]
    fn blend_clamps_and_fades() {
        let c = Rgb::new(1, 2, 3);
        assert_eq!(blend(c, 1.7).alpha, 1.0);
        assert_eq!(blend(c, -0.2).alpha, 0.0);
        assert_eq!(blend(c, f32::NAN).alpha, 0.0);
        let p = c.with_alpha(0.5).fade(0.5);
        assert!((p.alpha - 0.25).abs() < 1e-6);
        assert_eq!(p.css(), "rgba(1, 2, 3, 0.25)");
    }
}
