//! RGB colors: hex parsing and formatting, lighten/darken, pastel picks.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// An 8-bit-per-channel RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    /// Pack into `0xRRGGBB`.
    #[must_use]
    pub fn to_hex(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }

    /// Parse `#RGB` or `#RRGGBB`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let hex = raw.trim().strip_prefix('#')?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            3 => Some(Self::new(
                hex_byte(&hex[0..1].repeat(2))?,
                hex_byte(&hex[1..2].repeat(2))?,
                hex_byte(&hex[2..3].repeat(2))?,
            )),
            6 => Some(Self::new(hex_byte(&hex[0..2])?, hex_byte(&hex[2..4])?, hex_byte(&hex[4..6])?)),
            _ => None,
        }
    }

    /// Canonical lowercase `#rrggbb`.
    #[must_use]
    pub fn to_hex_string(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// CSS `rgb(r, g, b)` form.
    #[must_use]
    pub fn css(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    /// Build from unit-range channels, clamping out-of-range input.
    #[must_use]
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        Self::new(unit_to_byte(r), unit_to_byte(g), unit_to_byte(b))
    }

    /// Channels as unit-range floats.
    #[must_use]
    pub fn to_unit(self) -> [f64; 3] {
        [f64::from(self.r) / 255.0, f64::from(self.g) / 255.0, f64::from(self.b) / 255.0]
    }

    /// Scale every channel up by `percent`, saturating at 255.
    #[must_use]
    pub fn lighten(self, percent: f64) -> Self {
        let factor = 1.0 + percent / 100.0;
        Self::new(scale_channel(self.r, factor), scale_channel(self.g, factor), scale_channel(self.b, factor))
    }

    /// Scale every channel down by `percent`.
    #[must_use]
    pub fn darken(self, percent: f64) -> Self {
        let factor = 1.0 - percent / 100.0;
        Self::new(scale_channel(self.r, factor), scale_channel(self.g, factor), scale_channel(self.b, factor))
    }

    /// A light pastel color: each channel drawn from `[0.5, 1.0)`.
    pub fn pastel<R: Rng>(rng: &mut R) -> Self {
        Self::from_unit(
            rng.random_range(0.5..1.0),
            rng.random_range(0.5..1.0),
            rng.random_range(0.5..1.0),
        )
    }
}

fn hex_byte(digits: &str) -> Option<u8> {
    match u8::from_str_radix(digits, 16) {
        Ok(value) => Some(value),
        Err(_) => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unit_to_byte(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale_channel(channel: u8, factor: f64) -> u8 {
    (f64::from(channel) * factor).floor().clamp(0.0, 255.0) as u8
}
