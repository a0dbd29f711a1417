//! Color conversion.
//!
//! Host colors are RGBA with float channels in `[0, 1]`. DTCG output keeps
//! the raw channel floats plus an 8-bit hex rendering; native output is a
//! single CSS string.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::canonical::{format_number, json_number};

/// Alpha values within this distance of 1 are treated as opaque.
const OPAQUE_EPSILON: f64 = 1e-4;

/// An RGBA color with float channels, nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
    /// Alpha channel.
    pub a: f64,
}

impl Rgba {
    /// Creates a color.
    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    #[must_use]
    pub const fn opaque(r: f64, g: f64, b: f64) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Whether alpha is (within tolerance) fully opaque.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        (self.a - 1.0).abs() < OPAQUE_EPSILON
    }
}

/// Clamps a channel to `[0, 1]` and scales it to `0..=255`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel_to_byte(channel: f64) -> u8 {
    let clamped = if channel.is_nan() {
        0.0
    } else {
        channel.clamp(0.0, 1.0)
    };
    (clamped * 255.0).round() as u8
}

/// Renders `#rrggbb` with lowercase hex digits.
#[must_use]
pub fn rgb_to_hex(r: f64, g: f64, b: f64) -> String {
    format!(
        "#{:02x}{:02x}{:02x}",
        channel_to_byte(r),
        channel_to_byte(g),
        channel_to_byte(b)
    )
}

/// Parses `#rgb`, `#rrggbb` or `#rrggbbaa` (the `#` is optional).
#[must_use]
pub fn hex_to_rgb(hex: &str) -> Option<Rgba> {
    let digits = hex.trim().trim_start_matches('#');
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => digits.to_string(),
        _ => return None,
    };
    let byte = |index: usize| -> Option<f64> {
        u8::from_str_radix(expanded.get(index..index + 2)?, 16)
            .ok()
            .map(|value| f64::from(value) / 255.0)
    };
    let a = if expanded.len() == 8 { byte(6)? } else { 1.0 };
    Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, a))
}

/// DTCG color value: raw components, alpha and hex.
#[must_use]
pub fn to_dtcg_color(color: &Rgba) -> Value {
    json!({
        "colorSpace": "srgb",
        "components": [json_number(color.r), json_number(color.g), json_number(color.b)],
        "alpha": json_number(color.a),
        "hex": rgb_to_hex(color.r, color.g, color.b),
    })
}

/// Native color string: hex when opaque, otherwise `rgba(R, G, B, A)`.
#[must_use]
pub fn to_native_color(color: &Rgba) -> String {
    if color.is_opaque() {
        return rgb_to_hex(color.r, color.g, color.b);
    }
    let alpha = (color.a * 1000.0).round() / 1000.0;
    format!(
        "rgba({}, {}, {}, {})",
        channel_to_byte(color.r),
        channel_to_byte(color.g),
        channel_to_byte(color.b),
        format_number(alpha)
    )
}
