//! Colour types and conversion functions for the palette engine.
//!
//! Provides the 8-bit `Colour` stored in palettes plus the two derived
//! representations kept alongside it (`Hsl`, `Lab`), and pure conversion
//! functions between them. Uses `f64` throughout for precision.
//!
//! The Lab conversion goes through CIE XYZ (sRGB primaries) and is relative to
//! a configurable tristimulus [`WhitePoint`].

use crate::error::PaletteError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::{Hash, Hasher};

/// An 8-bit RGBA colour with a provenance index.
///
/// `index` records which palette slot the colour came from (-1 when it did
/// not come from a palette); translation tables use it to decide which range
/// a colour falls into. Equality and hashing only look at the four channels.
///
/// Serializes as a hex string `"#rrggbb"` (or `"#rrggbbaa"` when not opaque).
#[derive(Debug, Clone, Copy)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
    pub index: i16,
}

/// Hue/saturation/lightness, each normalized to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

/// CIE L*a*b*. `l` is in [0, 100]; `a` and `b` are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

/// Tristimulus reference white used by the XYZ <-> Lab step.
///
/// `Yn` is fixed at 100; only `x` and `z` vary with illuminant/observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhitePoint {
    pub x: f64,
    pub z: f64,
}

impl WhitePoint {
    /// D65 illuminant, 2° observer.
    pub const D65: WhitePoint = WhitePoint {
        x: 95.047,
        z: 108.883,
    };

    /// Y tristimulus value of the reference white.
    pub const Y: f64 = 100.0;
}

impl Default for WhitePoint {
    fn default() -> Self {
        Self::D65
    }
}

impl Colour {
    pub const BLACK: Colour = Colour::rgb(0, 0, 0);
    pub const WHITE: Colour = Colour::rgb(255, 255, 255);

    /// Opaque colour with no palette provenance.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Colour with explicit alpha and no palette provenance.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r,
            g,
            b,
            a,
            index: -1,
        }
    }

    /// Returns a copy tagged with the given palette index.
    pub const fn with_index(self, index: i16) -> Self {
        Self { index, ..self }
    }

    /// Returns a copy with the given alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parses a hex colour like "#ff00aa", "ff00aa" or "#ff00aa80" (case insensitive).
    ///
    /// Six digits give an opaque colour; eight digits include alpha.
    pub fn from_hex(hex: &str) -> Result<Colour, PaletteError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 && digits.len() != 8 {
            return Err(PaletteError::InvalidColour(format!(
                "expected 6 or 8 hex digits, got {}",
                digits.len()
            )));
        }
        let channel = |range: std::ops::Range<usize>, name: &str| {
            digits
                .get(range)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| PaletteError::InvalidColour(format!("invalid {name} in '{hex}'")))
        };
        let r = channel(0..2, "red")?;
        let g = channel(2..4, "green")?;
        let b = channel(4..6, "blue")?;
        let a = if digits.len() == 8 {
            channel(6..8, "alpha")?
        } else {
            255
        };
        Ok(Colour::rgba(r, g, b, a))
    }

    /// Formats as `"#rrggbb"`, or `"#rrggbbaa"` when alpha is not 255.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Channels normalized to [0, 1] (r, g, b).
    pub fn to_unit(self) -> [f64; 3] {
        [
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        ]
    }
}

impl Default for Colour {
    fn default() -> Self {
        Colour::BLACK
    }
}

impl PartialEq for Colour {
    fn eq(&self, other: &Self) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b && self.a == other.a
    }
}

impl Eq for Colour {}

impl Hash for Colour {
    fn hash<H: Hasher>(&self, state: &mut H) {
        [self.r, self.g, self.b, self.a].hash(state);
    }
}

impl Serialize for Colour {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Colour {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Colour::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Converts a unit-range value to an 8-bit channel, rounding and clamping.
pub(crate) fn unit_to_channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Linear blend of one channel: `a` at `t = 0`, `b` at `t = 1`.
pub(crate) fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Blends the RGB channels of `from` toward `to`, keeping `from`'s alpha and index.
pub(crate) fn blend(from: Colour, to: Colour, t: f64) -> Colour {
    Colour {
        r: lerp_channel(from.r, to.r, t),
        g: lerp_channel(from.g, to.g, t),
        b: lerp_channel(from.b, to.b, t),
        ..from
    }
}

/// Scales the RGB channels of `colour` by `factor` (expected in [0, 1]).
pub(crate) fn scale(colour: Colour, factor: f64) -> Colour {
    let ch = |v: u8| (v as f64 * factor).round().clamp(0.0, 255.0) as u8;
    Colour {
        r: ch(colour.r),
        g: ch(colour.g),
        b: ch(colour.b),
        ..colour
    }
}

/// Converts RGB to HSL.
///
/// Achromatic colours (max == min) get `s = 0` and, by convention, `h = 0`.
pub fn rgb_to_hsl(c: Colour) -> Hsl {
    let [r, g, b] = c.to_unit();
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return Hsl { h: 0.0, s: 0.0, l };
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsl { h: h / 6.0, s, l }
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = match t {
        t if t < 0.0 => t + 1.0,
        t if t > 1.0 => t - 1.0,
        t => t,
    };
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Converts HSL to an opaque RGB colour, each channel clamped to [0, 255].
pub fn hsl_to_rgb(c: Hsl) -> Colour {
    let (r, g, b) = if c.s == 0.0 {
        (c.l, c.l, c.l)
    } else {
        let q = if c.l < 0.5 {
            c.l * (1.0 + c.s)
        } else {
            c.l + c.s - c.l * c.s
        };
        let p = 2.0 * c.l - q;
        (
            hue_to_channel(p, q, c.h + 1.0 / 3.0),
            hue_to_channel(p, q, c.h),
            hue_to_channel(p, q, c.h - 1.0 / 3.0),
        )
    };
    Colour::rgb(unit_to_channel(r), unit_to_channel(g), unit_to_channel(b))
}

/// Applies inverse sRGB gamma to convert a single sRGB component to linear.
fn srgb_component_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Applies sRGB gamma to convert a single linear component to sRGB.
fn linear_component_to_srgb(c: f64) -> f64 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

const DELTA: f64 = 6.0 / 29.0;

/// CIE transfer function: cube root above (6/29)^3, linear below.
fn lab_f(t: f64) -> f64 {
    if t > DELTA * DELTA * DELTA {
        t.cbrt()
    } else {
        t * 841.0 / 108.0 + 4.0 / 29.0
    }
}

fn lab_f_inv(t: f64) -> f64 {
    if t > DELTA {
        t * t * t
    } else {
        (t - 4.0 / 29.0) * 108.0 / 841.0
    }
}

/// Converts RGB to CIE Lab via XYZ, relative to `white`.
pub fn rgb_to_lab(c: Colour, white: &WhitePoint) -> Lab {
    let [r, g, b] = c.to_unit().map(|v| srgb_component_to_linear(v) * 100.0);

    let x = r * 0.4124564 + g * 0.3575761 + b * 0.1804375;
    let y = r * 0.2126729 + g * 0.7151522 + b * 0.0721750;
    let z = r * 0.0193339 + g * 0.1191920 + b * 0.9503041;

    let fx = lab_f(x / white.x);
    let fy = lab_f(y / WhitePoint::Y);
    let fz = lab_f(z / white.z);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// Converts CIE Lab back to an opaque RGB colour, clamping out-of-gamut values.
pub fn lab_to_rgb(c: Lab, white: &WhitePoint) -> Colour {
    let fy = (c.l + 16.0) / 116.0;
    let fx = fy + c.a / 500.0;
    let fz = fy - c.b / 200.0;

    let x = white.x * lab_f_inv(fx) / 100.0;
    let y = lab_f_inv(fy);
    let z = white.z * lab_f_inv(fz) / 100.0;

    let r = 3.2404542 * x - 1.5371385 * y - 0.4985314 * z;
    let g = -0.9692660 * x + 1.8760108 * y + 0.0415560 * z;
    let b = 0.0556434 * x - 0.2040259 * y + 1.0572252 * z;

    Colour::rgb(
        unit_to_channel(linear_component_to_srgb(r)),
        unit_to_channel(linear_component_to_srgb(g)),
        unit_to_channel(linear_component_to_srgb(b)),
    )
}
