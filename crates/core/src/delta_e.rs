//! CIE colour-difference equations over Lab triples.
//!
//! All three functions return the squared distance: palette matching only
//! needs relative ordering, so the final square root is never taken. Take
//! `.sqrt()` of the result to get the published ΔE value.
//!
//! These are total functions: NaN or infinite inputs propagate to the output.

use crate::colour::Lab;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Parametric weights for CIE94.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cie94Weights {
    pub kl: f64,
    pub k1: f64,
    pub k2: f64,
}

impl Default for Cie94Weights {
    /// Graphic arts values.
    fn default() -> Self {
        Self {
            kl: 1.0,
            k1: 0.045,
            k2: 0.015,
        }
    }
}

/// Parametric weights for CIEDE2000.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ciede2000Weights {
    pub kl: f64,
    pub kc: f64,
    pub kh: f64,
}

impl Default for Ciede2000Weights {
    fn default() -> Self {
        Self {
            kl: 1.0,
            kc: 1.0,
            kh: 1.0,
        }
    }
}

/// 25^7, used by the chroma compensation terms of CIEDE2000.
const POW25_7: f64 = 6_103_515_625.0;

/// CIE76: squared Euclidean distance in Lab.
pub fn cie76(lab1: Lab, lab2: Lab) -> f64 {
    let dl = lab1.l - lab2.l;
    let da = lab1.a - lab2.a;
    let db = lab1.b - lab2.b;
    dl * dl + da * da + db * db
}

/// CIE94 (squared).
///
/// Not symmetric in general: the chroma weighting uses the first colour's
/// chroma, so `lab1` should be the reference colour.
pub fn cie94(lab1: Lab, lab2: Lab, k: &Cie94Weights) -> f64 {
    let c1 = lab1.a.hypot(lab1.b);
    let c2 = lab2.a.hypot(lab2.b);

    let dl = lab1.l - lab2.l;
    let dc = c1 - c2;
    let da = lab1.a - lab2.a;
    let db = lab1.b - lab2.b;
    // Rounding can push the radicand marginally below zero.
    let dh = (da * da + db * db - dc * dc).max(0.0).sqrt();

    let tl = dl / k.kl;
    let tc = dc / (1.0 + k.k1 * c1);
    let th = dh / (1.0 + k.k2 * c1);

    tl * tl + tc * tc + th * th
}

/// Hue angle of (a, b) in radians, normalized to [0, 2π).
fn hue_angle(a: f64, b: f64) -> f64 {
    if a == 0.0 && b == 0.0 {
        0.0
    } else {
        b.atan2(a).rem_euclid(TAU)
    }
}

/// CIEDE2000 (squared).
pub fn ciede2000(lab1: Lab, lab2: Lab, k: &Ciede2000Weights) -> f64 {
    let c1 = lab1.a.hypot(lab1.b);
    let c2 = lab2.a.hypot(lab2.b);
    let c_mean7 = ((c1 + c2) / 2.0).powi(7);
    let g = 0.5 * (1.0 - (c_mean7 / (c_mean7 + POW25_7)).sqrt());

    let a1p = (1.0 + g) * lab1.a;
    let a2p = (1.0 + g) * lab2.a;
    let c1p = a1p.hypot(lab1.b);
    let c2p = a2p.hypot(lab2.b);
    let h1p = hue_angle(a1p, lab1.b);
    let h2p = hue_angle(a2p, lab2.b);

    let chroma_product = c1p * c2p;

    let dl = lab2.l - lab1.l;
    let dc = c2p - c1p;
    let dhp = if chroma_product == 0.0 {
        0.0
    } else {
        match h2p - h1p {
            d if d > PI => d - TAU,
            d if d < -PI => d + TAU,
            d => d,
        }
    };
    let dh = 2.0 * chroma_product.sqrt() * (dhp / 2.0).sin();

    let l_mean = (lab1.l + lab2.l) / 2.0;
    let c_mean = (c1p + c2p) / 2.0;
    let h_mean = if chroma_product == 0.0 {
        h1p + h2p
    } else if (h1p - h2p).abs() <= PI {
        (h1p + h2p) / 2.0
    } else if h1p + h2p < TAU {
        (h1p + h2p + TAU) / 2.0
    } else {
        (h1p + h2p - TAU) / 2.0
    };

    let t = 1.0 - 0.17 * (h_mean - 30f64.to_radians()).cos()
        + 0.24 * (2.0 * h_mean).cos()
        + 0.32 * (3.0 * h_mean + 6f64.to_radians()).cos()
        - 0.20 * (4.0 * h_mean - 63f64.to_radians()).cos();

    let delta_theta =
        30f64.to_radians() * (-((h_mean - 275f64.to_radians()) / 25f64.to_radians()).powi(2)).exp();
    let c_mean7 = c_mean.powi(7);
    let rc = 2.0 * (c_mean7 / (c_mean7 + POW25_7)).sqrt();
    let rt = -(2.0 * delta_theta).sin() * rc;

    let l50 = (l_mean - 50.0).powi(2);
    let sl = 1.0 + 0.015 * l50 / (20.0 + l50).sqrt();
    let sc = 1.0 + 0.045 * c_mean;
    let sh = 1.0 + 0.015 * c_mean * t;

    let tl = dl / (k.kl * sl);
    let tc = dc / (k.kc * sc);
    let th = dh / (k.kh * sh);

    tl * tl + tc * tc + th * th + rt * tc * th
}
