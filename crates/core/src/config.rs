//! Tunable parameters for colour matching and conversion.
//!
//! A [`ColourConfig`] is a plain value: every palette owns one, and nothing
//! in the engine reads process-wide state. It deserializes from partial JSON,
//! so a config file only needs the keys it wants to change.

use crate::colour::{Colour, WhitePoint};
use crate::delta_e::{Cie94Weights, Ciede2000Weights};
use crate::error::PaletteError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Colour-difference metric used for nearest-colour matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Unweighted sum of squared integer channel differences.
    #[default]
    Old,
    /// Weighted squared differences of normalized RGB channels.
    Rgb,
    /// Weighted squared differences in HSL with hue wrap-around.
    Hsl,
    Cie76,
    Cie94,
    Ciede2000,
}

const METRIC_NAMES: &[&str] = &["old", "rgb", "hsl", "cie76", "cie94", "ciede2000"];

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Old,
        Metric::Rgb,
        Metric::Hsl,
        Metric::Cie76,
        Metric::Cie94,
        Metric::Ciede2000,
    ];

    /// Returns a slice of all recognized metric names.
    pub fn list_names() -> &'static [&'static str] {
        METRIC_NAMES
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Old => "old",
            Metric::Rgb => "rgb",
            Metric::Hsl => "hsl",
            Metric::Cie76 => "cie76",
            Metric::Cie94 => "cie94",
            Metric::Ciede2000 => "ciede2000",
        };
        f.write_str(name)
    }
}

impl FromStr for Metric {
    type Err = PaletteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "old" => Ok(Metric::Old),
            "rgb" => Ok(Metric::Rgb),
            "hsl" => Ok(Metric::Hsl),
            "cie76" | "c76" => Ok(Metric::Cie76),
            "cie94" | "c94" => Ok(Metric::Cie94),
            "ciede2000" | "c2k" => Ok(Metric::Ciede2000),
            other => Err(PaletteError::Config(format!(
                "unknown match metric '{other}' (expected one of: {})",
                METRIC_NAMES.join(", ")
            ))),
        }
    }
}

/// How a lookup picks its metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Use the configuration's preferred metric at call time.
    #[default]
    Preferred,
    Explicit(Metric),
}

impl MatchMode {
    /// Resolves to a concrete metric against `config`.
    pub fn resolve(self, config: &ColourConfig) -> Metric {
        match self {
            MatchMode::Preferred => config.match_metric,
            MatchMode::Explicit(m) => m,
        }
    }
}

impl From<Metric> for MatchMode {
    fn from(m: Metric) -> Self {
        MatchMode::Explicit(m)
    }
}

/// Per-channel RGB weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RgbWeights {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Default for RgbWeights {
    fn default() -> Self {
        Self {
            r: 1.0,
            g: 1.0,
            b: 1.0,
        }
    }
}

impl RgbWeights {
    /// Weighted grey level of `c` in [0, 1] (clamped at 1).
    pub fn grey_level(&self, c: Colour) -> f64 {
        let sum = c.r as f64 * self.r + c.g as f64 * self.g + c.b as f64 * self.b;
        (sum / 255.0).min(1.0)
    }
}

/// Per-component HSL weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HslWeights {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Default for HslWeights {
    fn default() -> Self {
        Self {
            h: 1.0,
            s: 1.0,
            l: 1.0,
        }
    }
}

/// Every tunable the palette engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColourConfig {
    /// Metric used when a lookup asks for [`MatchMode::Preferred`].
    pub match_metric: Metric,
    /// Weights for [`Metric::Rgb`].
    pub rgb_weights: RgbWeights,
    /// Weights for [`Metric::Hsl`].
    pub hsl_weights: HslWeights,
    /// Luminance weights used when reducing a colour to grey (colourise, desaturate).
    pub greyscale: RgbWeights,
    pub white_point: WhitePoint,
    pub cie94: Cie94Weights,
    pub ciede2000: Ciede2000Weights,
}

impl Default for ColourConfig {
    fn default() -> Self {
        Self {
            match_metric: Metric::default(),
            rgb_weights: RgbWeights::default(),
            hsl_weights: HslWeights::default(),
            greyscale: RgbWeights {
                r: 0.3,
                g: 0.59,
                b: 0.11,
            },
            white_point: WhitePoint::default(),
            cie94: Cie94Weights::default(),
            ciede2000: Ciede2000Weights::default(),
        }
    }
}

impl ColourConfig {
    /// Parses a configuration from JSON. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, PaletteError> {
        serde_json::from_str(json).map_err(|e| PaletteError::Config(e.to_string()))
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, PaletteError> {
        serde_json::to_string_pretty(self).map_err(|e| PaletteError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_graphic_arts_weights() {
        let cfg = ColourConfig::default();
        assert_eq!(cfg.match_metric, Metric::Old);
        assert!((cfg.cie94.k1 - 0.045).abs() < f64::EPSILON);
        assert!((cfg.cie94.k2 - 0.015).abs() < f64::EPSILON);
        assert!((cfg.ciede2000.kh - 1.0).abs() < f64::EPSILON);
        assert!((cfg.white_point.x - 95.047).abs() < f64::EPSILON);
    }

    #[test]
    fn from_json_keeps_defaults_for_missing_keys() {
        let json = r#"{"match_metric": "ciede2000", "rgb_weights": {"g": 2.0}}"#;
        let cfg = ColourConfig::from_json(json).unwrap();
        assert_eq!(cfg.match_metric, Metric::Ciede2000);
        assert!((cfg.rgb_weights.g - 2.0).abs() < f64::EPSILON);
        assert!((cfg.rgb_weights.r - 1.0).abs() < f64::EPSILON);
        assert_eq!(cfg.greyscale, ColourConfig::default().greyscale);
    }

    #[test]
    fn from_json_empty_object_is_default() {
        let cfg = ColourConfig::from_json("{}").unwrap();
        assert_eq!(cfg, ColourConfig::default());
    }

    #[test]
    fn from_json_rejects_unknown_metric() {
        let err = ColourConfig::from_json(r#"{"match_metric": "fuzzy"}"#).unwrap_err();
        assert!(matches!(err, PaletteError::Config(_)));
    }

    #[test]
    fn json_round_trip() {
        let cfg = ColourConfig {
            match_metric: Metric::Hsl,
            white_point: WhitePoint {
                x: 111.144,
                z: 35.2,
            },
            ..Default::default()
        };
        let back = ColourConfig::from_json(&cfg.to_json().unwrap()).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn metric_names_parse_and_display() {
        for metric in Metric::ALL {
            let name = metric.to_string();
            assert!(Metric::list_names().contains(&name.as_str()));
            assert_eq!(name.parse::<Metric>().unwrap(), metric);
        }
        assert_eq!("C2K".parse::<Metric>().unwrap(), Metric::Ciede2000);
        assert!("nope".parse::<Metric>().is_err());
    }

    #[test]
    fn grey_level_uses_weights_and_clamps() {
        let weights = ColourConfig::default().greyscale;
        assert!((weights.grey_level(Colour::WHITE) - 1.0).abs() < 1e-9);
        assert!((weights.grey_level(Colour::rgb(255, 0, 0)) - 0.3).abs() < 1e-9);
        let heavy = RgbWeights {
            r: 2.0,
            g: 2.0,
            b: 2.0,
        };
        assert_eq!(heavy.grey_level(Colour::rgb(200, 200, 200)), 1.0);
    }

    #[test]
    fn preferred_mode_resolves_through_config() {
        let cfg = ColourConfig {
            match_metric: Metric::Cie94,
            ..Default::default()
        };
        assert_eq!(MatchMode::Preferred.resolve(&cfg), Metric::Cie94);
        assert_eq!(MatchMode::from(Metric::Rgb).resolve(&cfg), Metric::Rgb);
    }
}
