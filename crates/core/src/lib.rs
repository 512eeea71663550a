#![deny(unsafe_code)]
//! Core of the palkit indexed-palette engine.
//!
//! Provides the 256-entry [`Palette`] with cached HSL and CIE L*a*b* forms,
//! colour conversions, the CIE76/CIE94/CIEDE2000 colour-difference formulas,
//! nearest-colour matching, palette transforms, translation tables and
//! codecs for raw, CSV, JASC-PAL, GIMP and PNG swatch-grid palettes.

pub mod colour;
pub mod config;
pub mod delta_e;
pub mod error;
pub mod format;
pub mod palette;
pub mod translation;

pub use colour::{Colour, Hsl, Lab, WhitePoint};
pub use config::{ColourConfig, MatchMode, Metric};
pub use error::PaletteError;
pub use format::PaletteFormat;
pub use palette::Palette;
pub use translation::{IndexSpan, Translation, TranslationRange};
