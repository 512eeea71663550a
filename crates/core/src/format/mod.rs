//! Palette file formats.
//!
//! Each codec decodes into a plain list of at most [`MAX_COLOURS`] colours
//! and encodes from a colour slice, so a failed load never touches a
//! palette. [`PaletteFormat`] dispatches to the individual codecs.

mod csv;
mod gimp;
#[cfg(feature = "png")]
mod image_grid;
mod jasc;
mod raw;
mod tokenizer;

use crate::colour::Colour;
use crate::error::PaletteError;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Maximum number of colours any format reads or writes.
pub const MAX_COLOURS: usize = 256;

/// All recognized format names.
const FORMAT_NAMES: &[&str] = &["raw", "image", "csv", "jasc", "gimp"];

/// On-disk palette representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteFormat {
    /// 768 bytes of sequential R, G, B.
    Raw,
    /// PNG with a 16x16 grid of solid colour cells.
    Image,
    /// One `R, G, B` line per colour.
    Csv,
    /// Paint Shop Pro `JASC-PAL` text.
    Jasc,
    /// GIMP `.gpl` text.
    Gimp,
}

impl PaletteFormat {
    /// Returns a slice of all recognized format names.
    pub fn list_names() -> &'static [&'static str] {
        FORMAT_NAMES
    }

    /// Guesses the format from a file extension (case insensitive).
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "lmp" | "raw" | "dat" => Some(PaletteFormat::Raw),
            "png" => Some(PaletteFormat::Image),
            "csv" => Some(PaletteFormat::Csv),
            "pal" => Some(PaletteFormat::Jasc),
            "gpl" => Some(PaletteFormat::Gimp),
            _ => None,
        }
    }

    /// Decodes up to [`MAX_COLOURS`] colours. Decoded colours are opaque.
    pub fn decode(self, data: &[u8]) -> Result<Vec<Colour>, PaletteError> {
        match self {
            PaletteFormat::Raw => raw::decode(data),
            PaletteFormat::Csv => csv::decode(&String::from_utf8_lossy(data)),
            PaletteFormat::Jasc => jasc::decode(&String::from_utf8_lossy(data)),
            PaletteFormat::Gimp => gimp::decode(&String::from_utf8_lossy(data)),
            #[cfg(feature = "png")]
            PaletteFormat::Image => image_grid::decode(data),
            #[cfg(not(feature = "png"))]
            PaletteFormat::Image => Err(PaletteError::UnsupportedFormat(
                "image palettes require the 'png' feature".into(),
            )),
        }
    }

    /// Encodes `colours`; `name` is only used by formats that store one.
    pub fn encode(self, colours: &[Colour], name: &str) -> Result<Vec<u8>, PaletteError> {
        let colours = &colours[..colours.len().min(MAX_COLOURS)];
        match self {
            PaletteFormat::Raw => Ok(raw::encode(colours)),
            PaletteFormat::Csv => Ok(csv::encode(colours).into_bytes()),
            PaletteFormat::Jasc => Ok(jasc::encode(colours).into_bytes()),
            PaletteFormat::Gimp => Ok(gimp::encode(colours, name).into_bytes()),
            #[cfg(feature = "png")]
            PaletteFormat::Image => image_grid::encode(colours),
            #[cfg(not(feature = "png"))]
            PaletteFormat::Image => Err(PaletteError::UnsupportedFormat(
                "image palettes require the 'png' feature".into(),
            )),
        }
    }
}

impl fmt::Display for PaletteFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaletteFormat::Raw => "raw",
            PaletteFormat::Image => "image",
            PaletteFormat::Csv => "csv",
            PaletteFormat::Jasc => "jasc",
            PaletteFormat::Gimp => "gimp",
        };
        f.write_str(name)
    }
}

impl FromStr for PaletteFormat {
    type Err = PaletteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(PaletteFormat::Raw),
            "image" | "png" => Ok(PaletteFormat::Image),
            "csv" => Ok(PaletteFormat::Csv),
            "jasc" | "jasc-pal" => Ok(PaletteFormat::Jasc),
            "gimp" | "gpl" => Ok(PaletteFormat::Gimp),
            other => Err(PaletteError::UnsupportedFormat(format!(
                "'{other}' (expected one of: {})",
                FORMAT_NAMES.join(", ")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_colours() -> Vec<Colour> {
        (0..=255u8)
            .map(|i| Colour::rgb(i, 255 - i, i.wrapping_mul(37)))
            .collect()
    }

    #[test]
    fn text_and_raw_formats_round_trip() {
        let colours = sample_colours();
        for format in [
            PaletteFormat::Raw,
            PaletteFormat::Csv,
            PaletteFormat::Jasc,
            PaletteFormat::Gimp,
        ] {
            let bytes = format.encode(&colours, "test").unwrap();
            let back = format.decode(&bytes).unwrap();
            assert_eq!(back, colours, "{format} did not round-trip");
        }
    }

    #[test]
    fn format_names_parse_and_display() {
        for name in PaletteFormat::list_names() {
            let format: PaletteFormat = name.parse().unwrap();
            assert_eq!(format.to_string(), *name);
        }
    }

    #[test]
    fn unknown_format_name_is_rejected() {
        let err = "bmp".parse::<PaletteFormat>().unwrap_err();
        assert!(matches!(err, PaletteError::UnsupportedFormat(_)));
        assert!(err.to_string().contains("bmp"));
    }

    #[test]
    fn extension_mapping() {
        let cases = [
            ("doom.lmp", Some(PaletteFormat::Raw)),
            ("grid.PNG", Some(PaletteFormat::Image)),
            ("x.csv", Some(PaletteFormat::Csv)),
            ("x.pal", Some(PaletteFormat::Jasc)),
            ("x.gpl", Some(PaletteFormat::Gimp)),
            ("x.txt", None),
            ("noext", None),
        ];
        for (path, expected) in cases {
            let found = PaletteFormat::from_extension(Path::new(path));
            assert_eq!(found, expected, "{path}");
        }
    }

    #[test]
    fn encode_caps_at_max_colours() {
        let colours = vec![Colour::WHITE; 300];
        let bytes = PaletteFormat::Raw.encode(&colours, "").unwrap();
        assert_eq!(bytes.len(), MAX_COLOURS * 3);
    }
}
