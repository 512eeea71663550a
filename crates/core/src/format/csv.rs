//! Comma-separated `R, G, B` lines, no header. `#` starts a comment.

use super::tokenizer::Tokenizer;
use super::MAX_COLOURS;
use crate::colour::Colour;
use crate::error::PaletteError;
use std::fmt::Write;

pub(super) fn decode(text: &str) -> Result<Vec<Colour>, PaletteError> {
    let mut tz = Tokenizer::new(text, &[',', ':'], Some('#'));
    let mut colours = Vec::with_capacity(MAX_COLOURS);
    while colours.len() < MAX_COLOURS {
        match tz.read_rgb()? {
            Some(c) => colours.push(c),
            None => break,
        }
    }
    if colours.is_empty() {
        return Err(PaletteError::NoColours("CSV"));
    }
    Ok(colours)
}

pub(super) fn encode(colours: &[Colour]) -> String {
    colours.iter().fold(String::new(), |mut out, c| {
        let _ = writeln!(out, "{}, {}, {}", c.r, c.g, c.b);
        out
    })
}
