//! GIMP `.gpl` palettes.
//!
//! After the `GIMP Palette` header, lines that do not start with a number
//! (`Name:`, `Columns:`, ...) are metadata and skipped; `#` starts a comment.
//! Anything after the RGB triplet on a row (the colour name) is ignored.

use super::tokenizer::Tokenizer;
use super::MAX_COLOURS;
use crate::colour::Colour;
use crate::error::PaletteError;
use std::fmt::Write;

const HEADER: &str = "GIMP Palette";

pub(super) fn decode(text: &str) -> Result<Vec<Colour>, PaletteError> {
    let mut tz = Tokenizer::new(text, &[], Some('#'));

    let first = tz.next_token().map(|t| t.text).unwrap_or_default();
    let second = tz.next_token().map(|t| t.text).unwrap_or_default();
    if first != "GIMP" || second != "Palette" {
        return Err(PaletteError::InvalidHeader {
            format: "GIMP",
            expected: HEADER,
            found: format!("{first} {second}").trim().to_string(),
        });
    }

    let mut colours = Vec::with_capacity(MAX_COLOURS);
    while colours.len() < MAX_COLOURS {
        let Some(token) = tz.peek() else { break };
        if !token.is_numeric() {
            tz.skip_line(token.line);
            continue;
        }
        match tz.read_rgb()? {
            Some(c) => colours.push(c),
            None => break,
        }
    }
    Ok(colours)
}

pub(super) fn encode(colours: &[Colour], name: &str) -> String {
    let mut out = format!("{HEADER}\nName: {name}\n#\n");
    for (i, c) in colours.iter().enumerate() {
        let _ = writeln!(out, "{}\t{}\t{}\tIndex {i}", c.r, c.g, c.b);
    }
    out
}
