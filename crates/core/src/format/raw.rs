//! Raw 768-byte RGB palettes (e.g. Doom `PLAYPAL` lumps).

use super::MAX_COLOURS;
use crate::colour::Colour;
use crate::error::PaletteError;

pub(super) fn decode(data: &[u8]) -> Result<Vec<Colour>, PaletteError> {
    if data.len() < 3 {
        return Err(PaletteError::TooShort {
            needed: 3,
            got: data.len(),
        });
    }
    Ok(data
        .chunks_exact(3)
        .take(MAX_COLOURS)
        .map(|c| Colour::rgb(c[0], c[1], c[2]))
        .collect())
}

/// Always emits exactly 768 bytes; missing colours are written as black.
pub(super) fn encode(colours: &[Colour]) -> Vec<u8> {
    let mut out: Vec<u8> = colours.iter().flat_map(|c| [c.r, c.g, c.b]).collect();
    out.resize(MAX_COLOURS * 3, 0);
    out
}
