//! Paint Shop Pro palettes: `JASC-PAL`, `0100`, a count, then `R G B` lines.

use super::tokenizer::Tokenizer;
use super::MAX_COLOURS;
use crate::colour::Colour;
use crate::error::PaletteError;
use std::fmt::Write;

const MAGIC: &str = "JASC-PAL";
const VERSION: &str = "0100";

pub(super) fn decode(text: &str) -> Result<Vec<Colour>, PaletteError> {
    let mut tz = Tokenizer::new(text, &[], None);

    for expected in [MAGIC, VERSION] {
        let found = tz.next_token().map(|t| t.text).unwrap_or_default();
        if found != expected {
            return Err(PaletteError::InvalidHeader {
                format: MAGIC,
                expected,
                found: found.to_string(),
            });
        }
    }

    let count_token = tz.next_token().map(|t| t.text).unwrap_or_default();
    let count = count_token
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=MAX_COLOURS).contains(n))
        .ok_or_else(|| PaletteError::InvalidCount(count_token.to_string()))?;

    let mut colours = Vec::with_capacity(count);
    while colours.len() < count {
        let colour = tz.read_rgb()?.ok_or(PaletteError::MissingComponent {
            component: "red",
            line: tz.line(),
        })?;
        colours.push(colour);
    }
    Ok(colours)
}

pub(super) fn encode(colours: &[Colour]) -> String {
    let mut out = format!("{MAGIC}\n{VERSION}\n{}\n", colours.len());
    for c in colours {
        let _ = writeln!(out, "{} {} {}", c.r, c.g, c.b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_colour_fragment() {
        let colours = decode("JASC-PAL\n0100\n3\n255 0 0\n0 255 0\n0 0 255\n").unwrap();
        assert_eq!(
            colours,
            [
                Colour::rgb(255, 0, 0),
                Colour::rgb(0, 255, 0),
                Colour::rgb(0, 0, 255)
            ]
        );
    }

    #[test]
    fn accepts_crlf_line_endings() {
        let colours = decode("JASC-PAL\r\n0100\r\n1\r\n1 2 3\r\n").unwrap();
        assert_eq!(colours, [Colour::rgb(1, 2, 3)]);
    }

    #[test]
    fn rejects_wrong_magic() {
        match decode("GIMP Palette\n").unwrap_err() {
            PaletteError::InvalidHeader { expected, found, .. } => {
                assert_eq!(expected, MAGIC);
                assert_eq!(found, "GIMP");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_wrong_version() {
        match decode("JASC-PAL\n0200\n1\n0 0 0\n").unwrap_err() {
            PaletteError::InvalidHeader { expected, .. } => assert_eq!(expected, VERSION),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_out_of_range_counts() {
        for count in ["0", "257", "many", ""] {
            let text = format!("JASC-PAL\n0100\n{count}\n");
            assert!(
                matches!(decode(&text).unwrap_err(), PaletteError::InvalidCount(_)),
                "count '{count}' should be rejected"
            );
        }
    }

    #[test]
    fn fewer_colours_than_count_is_an_error() {
        let err = decode("JASC-PAL\n0100\n2\n1 2 3\n").unwrap_err();
        assert!(matches!(err, PaletteError::MissingComponent { .. }));
    }

    #[test]
    fn extra_colours_beyond_count_are_ignored() {
        let colours = decode("JASC-PAL\n0100\n1\n1 2 3\n4 5 6\n").unwrap();
        assert_eq!(colours.len(), 1);
    }

    #[test]
    fn encode_writes_header_and_rows() {
        let text = encode(&[Colour::rgb(1, 2, 3), Colour::rgb(4, 5, 6)]);
        assert_eq!(text, "JASC-PAL\n0100\n2\n1 2 3\n4 5 6\n");
    }
}
