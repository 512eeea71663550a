//! Palette translation tables.
//!
//! A [`Translation`] is an ordered list of ranges, each keyed on a source
//! index span. Translating a colour looks up the palette index it came from
//! and applies the last range covering that index. Ranges are written in the
//! usual text form, several separated by commas:
//!
//! | Syntax                   | Effect                                        |
//! |--------------------------|-----------------------------------------------|
//! | `a:b=c:d`                | remap indices `a..=b` onto `c..=d`            |
//! | `a:b=[r,g,b]:[r,g,b]`    | replace with an RGB gradient                  |
//! | `a:b=%[r,g,b]:[r,g,b]`   | desaturate, then map grey onto a 0-2 gradient |
//! | `a:b=#[r,g,b]`           | colourise by grey level                       |
//! | `a:b=@amount[r,g,b]`     | tint by `amount` percent                      |

use crate::colour::{blend, lerp_channel, scale, unit_to_channel, Colour};
use crate::error::PaletteError;
use crate::palette::Palette;
use std::fmt;
use std::str::FromStr;

/// An inclusive span of palette indices. `start` may be greater than `end`,
/// which reverses the direction of remaps and gradients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpan {
    pub start: u8,
    pub end: u8,
}

impl IndexSpan {
    /// Creates a span from `start` to `end`, inclusive.
    pub const fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    /// Returns true if `index` lies in the span, whichever way it runs.
    pub fn contains(self, index: u8) -> bool {
        let (lo, hi) = if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        };
        (lo..=hi).contains(&index)
    }

    /// Position of `index` along the span, 0 at `start` and 1 at `end`.
    pub fn position(self, index: u8) -> f64 {
        if self.start == self.end {
            return 0.0;
        }
        (index as f64 - self.start as f64) / (self.end as f64 - self.start as f64)
    }

    /// Index at position `t` along the span.
    pub fn at(self, t: f64) -> u8 {
        lerp_channel(self.start, self.end, t)
    }
}

impl fmt::Display for IndexSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// One entry of a translation table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TranslationRange {
    /// Map the span onto another span of the same palette.
    Remap {
        origin: IndexSpan,
        target: IndexSpan,
    },
    /// Replace with a gradient from `start` to `end` across the span.
    Gradient {
        origin: IndexSpan,
        start: Colour,
        end: Colour,
    },
    /// Reduce to grey, then map grey onto a per-channel gradient whose
    /// factors are in [0, 2].
    Desaturate {
        origin: IndexSpan,
        start: [f64; 3],
        end: [f64; 3],
    },
    /// Multiply `colour` by the source grey level.
    Colourise { origin: IndexSpan, colour: Colour },
    /// Blend toward `colour` by `amount` in [0, 1].
    Tint {
        origin: IndexSpan,
        colour: Colour,
        amount: f64,
    },
}

impl TranslationRange {
    /// Returns the source span this range applies to.
    pub fn origin(&self) -> IndexSpan {
        match *self {
            TranslationRange::Remap { origin, .. }
            | TranslationRange::Gradient { origin, .. }
            | TranslationRange::Desaturate { origin, .. }
            | TranslationRange::Colourise { origin, .. }
            | TranslationRange::Tint { origin, .. } => origin,
        }
    }

    /// Translates `colour`, which sits at `index` inside this range's origin.
    /// Alpha and index are carried over from `colour`.
    fn apply(&self, colour: Colour, index: u8, palette: &Palette) -> Colour {
        let t = self.origin().position(index);
        let greyscale = palette.config().greyscale;
        let rgb = match *self {
            TranslationRange::Remap { target, .. } => palette.colour(target.at(t) as usize),
            TranslationRange::Gradient { start, end, .. } => blend(start, end, t),
            TranslationRange::Desaturate { start, end, .. } => {
                let grey = greyscale.grey_level(colour);
                let ch = |k: usize| {
                    unit_to_channel((start[k] + (end[k] - start[k]) * grey).clamp(0.0, 1.0))
                };
                Colour::rgb(ch(0), ch(1), ch(2))
            }
            TranslationRange::Colourise { colour: target, .. } => {
                scale(target, greyscale.grey_level(colour))
            }
            TranslationRange::Tint {
                colour: target,
                amount,
                ..
            } => blend(colour, target, amount),
        };
        Colour {
            r: rgb.r,
            g: rgb.g,
            b: rgb.b,
            ..colour
        }
    }
}

fn write_rgb(f: &mut fmt::Formatter<'_>, c: Colour) -> fmt::Result {
    write!(f, "[{},{},{}]", c.r, c.g, c.b)
}

impl fmt::Display for TranslationRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.origin())?;
        match *self {
            TranslationRange::Remap { target, .. } => write!(f, "{target}"),
            TranslationRange::Gradient { start, end, .. } => {
                write_rgb(f, start)?;
                f.write_str(":")?;
                write_rgb(f, end)
            }
            TranslationRange::Desaturate { start, end, .. } => write!(
                f,
                "%[{},{},{}]:[{},{},{}]",
                start[0], start[1], start[2], end[0], end[1], end[2]
            ),
            TranslationRange::Colourise { colour, .. } => {
                f.write_str("#")?;
                write_rgb(f, colour)
            }
            TranslationRange::Tint { colour, amount, .. } => {
                // six decimals, so 0.07 prints as 7 and parses back to 0.07
                let percent = (amount * 100.0 * 1e6).round() / 1e6;
                write!(f, "@{percent}")?;
                write_rgb(f, colour)
            }
        }
    }
}

impl FromStr for TranslationRange {
    type Err = PaletteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().trim_matches('"').trim();
        let fail = |reason: &str| PaletteError::InvalidTranslation {
            input: text.to_string(),
            reason: reason.to_string(),
        };

        let (lhs, rhs) = text.split_once('=').ok_or_else(|| fail("missing '='"))?;
        let origin =
            parse_span(lhs).ok_or_else(|| fail("source must be 'start:end' indices in 0-255"))?;
        let rhs = rhs.trim();

        let range = if let Some(rest) = rhs.strip_prefix('%') {
            let (start, end) =
                split_pair(rest).ok_or_else(|| fail("expected '%[r,g,b]:[r,g,b]'"))?;
            let factors = |t: &str| {
                parse_triplet::<f64>(t)
                    .filter(|v| v.iter().all(|x| x.is_finite()))
                    .map(|v| v.map(|x| x.clamp(0.0, 2.0)))
            };
            TranslationRange::Desaturate {
                origin,
                start: factors(start).ok_or_else(|| fail("desaturation factors must be numbers"))?,
                end: factors(end).ok_or_else(|| fail("desaturation factors must be numbers"))?,
            }
        } else if let Some(rest) = rhs.strip_prefix('#') {
            TranslationRange::Colourise {
                origin,
                colour: parse_rgb(rest).ok_or_else(|| fail("expected '#[r,g,b]'"))?,
            }
        } else if let Some(rest) = rhs.strip_prefix('@') {
            let open = rest.find('[').ok_or_else(|| fail("expected '@amount[r,g,b]'"))?;
            let amount: f64 = rest[..open]
                .trim()
                .parse()
                .ok()
                .filter(|a: &f64| a.is_finite())
                .ok_or_else(|| fail("tint amount must be a number"))?;
            TranslationRange::Tint {
                origin,
                colour: parse_rgb(&rest[open..])
                    .ok_or_else(|| fail("expected '@amount[r,g,b]'"))?,
                amount: (amount / 100.0).clamp(0.0, 1.0),
            }
        } else if rhs.starts_with('[') {
            let (start, end) =
                split_pair(rhs).ok_or_else(|| fail("expected '[r,g,b]:[r,g,b]'"))?;
            TranslationRange::Gradient {
                origin,
                start: parse_rgb(start).ok_or_else(|| fail("gradient colours must be 0-255"))?,
                end: parse_rgb(end).ok_or_else(|| fail("gradient colours must be 0-255"))?,
            }
        } else {
            TranslationRange::Remap {
                origin,
                target: parse_span(rhs)
                    .ok_or_else(|| fail("target must be 'start:end' indices in 0-255"))?,
            }
        };
        Ok(range)
    }
}

fn parse_span(s: &str) -> Option<IndexSpan> {
    let (a, b) = s.split_once(':')?;
    let start = a.trim().parse().ok()?;
    let end = b.trim().parse().ok()?;
    Some(IndexSpan::new(start, end))
}

/// Splits `[..]:[..]` into its two bracketed halves.
fn split_pair(s: &str) -> Option<(&str, &str)> {
    let close = s.find(']')?;
    let (first, rest) = s.split_at(close + 1);
    let second = rest.trim_start().strip_prefix(':')?;
    Some((first, second))
}

/// Parses `[x,y,z]` into three values.
fn parse_triplet<T: FromStr>(s: &str) -> Option<[T; 3]> {
    let inner = s.trim().strip_prefix('[')?.strip_suffix(']')?;
    let mut parts = inner.split(',').map(|p| p.trim().parse::<T>());
    let v = [
        parts.next()?.ok()?,
        parts.next()?.ok()?,
        parts.next()?.ok()?,
    ];
    if parts.next().is_some() {
        return None;
    }
    Some(v)
}

fn parse_rgb(s: &str) -> Option<Colour> {
    parse_triplet::<u8>(s).map(|[r, g, b]| Colour::rgb(r, g, b))
}

/// An ordered list of translation ranges. Later ranges take precedence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translation {
    ranges: Vec<TranslationRange>,
}

impl Translation {
    /// Creates an empty translation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a range. It takes precedence over every range already added.
    pub fn push(&mut self, range: TranslationRange) {
        self.ranges.push(range);
    }

    /// Returns the ranges in the order they were added.
    pub fn ranges(&self) -> &[TranslationRange] {
        &self.ranges
    }

    /// Returns true if the translation has no ranges.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Translates `colour` according to the palette index it was read from.
    /// Colours without an index, or with an index no range covers, come back
    /// unchanged.
    pub fn translate(&self, colour: Colour, palette: &Palette) -> Colour {
        let Ok(index) = u8::try_from(colour.index) else {
            return colour;
        };
        self.ranges
            .iter()
            .rev()
            .find(|r| r.origin().contains(index))
            .map_or(colour, |r| r.apply(colour, index, palette))
    }
}

impl From<Vec<TranslationRange>> for Translation {
    fn from(ranges: Vec<TranslationRange>) -> Self {
        Self { ranges }
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{range}")?;
        }
        Ok(())
    }
}

impl FromStr for Translation {
    type Err = PaletteError;

    /// Parses a comma-separated list of ranges. Commas inside `[...]` belong
    /// to the colour and do not split.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ranges = Vec::new();
        let mut depth = 0usize;
        let mut start = 0;
        for (i, ch) in s.char_indices() {
            match ch {
                '[' => depth += 1,
                ']' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    ranges.push(s[start..i].parse()?);
                    start = i + 1;
                }
                _ => {}
            }
        }
        let last = &s[start..];
        if !last.trim().is_empty() || ranges.is_empty() {
            ranges.push(last.parse()?);
        }
        Ok(Self { ranges })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rainbow() -> Palette {
        let mut pal = Palette::with_size(16);
        pal.set_colour(1, Colour::rgb(255, 0, 0));
        pal.set_colour(2, Colour::rgb(0, 255, 0));
        pal.set_colour(3, Colour::rgb(0, 0, 255));
        pal
    }

    // -- Parsing tests --

    #[test]
    fn parses_remap() {
        let r: TranslationRange = "0:15=16:31".parse().unwrap();
        assert_eq!(
            r,
            TranslationRange::Remap {
                origin: IndexSpan::new(0, 15),
                target: IndexSpan::new(16, 31),
            }
        );
    }

    #[test]
    fn parses_gradient_with_spaces_and_quotes() {
        let r: TranslationRange = "\" 1:3 = [255, 0, 0] : [0,0,255] \"".parse().unwrap();
        assert_eq!(
            r,
            TranslationRange::Gradient {
                origin: IndexSpan::new(1, 3),
                start: Colour::rgb(255, 0, 0),
                end: Colour::rgb(0, 0, 255),
            }
        );
    }

    #[test]
    fn parses_desaturate_and_clamps_factors() {
        let r: TranslationRange = "0:255=%[0,0,0]:[1.5,3,1]".parse().unwrap();
        assert_eq!(
            r,
            TranslationRange::Desaturate {
                origin: IndexSpan::new(0, 255),
                start: [0.0, 0.0, 0.0],
                end: [1.5, 2.0, 1.0],
            }
        );
    }

    #[test]
    fn parses_colourise_and_tint() {
        let c: TranslationRange = "4:8=#[10,20,30]".parse().unwrap();
        assert_eq!(
            c,
            TranslationRange::Colourise {
                origin: IndexSpan::new(4, 8),
                colour: Colour::rgb(10, 20, 30),
            }
        );
        let t: TranslationRange = "4:8=@25[10,20,30]".parse().unwrap();
        assert_eq!(
            t,
            TranslationRange::Tint {
                origin: IndexSpan::new(4, 8),
                colour: Colour::rgb(10, 20, 30),
                amount: 0.25,
            }
        );
    }

    #[test]
    fn rejects_malformed_ranges() {
        for bad in [
            "",
            "0:15",
            "0-15=16:31",
            "0:300=1:2",
            "0:1=[1,2]:[3,4,5]",
            "0:1=[1,2,3]",
            "0:1=#[1,2,256]",
            "0:1=@x[1,2,3]",
            "0:1=%[a,0,0]:[1,1,1]",
        ] {
            let err = bad.parse::<TranslationRange>().unwrap_err();
            assert!(
                matches!(err, PaletteError::InvalidTranslation { .. }),
                "'{bad}' gave {err:?}"
            );
        }
    }

    #[test]
    fn list_splits_outside_brackets_only() {
        let text = "1:1=[1,2,3]:[4,5,6], 2:2=3:3,3:3=#[7,8,9]";
        let t: Translation = text.parse().unwrap();
        assert_eq!(t.ranges().len(), 3);
        assert!(matches!(t.ranges()[1], TranslationRange::Remap { .. }));
        assert!("1:1=2:2,".parse::<Translation>().is_ok());
        assert!("".parse::<Translation>().is_err());
    }

    #[test]
    fn display_parses_back() {
        let text = "0:15=16:31, 1:3=[255,0,0]:[0,0,255], 0:255=%[0,0.5,0]:[1,2,1], \
                    4:8=#[10,20,30], 9:9=@50[1,2,3]";
        let t: Translation = text.parse().unwrap();
        assert_eq!(t.to_string(), text);
        assert_eq!(t.to_string().parse::<Translation>().unwrap(), t);
    }

    #[test]
    fn fractional_tint_percent_displays_exactly() {
        for text in ["0:0=@7[1,2,3]", "0:0=@12.5[1,2,3]", "3:1=@0.1[9,9,9]"] {
            let r: TranslationRange = text.parse().unwrap();
            assert_eq!(r.to_string(), text);
            assert_eq!(r.to_string().parse::<TranslationRange>().unwrap(), r);
        }
    }

    // -- Translation tests --

    #[test]
    fn remap_reads_target_from_palette() {
        let pal = rainbow();
        let t: Translation = "5:7=1:3".parse().unwrap();
        assert_eq!(t.translate(pal.colour(5), &pal), Colour::rgb(255, 0, 0));
        assert_eq!(t.translate(pal.colour(6), &pal), Colour::rgb(0, 255, 0));
        assert_eq!(t.translate(pal.colour(7), &pal), Colour::rgb(0, 0, 255));
        assert_eq!(t.translate(pal.colour(8), &pal), pal.colour(8));
    }

    #[test]
    fn reversed_remap_flips_order() {
        let pal = rainbow();
        let t: Translation = "1:3=3:1".parse().unwrap();
        assert_eq!(t.translate(pal.colour(1), &pal), Colour::rgb(0, 0, 255));
        assert_eq!(t.translate(pal.colour(3), &pal), Colour::rgb(255, 0, 0));
    }

    #[test]
    fn gradient_spans_origin() {
        let pal = Palette::new();
        let t: Translation = "10:20=[0,0,0]:[200,100,0]".parse().unwrap();
        assert_eq!(t.translate(pal.colour(10), &pal), Colour::rgb(0, 0, 0));
        assert_eq!(t.translate(pal.colour(15), &pal), Colour::rgb(100, 50, 0));
        assert_eq!(t.translate(pal.colour(20), &pal), Colour::rgb(200, 100, 0));
    }

    #[test]
    fn desaturate_maps_grey_onto_factors() {
        let mut pal = Palette::with_size(4);
        pal.set_colour(0, Colour::WHITE);
        pal.set_colour(1, Colour::BLACK);
        let t: Translation = "0:1=%[0,0,0]:[1,0.5,2]".parse().unwrap();
        let expected = Colour::rgb(255, 128, 255);
        assert_eq!(t.translate(pal.colour(0), &pal), expected);
        assert_eq!(t.translate(pal.colour(1), &pal), Colour::BLACK);
    }

    #[test]
    fn colourise_and_tint_keep_alpha() {
        let mut pal = Palette::with_size(4);
        pal.set_colour(0, Colour::rgba(255, 255, 255, 40));
        let c: Translation = "0:0=#[100,50,10]".parse().unwrap();
        let colourised = Colour::rgba(100, 50, 10, 40);
        assert_eq!(c.translate(pal.colour(0), &pal), colourised);
        let t: Translation = "0:0=@100[1,2,3]".parse().unwrap();
        assert_eq!(t.translate(pal.colour(0), &pal), Colour::rgba(1, 2, 3, 40));
    }

    #[test]
    fn later_ranges_win() {
        let pal = rainbow();
        let t: Translation = "0:15=#[9,9,9], 2:2=1:1".parse().unwrap();
        assert_eq!(t.translate(pal.colour(2), &pal), Colour::rgb(255, 0, 0));
        let t: Translation = "2:2=1:1, 0:15=1:1".parse().unwrap();
        assert_eq!(t.translate(pal.colour(2), &pal), Colour::rgb(255, 0, 0));
    }

    #[test]
    fn colour_without_index_is_unchanged() {
        let pal = rainbow();
        let t: Translation = "0:255=#[1,2,3]".parse().unwrap();
        let loose = Colour::rgb(200, 200, 200);
        assert_eq!(loose.index, -1);
        assert_eq!(t.translate(loose, &pal), loose);
    }

    #[test]
    fn span_position_and_contains() {
        let span = IndexSpan::new(20, 10);
        assert!(span.contains(15));
        assert!(!span.contains(21));
        assert_eq!(span.position(20), 0.0);
        assert_eq!(span.position(10), 1.0);
        assert_eq!(IndexSpan::new(4, 4).position(4), 0.0);
        assert_eq!(IndexSpan::new(0, 10).at(0.5), 5);
    }
}
