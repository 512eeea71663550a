//! A fixed-size indexed palette with cached HSL and Lab forms.
//!
//! Every entry keeps its RGBA colour together with the HSL and CIE L*a*b*
//! values derived from it, so matching and colour-space transforms never
//! recompute conversions for the whole palette. Any write to an entry
//! refreshes all three forms at once.

use crate::colour::{
    blend, hsl_to_rgb, lerp_channel, rgb_to_hsl, rgb_to_lab, scale, Colour, Hsl, Lab, WhitePoint,
};
use crate::config::{ColourConfig, HslWeights, MatchMode, Metric};
use crate::delta_e;
use crate::error::PaletteError;
use crate::format::{PaletteFormat, MAX_COLOURS};
use crate::translation::Translation;
use std::collections::HashSet;
use std::ops::{Bound, RangeBounds, RangeInclusive};
use std::path::Path;

/// One palette slot: the colour and its derived forms.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Entry {
    rgb: Colour,
    hsl: Hsl,
    lab: Lab,
}

impl Entry {
    fn from_rgb(rgb: Colour, white: &WhitePoint) -> Self {
        Self {
            rgb,
            hsl: rgb_to_hsl(rgb),
            lab: rgb_to_lab(rgb, white),
        }
    }

    /// Rebuilds from an edited HSL value. The HSL value is kept as given
    /// rather than re-derived, so repeated edits do not drift.
    fn from_hsl(hsl: Hsl, like: Colour, white: &WhitePoint) -> Self {
        let rgb = hsl_to_rgb(hsl).with_alpha(like.a).with_index(like.index);
        Self {
            rgb,
            hsl,
            lab: rgb_to_lab(rgb, white),
        }
    }
}

/// Pre-computed forms of a colour being matched against the palette.
struct Query {
    rgb: Colour,
    hsl: Hsl,
    lab: Lab,
}

/// An indexed palette of up to 256 colours.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    entries: Vec<Entry>,
    transparent_index: Option<u8>,
    config: ColourConfig,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

impl Palette {
    // -- Construction --

    /// Creates a 256-entry greyscale ramp with the default configuration.
    pub fn new() -> Self {
        Self::with_size(MAX_COLOURS)
    }

    /// Creates a greyscale ramp of `size` entries, clamped to 1..=256.
    ///
    /// Entry `i` has every channel set to `floor(i / size * 255)` and alpha 255.
    pub fn with_size(size: usize) -> Self {
        Self::with_config(size, ColourConfig::default())
    }

    /// Creates a greyscale ramp of `size` entries using `config`.
    pub fn with_config(size: usize, config: ColourConfig) -> Self {
        let size = size.clamp(1, MAX_COLOURS);
        let entries = (0..size)
            .map(|i| {
                let v = (i as f64 / size as f64 * 255.0) as u8;
                let grey = Colour::rgb(v, v, v).with_index(i as i16);
                Entry::from_rgb(grey, &config.white_point)
            })
            .collect();
        Self {
            entries,
            transparent_index: None,
            config,
        }
    }

    /// Returns the colour-matching configuration.
    pub fn config(&self) -> &ColourConfig {
        &self.config
    }

    /// Replaces the configuration. Lab caches are rebuilt because they depend
    /// on the white point.
    pub fn set_config(&mut self, config: ColourConfig) {
        let rebuild = config.white_point != self.config.white_point;
        self.config = config;
        if rebuild {
            let white = self.config.white_point;
            for entry in &mut self.entries {
                entry.lab = rgb_to_lab(entry.rgb, &white);
            }
        }
    }

    // -- Access --

    /// Returns the number of entries in this palette.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a palette has at least one entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the colour at `index` tagged with that index, or opaque black
    /// when out of range.
    pub fn colour(&self, index: usize) -> Colour {
        self.get(index).unwrap_or(Colour::BLACK)
    }

    /// Returns the colour at `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<Colour> {
        self.entries.get(index).map(|e| e.rgb)
    }

    /// Returns the cached HSL form of entry `index`.
    pub fn hsl(&self, index: usize) -> Option<Hsl> {
        self.entries.get(index).map(|e| e.hsl)
    }

    /// Returns the cached Lab form of entry `index`.
    pub fn lab(&self, index: usize) -> Option<Lab> {
        self.entries.get(index).map(|e| e.lab)
    }

    /// Iterates over the colours in index order.
    pub fn colours(&self) -> impl Iterator<Item = Colour> + '_ {
        self.entries.iter().map(|e| e.rgb)
    }

    /// Returns the index marked as transparent, if any.
    pub fn transparent_index(&self) -> Option<u8> {
        self.transparent_index
    }

    /// Marks `index` as transparent, or clears the mark with `None`.
    pub fn set_transparent_index(&mut self, index: Option<u8>) {
        self.transparent_index = index;
    }

    // -- Mutation --

    /// Sets entry `index` and refreshes its derived forms. Out-of-range
    /// indices are ignored.
    pub fn set_colour(&mut self, index: usize, colour: Colour) {
        let white = self.config.white_point;
        let len = self.entries.len();
        match self.entries.get_mut(index) {
            Some(entry) => *entry = Entry::from_rgb(colour.with_index(index as i16), &white),
            None => tracing::debug!(index, len, "set_colour out of range"),
        }
    }

    /// Sets the red channel of entry `index`.
    pub fn set_colour_r(&mut self, index: usize, r: u8) {
        self.update(index, |c| Colour { r, ..c });
    }

    /// Sets the green channel of entry `index`.
    pub fn set_colour_g(&mut self, index: usize, g: u8) {
        self.update(index, |c| Colour { g, ..c });
    }

    /// Sets the blue channel of entry `index`.
    pub fn set_colour_b(&mut self, index: usize, b: u8) {
        self.update(index, |c| Colour { b, ..c });
    }

    /// Sets the alpha channel of entry `index`.
    pub fn set_colour_a(&mut self, index: usize, a: u8) {
        self.update(index, |c| c.with_alpha(a));
    }

    fn update(&mut self, index: usize, f: impl FnOnce(Colour) -> Colour) {
        if let Some(current) = self.get(index) {
            self.set_colour(index, f(current));
        }
    }

    /// Fills `start..=end` with a linear blend from `from` to `to`, alpha
    /// included. A single-entry range receives `from`.
    pub fn set_gradient(&mut self, start: usize, end: usize, from: Colour, to: Colour) {
        let end = end.min(self.len() - 1);
        if start > end {
            return;
        }
        let span = end - start;
        for i in start..=end {
            let t = if span == 0 {
                0.0
            } else {
                (i - start) as f64 / span as f64
            };
            let c = Colour::rgba(
                lerp_channel(from.r, to.r, t),
                lerp_channel(from.g, to.g, t),
                lerp_channel(from.b, to.b, t),
                lerp_channel(from.a, to.a, t),
            );
            self.set_colour(i, c);
        }
    }

    /// Copies `min(self.len(), other.len())` entries and the transparent
    /// index from `other`. This palette keeps its own size and configuration.
    pub fn copy_palette(&mut self, other: &Palette) {
        let rebuild = other.config.white_point != self.config.white_point;
        let white = self.config.white_point;
        for (dst, src) in self.entries.iter_mut().zip(&other.entries) {
            *dst = *src;
            if rebuild {
                dst.lab = rgb_to_lab(dst.rgb, &white);
            }
        }
        self.transparent_index = other.transparent_index;
    }

    // -- Lookup --

    /// Index of the first entry equal to `colour` (RGBA), if any.
    pub fn find_colour(&self, colour: Colour) -> Option<usize> {
        self.entries.iter().position(|e| e.rgb == colour)
    }

    /// Index of the entry closest to `colour` under `mode`.
    ///
    /// Ties go to the lowest index, and the scan stops at the first exact
    /// match.
    ///
    /// [`Metric::Hsl`] compares against each entry's cached HSL. After
    /// [`saturate`](Self::saturate), [`illuminate`](Self::illuminate) or
    /// [`shift`](Self::shift) that cache holds the edited value rather than
    /// one re-derived from the rounded RGB, so an edited entry can score
    /// above zero against its own colour and a later entry may win.
    pub fn nearest_colour(&self, colour: Colour, mode: impl Into<MatchMode>) -> usize {
        let metric = mode.into().resolve(&self.config);
        let query = self.query(colour);
        let mut best = 0;
        let mut min = f64::INFINITY;
        for (i, entry) in self.entries.iter().enumerate() {
            let d = self.distance(&query, entry, metric);
            if d < min {
                min = d;
                best = i;
            }
            if d == 0.0 {
                break;
            }
        }
        best
    }

    /// Distance between `colour` and entry `index` under `mode`, or
    /// infinity when `index` is out of range. [`Metric::Hsl`] reads the
    /// cached HSL, as in [`nearest_colour`](Self::nearest_colour).
    pub fn colour_diff(&self, colour: Colour, index: usize, mode: impl Into<MatchMode>) -> f64 {
        let metric = mode.into().resolve(&self.config);
        match self.entries.get(index) {
            Some(entry) => self.distance(&self.query(colour), entry, metric),
            None => f64::INFINITY,
        }
    }

    /// Number of distinct RGBA values in the palette.
    pub fn count_colours(&self) -> usize {
        let distinct: HashSet<Colour> = self.colours().collect();
        distinct.len()
    }

    fn query(&self, colour: Colour) -> Query {
        Query {
            rgb: colour,
            hsl: rgb_to_hsl(colour),
            lab: rgb_to_lab(colour, &self.config.white_point),
        }
    }

    fn distance(&self, query: &Query, entry: &Entry, metric: Metric) -> f64 {
        let cfg = &self.config;
        match metric {
            Metric::Old => {
                let d = |a: u8, b: u8| {
                    let d = a as i32 - b as i32;
                    d * d
                };
                let (p, e) = (query.rgb, entry.rgb);
                (d(p.r, e.r) + d(p.g, e.g) + d(p.b, e.b)) as f64
            }
            Metric::Rgb => {
                let [r1, g1, b1] = query.rgb.to_unit();
                let [r2, g2, b2] = entry.rgb.to_unit();
                let w = &cfg.rgb_weights;
                (r1 - r2).powi(2) * w.r + (g1 - g2).powi(2) * w.g + (b1 - b2).powi(2) * w.b
            }
            Metric::Hsl => hsl_distance(query.hsl, entry.hsl, &cfg.hsl_weights),
            Metric::Cie76 => delta_e::cie76(query.lab, entry.lab),
            Metric::Cie94 => delta_e::cie94(query.lab, entry.lab, &cfg.cie94),
            Metric::Ciede2000 => delta_e::ciede2000(query.lab, entry.lab, &cfg.ciede2000),
        }
    }

    // -- Transforms --

    /// Applies `translation` to every entry. Ranges read the palette as it
    /// was before the call, so overlapping remaps do not cascade.
    pub fn apply_translation(&mut self, translation: &Translation) {
        let original = self.clone();
        for i in 0..self.len() {
            let translated = translation.translate(original.colour(i), &original);
            self.set_colour(i, translated);
        }
    }

    /// Replaces each entry in `range` with `colour` scaled by the entry's
    /// grey level. Alpha is kept.
    pub fn colourise(&mut self, colour: Colour, range: impl RangeBounds<usize>) {
        let weights = self.config.greyscale;
        for i in self.index_range(range) {
            let current = self.colour(i);
            let grey = weights.grey_level(current);
            let tinted = scale(colour, grey).with_alpha(current.a);
            self.set_colour(i, tinted);
        }
    }

    /// Blends each entry in `range` toward `colour` by `amount` (clamped to [0, 1]).
    pub fn tint(&mut self, colour: Colour, amount: f64, range: impl RangeBounds<usize>) {
        let amount = amount.clamp(0.0, 1.0);
        for i in self.index_range(range) {
            let blended = blend(self.colour(i), colour, amount);
            self.set_colour(i, blended);
        }
    }

    /// Integer tint over the whole palette: each channel moves toward the
    /// target by `shift / steps`. Does nothing when `steps <= 0`.
    pub fn idtint(&mut self, r: u8, g: u8, b: u8, shift: i32, steps: i32) {
        if steps <= 0 {
            return;
        }
        let ch = |c: u8, t: u8| {
            let c = c as i32;
            (c + (t as i32 - c) * shift / steps).clamp(0, 255) as u8
        };
        for i in 0..self.len() {
            let c = self.colour(i);
            self.set_colour(
                i,
                Colour {
                    r: ch(c.r, r),
                    g: ch(c.g, g),
                    b: ch(c.b, b),
                    ..c
                },
            );
        }
    }

    /// Multiplies saturation by `amount` (clamped to [0, 2]), capped at 1.
    pub fn saturate(&mut self, amount: f64, range: impl RangeBounds<usize>) {
        let amount = amount.clamp(0.0, 2.0);
        self.edit_hsl(range, |hsl| Hsl {
            s: (hsl.s * amount).min(1.0),
            ..hsl
        });
    }

    /// Multiplies lightness by `amount` (clamped to [0, 2]), capped at 1.
    pub fn illuminate(&mut self, amount: f64, range: impl RangeBounds<usize>) {
        let amount = amount.clamp(0.0, 2.0);
        self.edit_hsl(range, |hsl| Hsl {
            l: (hsl.l * amount).min(1.0),
            ..hsl
        });
    }

    /// Rotates hue by `amount` turns (clamped to [0, 1]), wrapping at 1.
    pub fn shift(&mut self, amount: f64, range: impl RangeBounds<usize>) {
        let amount = amount.clamp(0.0, 1.0);
        self.edit_hsl(range, |hsl| {
            let mut h = hsl.h + amount;
            if h >= 1.0 {
                h -= 1.0;
            }
            Hsl { h, ..hsl }
        });
    }

    /// Inverts the RGB channels in `range`. Alpha is kept.
    pub fn invert(&mut self, range: impl RangeBounds<usize>) {
        for i in self.index_range(range) {
            let c = self.colour(i);
            self.set_colour(
                i,
                Colour {
                    r: 255 - c.r,
                    g: 255 - c.g,
                    b: 255 - c.b,
                    ..c
                },
            );
        }
    }

    fn edit_hsl(&mut self, range: impl RangeBounds<usize>, f: impl Fn(Hsl) -> Hsl) {
        let white = self.config.white_point;
        for i in self.index_range(range) {
            let entry = &mut self.entries[i];
            *entry = Entry::from_hsl(f(entry.hsl), entry.rgb, &white);
        }
    }

    /// Resolves a caller range to valid indices. A start past the end falls
    /// back to 0 and an end past the end is clamped to the last index.
    fn index_range(&self, range: impl RangeBounds<usize>) -> RangeInclusive<usize> {
        let last = self.len() - 1;
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e,
            Bound::Excluded(&0) => return RangeInclusive::new(1, 0),
            Bound::Excluded(&e) => e - 1,
            Bound::Unbounded => last,
        };
        let start = if start > last { 0 } else { start };
        RangeInclusive::new(start, end.min(last))
    }

    // -- I/O --

    /// Decodes `data` and writes the colours into the first entries. Entries
    /// beyond the decoded count are left as they were. On error the palette
    /// is unchanged.
    pub fn load_mem(&mut self, data: &[u8], format: PaletteFormat) -> Result<(), PaletteError> {
        let colours = format.decode(data)?;
        tracing::debug!(%format, count = colours.len(), "loaded palette data");
        for (i, colour) in colours.into_iter().take(self.len()).enumerate() {
            self.set_colour(i, colour);
        }
        Ok(())
    }

    /// Encodes the palette. `name` is used by formats that store one (GIMP).
    pub fn save_mem(&self, format: PaletteFormat, name: &str) -> Result<Vec<u8>, PaletteError> {
        let colours: Vec<Colour> = self.colours().collect();
        let data = format.encode(&colours, name)?;
        tracing::debug!(%format, bytes = data.len(), "encoded palette");
        Ok(data)
    }

    /// Reads and decodes the palette file at `path`. See [`Palette::load_mem`].
    pub fn load_file(&mut self, path: &Path, format: PaletteFormat) -> Result<(), PaletteError> {
        let data = std::fs::read(path)
            .map_err(|e| PaletteError::Io(format!("{}: {e}", path.display())))?;
        self.load_mem(&data, format)
    }

    /// Writes the palette to `path`, naming it after the file stem.
    pub fn save_file(&self, path: &Path, format: PaletteFormat) -> Result<(), PaletteError> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let data = self.save_mem(format, &name)?;
        std::fs::write(path, data)
            .map_err(|e| PaletteError::Io(format!("{}: {e}", path.display())))
    }
}

/// Weighted squared HSL distance with the hue difference taken the short
/// way around the wheel.
fn hsl_distance(a: Hsl, b: Hsl, w: &HslWeights) -> f64 {
    let mut dh = (a.h - b.h).abs();
    if dh > 0.5 {
        dh = 1.0 - dh;
    }
    let ds = a.s - b.s;
    let dl = a.l - b.l;
    dh * dh * w.h + ds * ds * w.s + dl * dl * w.l
}
