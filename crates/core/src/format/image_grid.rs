//! Palettes stored as a PNG swatch grid.
//!
//! The image is square, its side a multiple of 16, and split into a 16x16
//! grid of equal cells; index `i` lives in cell `(i % 16, i / 16)`. Cells
//! larger than 3 px are sampled one pixel in from their top-left corner so
//! grid lines or anti-aliased edges are not picked up.

use crate::colour::Colour;
use crate::error::PaletteError;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

const GRID: u32 = 16;
/// Cell size used when rendering.
const SAVE_CELL: u32 = 8;

pub(super) fn decode(data: &[u8]) -> Result<Vec<Colour>, PaletteError> {
    let img = image::load_from_memory(data)
        .map_err(|e| PaletteError::Image(e.to_string()))?
        .to_rgb8();
    let (width, height) = img.dimensions();
    if width != height || width == 0 || width % GRID != 0 {
        return Err(PaletteError::ImageDimensions { width, height });
    }

    let cell = width / GRID;
    let inset = if cell > 3 { 1 } else { 0 };

    let colours = (0..GRID * GRID)
        .map(|i| {
            let x0 = (i % GRID) * cell;
            let y0 = (i / GRID) * cell;
            let sample = *img.get_pixel(x0 + inset, y0 + inset);
            if !cell_is_uniform(&img, x0 + inset, y0 + inset, cell - 2 * inset, sample) {
                tracing::warn!(
                    index = i,
                    x = x0,
                    y = y0,
                    "palette image cell is not a solid colour, using its top-left sample"
                );
            }
            Colour::rgb(sample[0], sample[1], sample[2])
        })
        .collect();
    Ok(colours)
}

/// True if every pixel of the `size`x`size` square at (x, y) equals `sample`.
fn cell_is_uniform(img: &RgbImage, x: u32, y: u32, size: u32, sample: Rgb<u8>) -> bool {
    (y..y + size).all(|py| (x..x + size).all(|px| *img.get_pixel(px, py) == sample))
}

/// Renders a 128x128 grid of 8 px cells and encodes it as PNG.
pub(super) fn encode(colours: &[Colour]) -> Result<Vec<u8>, PaletteError> {
    let side = GRID * SAVE_CELL;
    let img = RgbImage::from_fn(side, side, |x, y| {
        let index = ((y / SAVE_CELL) * GRID + x / SAVE_CELL) as usize;
        colours
            .get(index)
            .map_or(Rgb([0, 0, 0]), |c| Rgb([c.r, c.g, c.b]))
    });
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| PaletteError::Image(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(img: &RgbImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn ramp() -> Vec<Colour> {
        (0..=255u8)
            .map(|i| Colour::rgb(i, i / 2, 255 - i))
            .collect()
    }

    #[test]
    fn encode_renders_128_pixel_square() {
        let bytes = encode(&ramp()).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!(img.width(), 128);
        assert_eq!(img.height(), 128);
    }

    #[test]
    fn round_trip_through_png() {
        let colours = ramp();
        let back = decode(&encode(&colours).unwrap()).unwrap();
        assert_eq!(back, colours);
    }

    #[test]
    fn inset_sampling_skips_grid_lines() {
        // 16 px cells with a 1 px black border on the top/left of each cell.
        let img = RgbImage::from_fn(256, 256, |x, y| {
            if x % 16 == 0 || y % 16 == 0 {
                Rgb([0, 0, 0])
            } else {
                let i = (y / 16 * 16 + x / 16) as u8;
                Rgb([i, 200, 100])
            }
        });
        let colours = decode(&png_bytes(&img)).unwrap();
        assert_eq!(colours[0], Colour::rgb(0, 200, 100));
        assert_eq!(colours[17], Colour::rgb(17, 200, 100));
        assert_eq!(colours[255], Colour::rgb(255, 200, 100));
    }

    #[test]
    fn one_pixel_cells_are_sampled_directly() {
        let img = RgbImage::from_fn(16, 16, |x, y| Rgb([x as u8, y as u8, 7]));
        let colours = decode(&png_bytes(&img)).unwrap();
        assert_eq!(colours[16 * 3 + 5], Colour::rgb(5, 3, 7));
    }

    #[test]
    fn non_uniform_cell_still_loads() {
        let mut img = RgbImage::from_pixel(128, 128, Rgb([10, 20, 30]));
        img.put_pixel(5, 5, Rgb([255, 255, 255]));
        let colours = decode(&png_bytes(&img)).unwrap();
        assert_eq!(colours[0], Colour::rgb(10, 20, 30));
    }

    #[test]
    fn rejects_non_square_image() {
        let img = RgbImage::new(32, 16);
        assert!(matches!(
            decode(&png_bytes(&img)).unwrap_err(),
            PaletteError::ImageDimensions {
                width: 32,
                height: 16
            }
        ));
    }

    #[test]
    fn rejects_side_not_multiple_of_16() {
        let img = RgbImage::new(20, 20);
        assert!(matches!(
            decode(&png_bytes(&img)).unwrap_err(),
            PaletteError::ImageDimensions { .. }
        ));
    }

    #[test]
    fn rejects_undecodable_data() {
        assert!(matches!(
            decode(b"not a png").unwrap_err(),
            PaletteError::Image(_)
        ));
    }

    #[test]
    fn uniform_check_sees_every_pixel() {
        let mut img = RgbImage::from_pixel(8, 8, Rgb([1, 1, 1]));
        assert!(cell_is_uniform(&img, 1, 1, 6, Rgb([1, 1, 1])));
        img.put_pixel(6, 6, Rgb([2, 2, 2]));
        assert!(!cell_is_uniform(&img, 1, 1, 6, Rgb([1, 1, 1])));
        // the border pixel is outside the checked region
        img.put_pixel(7, 7, Rgb([3, 3, 3]));
        img.put_pixel(6, 6, Rgb([1, 1, 1]));
        assert!(cell_is_uniform(&img, 1, 1, 6, Rgb([1, 1, 1])));
    }
}
