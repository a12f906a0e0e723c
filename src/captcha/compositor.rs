//! Glyph layout and alpha compositing onto the canvas.

use crate::captcha::glyph::RenderedGlyph;
use crate::config::InclusiveRange;
use image::{Rgb, RgbImage, RgbaImage};
use rand::Rng;

/// Where a character landed on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharPosition {
    pub ch: char,
    /// Left edge of the rotated bitmap.
    pub x: i64,
    /// Top edge of the rotated bitmap.
    pub y: i64,
    /// Rotation in degrees.
    pub rotation: i32,
}

#[inline]
fn blend(fg: u8, bg: u8, alpha: u8) -> u8 {
    let (fg, bg, alpha) = (u32::from(fg), u32::from(bg), u32::from(alpha));
    let mixed = (fg * alpha + bg * (255 - alpha) + 127) / 255;
    u8::try_from(mixed).unwrap_or(u8::MAX)
}

/// Blends `overlay` onto `canvas` with its top-left corner at `(x, y)`.
///
/// Pixels falling outside the canvas are dropped.
pub fn alpha_composite(canvas: &mut RgbImage, overlay: &RgbaImage, x: i64, y: i64) {
    let (width, height) = canvas.dimensions();
    let (width, height) = (i64::from(width), i64::from(height));

    for (ox, oy, pixel) in overlay.enumerate_pixels() {
        let alpha = pixel[3];
        if alpha == 0 {
            continue;
        }
        let cx = x + i64::from(ox);
        let cy = y + i64::from(oy);
        if (0..width).contains(&cx)
            && (0..height).contains(&cy)
            && let (Ok(cx), Ok(cy)) = (u32::try_from(cx), u32::try_from(cy))
        {
            let base = canvas.get_pixel(cx, cy);
            let mixed = Rgb([
                blend(pixel[0], base[0], alpha),
                blend(pixel[1], base[1], alpha),
                blend(pixel[2], base[2], alpha),
            ]);
            canvas.put_pixel(cx, cy, mixed);
        }
    }
}

/// Places glyphs left to right, one per `cell_width` slot.
///
/// With `jitter` set, each glyph's top edge is drawn independently from that
/// range; otherwise glyphs sit at `y = 0`.
pub fn composite_glyphs(
    canvas: &mut RgbImage,
    glyphs: &[RenderedGlyph],
    cell_width: u32,
    jitter: Option<InclusiveRange<i32>>,
    rng: &mut impl Rng,
) -> Vec<CharPosition> {
    let mut positions = Vec::with_capacity(glyphs.len());
    let mut x = 0_i64;

    for glyph in glyphs {
        let y = jitter.map_or(0, |range| i64::from(range.sample(rng)));
        alpha_composite(canvas, &glyph.bitmap, x, y);
        positions.push(CharPosition {
            ch: glyph.ch,
            x,
            y,
            rotation: glyph.rotation,
        });
        x += i64::from(cell_width);
    }

    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_JITTER;
    use image::Rgba;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn glyph(ch: char, color: Rgba<u8>) -> RenderedGlyph {
        RenderedGlyph {
            ch,
            rotation: 0,
            bitmap: RgbaImage::from_pixel(4, 4, color),
        }
    }

    #[test]
    fn test_transparent_pixels_leave_background() {
        let mut canvas = RgbImage::from_pixel(10, 10, Rgb([9, 9, 9]));
        let overlay = RgbaImage::from_pixel(5, 5, Rgba([255, 0, 0, 0]));
        alpha_composite(&mut canvas, &overlay, 2, 2);
        assert!(canvas.pixels().all(|p| *p == Rgb([9, 9, 9])));
    }

    #[test]
    fn test_opaque_and_partial_blending() {
        let mut canvas = RgbImage::from_pixel(4, 1, Rgb([0, 0, 0]));
        let mut overlay = RgbaImage::new(2, 1);
        overlay.put_pixel(0, 0, Rgba([200, 100, 50, 255]));
        overlay.put_pixel(1, 0, Rgba([255, 255, 255, 128]));
        alpha_composite(&mut canvas, &overlay, 0, 0);

        assert_eq!(*canvas.get_pixel(0, 0), Rgb([200, 100, 50]));
        assert_eq!(*canvas.get_pixel(1, 0), Rgb([128, 128, 128]));
        assert_eq!(*canvas.get_pixel(2, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_out_of_bounds_is_clipped() {
        let mut canvas = RgbImage::from_pixel(3, 3, Rgb([0, 0, 0]));
        let overlay = RgbaImage::from_pixel(3, 3, Rgba([50, 50, 50, 255]));
        alpha_composite(&mut canvas, &overlay, -2, 2);

        assert_eq!(*canvas.get_pixel(0, 2), Rgb([50, 50, 50]));
        assert_eq!(*canvas.get_pixel(1, 2), Rgb([0, 0, 0]));
        assert_eq!(*canvas.get_pixel(0, 1), Rgb([0, 0, 0]));

        alpha_composite(&mut canvas, &overlay, 10, 10);
        assert_eq!(canvas.dimensions(), (3, 3));
    }

    #[test]
    fn test_glyphs_are_laid_out_per_cell() {
        let mut canvas = RgbImage::from_pixel(12, 4, Rgb([0, 0, 0]));
        let glyphs = [
            glyph('A', Rgba([255, 0, 0, 255])),
            glyph('B', Rgba([0, 255, 0, 255])),
            glyph('C', Rgba([0, 0, 255, 255])),
        ];
        let mut rng = StdRng::seed_from_u64(0);
        let positions = composite_glyphs(&mut canvas, &glyphs, 4, None, &mut rng);

        let xs: Vec<i64> = positions.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0, 4, 8]);
        assert!(positions.iter().all(|p| p.y == 0));
        assert_eq!(*canvas.get_pixel(1, 1), Rgb([255, 0, 0]));
        assert_eq!(*canvas.get_pixel(5, 1), Rgb([0, 255, 0]));
        assert_eq!(*canvas.get_pixel(9, 1), Rgb([0, 0, 255]));
    }

    #[test]
    fn test_jitter_stays_in_window() {
        let mut canvas = RgbImage::new(40, 20);
        let glyphs: Vec<_> = (0..10).map(|_| glyph('Z', Rgba([1, 1, 1, 255]))).collect();
        let mut rng = StdRng::seed_from_u64(11);
        let positions = composite_glyphs(&mut canvas, &glyphs, 4, Some(DEFAULT_JITTER), &mut rng);

        assert!(
            positions
                .iter()
                .all(|p| DEFAULT_JITTER.contains(i32::try_from(p.y).unwrap()))
        );
    }
}
