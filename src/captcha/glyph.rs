//! Per-character rendering.
//!
//! Every character is drawn alone into a transparent cell, then rotated with
//! the bitmap grown so no corner is clipped.

use crate::captcha::fitter::font_scale;
use crate::captcha::random_color;
use crate::config::InclusiveRange;
use ab_glyph::{Font, PxScale};
use image::{Rgba, RgbaImage, imageops};
use imageproc::drawing::draw_text_mut;
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use rand::Rng;

/// Background of glyph cells and of the margin added by rotation.
pub const TRANSPARENT: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// A single rotated character ready for compositing.
#[derive(Debug, Clone)]
pub struct RenderedGlyph {
    pub ch: char,
    /// Applied rotation in degrees, counter-clockwise.
    pub rotation: i32,
    pub bitmap: RgbaImage,
}

/// Renders characters of one captcha with a shared font size.
pub struct GlyphRenderer<'a, F> {
    font: &'a F,
    scale: PxScale,
    cell_width: u32,
    cell_height: u32,
    rotation: InclusiveRange<i32>,
}

impl<'a, F: Font> GlyphRenderer<'a, F> {
    #[must_use]
    pub fn new(
        font: &'a F,
        font_size: u32,
        cell_width: u32,
        cell_height: u32,
        rotation: InclusiveRange<i32>,
    ) -> Self {
        Self {
            font,
            scale: font_scale(font, font_size),
            cell_width,
            cell_height,
            rotation,
        }
    }

    /// Draws `ch` at the cell origin in a random color and rotates it by a
    /// random angle from the configured range.
    pub fn render(&self, ch: char, rng: &mut impl Rng) -> RenderedGlyph {
        let mut cell = RgbaImage::from_pixel(self.cell_width, self.cell_height, TRANSPARENT);

        let [r, g, b] = random_color(rng).0;
        draw_text_mut(
            &mut cell,
            Rgba([r, g, b, 255]),
            0,
            0,
            self.scale,
            self.font,
            &ch.to_string(),
        );

        let rotation = self.rotation.sample(rng);
        RenderedGlyph {
            ch,
            rotation,
            bitmap: rotate_expanded(&cell, rotation),
        }
    }
}

#[inline]
fn ceil_px(val: f32) -> u32 {
    // Trim float noise so right angles do not gain a column.
    let rounded = (val - 1e-3).ceil().max(1.0);
    rounded as u32
}

/// Transparent border kept around the cell while rotating.
const ROTATION_MARGIN: u32 = 2;

#[inline]
fn padded_side(out: u32, cell: u32) -> u32 {
    // Even sides put the rotation centre on a pixel corner, so right angles
    // map the grid onto itself.
    let side = out.max(cell) + 2 * ROTATION_MARGIN;
    side + side % 2
}

/// Bounding box `(x, y, width, height)` of all pixels with non-zero alpha.
fn alpha_bounds(img: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in img.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds.map(|(x0, y0, x1, y1)| (x0, y0, x1 - x0 + 1, y1 - y0 + 1))
}

/// Rotates `cell` counter-clockwise by `degrees`, enlarging the output to the
/// rotated bounding box and filling the new margin with `TRANSPARENT`.
///
/// The output is never smaller than the rotated cell and always holds every
/// non-transparent pixel of the rotated content.
#[must_use]
pub fn rotate_expanded(cell: &RgbaImage, degrees: i32) -> RgbaImage {
    if degrees.rem_euclid(360) == 0 {
        return cell.clone();
    }

    let theta = (degrees as f32).to_radians();
    let (sin, cos) = theta.sin_cos();
    let (width, height) = cell.dimensions();
    let (w, h) = (width as f32, height as f32);

    let out_width = ceil_px(w * cos.abs() + h * sin.abs());
    let out_height = ceil_px(w * sin.abs() + h * cos.abs());

    let pad_width = padded_side(out_width, width);
    let pad_height = padded_side(out_height, height);
    let mut padded = RgbaImage::from_pixel(pad_width, pad_height, TRANSPARENT);
    imageops::replace(
        &mut padded,
        cell,
        i64::from((pad_width - width) / 2),
        i64::from((pad_height - height) / 2),
    );

    // imageproc turns clockwise for positive angles.
    let rotated = rotate_about_center(&padded, -theta, Interpolation::Nearest, TRANSPARENT);

    let mut x0 = (pad_width - out_width) / 2;
    let mut y0 = (pad_height - out_height) / 2;
    let mut x1 = x0 + out_width;
    let mut y1 = y0 + out_height;
    if let Some((ix, iy, iw, ih)) = alpha_bounds(&rotated) {
        x0 = x0.min(ix);
        y0 = y0.min(iy);
        x1 = x1.max(ix + iw);
        y1 = y1.max(iy + ih);
    }

    imageops::crop_imm(&rotated, x0, y0, x1 - x0, y1 - y0).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{EmbeddedFont, load_font};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn opaque_pixels(img: &RgbaImage) -> usize {
        img.pixels().filter(|p| p[3] > 0).count()
    }

    #[test]
    fn test_unrotated_glyph_keeps_cell_size() {
        let font = load_font(&EmbeddedFont).unwrap();
        let renderer = GlyphRenderer::new(&font, 30, 30, 40, InclusiveRange::exactly(0));
        let glyph = renderer.render('A', &mut StdRng::seed_from_u64(1));

        assert_eq!(glyph.ch, 'A');
        assert_eq!(glyph.rotation, 0);
        assert_eq!(glyph.bitmap.dimensions(), (30, 40));
        assert!(opaque_pixels(&glyph.bitmap) > 0);
        assert_eq!(glyph.bitmap.get_pixel(29, 39)[3], 0);
    }

    #[test]
    fn test_rotation_stays_in_range() {
        let font = load_font(&EmbeddedFont).unwrap();
        let range = InclusiveRange::new(-30, 45).unwrap();
        let renderer = GlyphRenderer::new(&font, 24, 20, 30, range);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let glyph = renderer.render('K', &mut rng);
            assert!(range.contains(glyph.rotation));
        }
    }

    #[test]
    fn test_degenerate_range_rotates_exactly() {
        let font = load_font(&EmbeddedFont).unwrap();
        let renderer = GlyphRenderer::new(&font, 24, 20, 30, InclusiveRange::exactly(15));
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..10 {
            assert_eq!(renderer.render('Q', &mut rng).rotation, 15);
        }
    }

    fn alpha_mass(img: &RgbaImage) -> u64 {
        img.pixels().map(|p| u64::from(p[3])).sum()
    }

    #[test]
    fn test_rotation_expands_bitmap() {
        let cell = RgbaImage::from_pixel(20, 40, Rgba([10, 20, 30, 255]));

        let quarter = rotate_expanded(&cell, 90);
        let (w, h) = quarter.dimensions();
        assert!((40..=41).contains(&w) && (20..=21).contains(&h));
        assert_eq!(opaque_pixels(&quarter), 800);

        let tilted = rotate_expanded(&cell, 45);
        let (w, h) = tilted.dimensions();
        assert!(w > 40 && h > 40);
        assert_eq!(tilted.get_pixel(0, 0)[3], 0);
        let (cx, cy) = (w / 2, h / 2);
        assert_eq!(tilted.get_pixel(cx, cy)[3], 255);
    }

    #[test]
    fn test_right_angles_keep_every_pixel() {
        let cell = RgbaImage::from_pixel(21, 40, Rgba([200, 0, 0, 255]));
        let expected = alpha_mass(&cell);
        for degrees in [90, 180, 270, -90] {
            let rotated = rotate_expanded(&cell, degrees);
            assert_eq!(alpha_mass(&rotated), expected, "degrees={degrees}");
            let (w, h) = rotated.dimensions();
            if degrees % 180 == 0 {
                assert!(w >= 21 && h >= 40);
            } else {
                assert!(w >= 40 && h >= 21);
            }
        }
    }

    #[test]
    fn test_ink_on_cell_edges_survives_rotation() {
        let mut cell = RgbaImage::from_pixel(21, 40, TRANSPARENT);
        for x in 0..21 {
            cell.put_pixel(x, 0, Rgba([0, 0, 0, 255]));
        }
        for y in 0..40 {
            cell.put_pixel(0, y, Rgba([0, 0, 0, 255]));
        }
        let expected = opaque_pixels(&cell);
        for degrees in [90, 180, 270] {
            assert_eq!(opaque_pixels(&rotate_expanded(&cell, degrees)), expected);
        }
    }

    #[test]
    fn test_rendered_glyph_ink_is_conserved() {
        let font = load_font(&EmbeddedFont).unwrap();
        let upright = GlyphRenderer::new(&font, 30, 21, 40, InclusiveRange::exactly(0));
        let base = alpha_mass(&upright.render('W', &mut StdRng::seed_from_u64(9)).bitmap);
        assert!(base > 0);

        for degrees in [90, 180] {
            let renderer = GlyphRenderer::new(&font, 30, 21, 40, InclusiveRange::exactly(degrees));
            let glyph = renderer.render('W', &mut StdRng::seed_from_u64(9));
            assert_eq!(alpha_mass(&glyph.bitmap), base, "degrees={degrees}");
        }
    }

    #[test]
    fn test_rotation_does_not_blend_with_margin() {
        let ink = Rgba([30, 60, 90, 255]);
        let cell = RgbaImage::from_pixel(13, 17, ink);
        for degrees in [7, 33, 45, -60] {
            let rotated = rotate_expanded(&cell, degrees);
            assert!(rotated.pixels().all(|p| *p == ink || *p == TRANSPARENT));
        }
    }

    #[test]
    fn test_full_turn_is_identity() {
        let cell = RgbaImage::from_pixel(7, 9, Rgba([1, 2, 3, 255]));
        assert_eq!(rotate_expanded(&cell, 360), cell);
        assert_eq!(rotate_expanded(&cell, -720), cell);
    }
}
