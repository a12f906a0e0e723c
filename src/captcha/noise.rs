//! Line and dot noise drawn over the finished canvas.

use crate::captcha::random_color;
use crate::config::InclusiveRange;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use rand::Rng;

/// How much noise ended up on a canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoiseReport {
    pub lines: u32,
    pub dots: u32,
}

fn random_point(rng: &mut impl Rng, width: u32, height: u32) -> (i32, i32) {
    let x = rng.random_range(0..width);
    let y = rng.random_range(0..height);
    (
        i32::try_from(x).unwrap_or(i32::MAX),
        i32::try_from(y).unwrap_or(i32::MAX),
    )
}

/// Pixel offsets of a round brush exactly `width` pixels across.
///
/// Even widths are centred half a pixel up and left of the anchor pixel.
fn brush(width: u32) -> Vec<(i32, i32)> {
    let width = i32::try_from(width).unwrap_or(i32::MAX);
    let lo = -(width / 2);
    let hi = (width - 1) / 2;
    let centre = f64::from(lo + hi) / 2.0;
    let radius = f64::from(width) / 2.0;

    let mut offsets = Vec::new();
    for dy in lo..=hi {
        for dx in lo..=hi {
            let (fx, fy) = (f64::from(dx) - centre, f64::from(dy) - centre);
            if fx * fx + fy * fy <= radius * radius {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

fn stamp(canvas: &mut RgbImage, brush: &[(i32, i32)], at: (i32, i32), color: Rgb<u8>) {
    let (width, height) = canvas.dimensions();
    for &(dx, dy) in brush {
        if let (Ok(x), Ok(y)) = (u32::try_from(at.0 + dx), u32::try_from(at.1 + dy))
            && x < width
            && y < height
        {
            canvas.put_pixel(x, y, color);
        }
    }
}

/// Draws a segment `width` pixels thick with round caps.
///
/// Widths of 0 and 1 give a hairline; a zero-length segment is a single
/// pixel or a disc `width` pixels across.
pub fn draw_stroke(
    canvas: &mut RgbImage,
    start: (i32, i32),
    end: (i32, i32),
    width: u32,
    color: Rgb<u8>,
) {
    if width <= 1 {
        if start == end {
            stamp(canvas, &[(0, 0)], start, color);
        } else {
            draw_line_segment_mut(
                canvas,
                (start.0 as f32, start.1 as f32),
                (end.0 as f32, end.1 as f32),
                color,
            );
        }
        return;
    }

    let brush = brush(width);
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let steps = dx.abs().max(dy.abs());
    if steps == 0 {
        stamp(canvas, &brush, start, color);
        return;
    }
    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let cx = start.0 + (dx as f32 * t).round() as i32;
        let cy = start.1 + (dy as f32 * t).round() as i32;
        stamp(canvas, &brush, (cx, cy), color);
    }
}

/// Draws a random number of random lines. Returns how many were drawn.
pub fn add_noise_lines(
    canvas: &mut RgbImage,
    count: InclusiveRange<u32>,
    width: InclusiveRange<u32>,
    rng: &mut impl Rng,
) -> u32 {
    let (w, h) = canvas.dimensions();
    if w == 0 || h == 0 {
        return 0;
    }

    let lines = count.sample(rng);
    for _ in 0..lines {
        let start = random_point(rng, w, h);
        let end = random_point(rng, w, h);
        let color = random_color(rng);
        let stroke = width.sample(rng);
        draw_stroke(canvas, start, end, stroke, color);
    }
    lines
}

/// Draws exactly `count` dots of diameter `width`. Returns how many were drawn.
pub fn add_noise_dots(canvas: &mut RgbImage, count: u32, width: u32, rng: &mut impl Rng) -> u32 {
    let (w, h) = canvas.dimensions();
    if w == 0 || h == 0 {
        return 0;
    }

    for _ in 0..count {
        let point = random_point(rng, w, h);
        let color = random_color(rng);
        draw_stroke(canvas, point, point, width, color);
    }
    count
}
