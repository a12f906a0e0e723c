//! Font size fitting.
//!
//! Picks the largest font size at which a whole string fits strictly inside a
//! box. The predicate is monotonic in the font size, so the search bisects
//! `[min_size, 2 * height]` instead of walking it down one size at a time.

use crate::config::Size;
use ab_glyph::{Font, GlyphId, PxScale, Rect, ScaleFont, point};

/// Ink extent of a laid out string, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBounds {
    pub width: f32,
    pub height: f32,
}

/// Result of the fit search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontFit {
    /// Chosen font size (em size in pixels).
    pub size: u32,
    /// `false` when nothing above the minimum fits and the minimum is used anyway.
    pub converged: bool,
}

/// Scale whose em square is `size` pixels tall.
pub fn font_scale(font: &impl Font, size: u32) -> PxScale {
    let size = size as f32;
    match font.units_per_em() {
        Some(units_per_em) if units_per_em > 0.0 => {
            PxScale::from(size * font.height_unscaled() / units_per_em)
        }
        _ => PxScale::from(size),
    }
}

/// Lays `text` out on a single line and returns the union of its glyph outlines.
///
/// Outline bounds are used unrounded so the extent is linear in `size`.
pub fn measure_text(font: &impl Font, size: u32, text: &str) -> TextBounds {
    let scale = font_scale(font, size);
    let scaled = font.as_scaled(scale);
    let (h_factor, v_factor) = (scaled.h_scale_factor(), scaled.v_scale_factor());

    let mut caret = 0.0_f32;
    let mut previous: Option<GlyphId> = None;
    let mut ink: Option<Rect> = None;

    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        let origin = caret;
        caret += scaled.h_advance(id);
        previous = Some(id);

        let Some(outline) = font.outline(id).filter(|o| !o.curves.is_empty()) else {
            continue;
        };
        let bounds = Rect {
            min: point(
                origin + outline.bounds.min.x * h_factor,
                scaled.ascent() - outline.bounds.max.y * v_factor,
            ),
            max: point(
                origin + outline.bounds.max.x * h_factor,
                scaled.ascent() - outline.bounds.min.y * v_factor,
            ),
        };
        ink = Some(match ink {
            None => bounds,
            Some(acc) => Rect {
                min: point(acc.min.x.min(bounds.min.x), acc.min.y.min(bounds.min.y)),
                max: point(acc.max.x.max(bounds.max.x), acc.max.y.max(bounds.max.y)),
            },
        });
    }

    ink.map_or(
        TextBounds {
            width: 0.0,
            height: 0.0,
        },
        |r| TextBounds {
            width: r.width(),
            height: r.height(),
        },
    )
}

/// Whether `text` at `size` fits strictly inside `bounds`.
pub fn fits(font: &impl Font, size: u32, text: &str, bounds: Size) -> bool {
    let measured = measure_text(font, size, text);
    measured.width < bounds.width as f32 && measured.height < bounds.height as f32
}

/// Largest size in `(min_size, 2 * bounds.height]` that fits, else `min_size`.
pub fn fit_font_size(font: &impl Font, text: &str, bounds: Size, min_size: u32) -> FontFit {
    let mut lo = min_size.saturating_add(1);
    let mut hi = bounds.height.saturating_mul(2);
    let mut best = None;

    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        if fits(font, mid, text, bounds) {
            best = Some(mid);
            lo = mid + 1;
        } else {
            hi = mid - 1;
        }
    }

    best.map_or(
        FontFit {
            size: min_size,
            converged: false,
        },
        |size| FontFit {
            size,
            converged: true,
        },
    )
}
