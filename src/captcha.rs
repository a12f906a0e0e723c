//! CAPTCHA synthesis.
//!
//! Text sampling, font fitting, per-glyph rendering, compositing and noise,
//! tied together by `CaptchaGenerator`.

pub mod compositor;
pub mod fitter;
pub mod generator;
pub mod glyph;
pub mod noise;
pub mod text;

pub use compositor::CharPosition;
pub use fitter::FontFit;
pub use generator::{Captcha, CaptchaGenerator};
pub use noise::NoiseReport;

use image::Rgb;
use rand::Rng;

/// Uniformly random opaque RGB color.
pub fn random_color(rng: &mut impl Rng) -> Rgb<u8> {
    Rgb([rng.random(), rng.random(), rng.random()])
}
