//! CAPTCHA generation pipeline.
//!
//! Sample text, fit one font size for the whole string, render and rotate each
//! character, composite, then add line and dot noise.

use crate::captcha::compositor::{CharPosition, composite_glyphs};
use crate::captcha::fitter::{FontFit, fit_font_size};
use crate::captcha::glyph::{GlyphRenderer, RenderedGlyph};
use crate::captcha::noise::{NoiseReport, add_noise_dots, add_noise_lines};
use crate::captcha::random_color;
use crate::captcha::text::sample_text;
use crate::config::{CaptchaSpec, Result};
use crate::font::{FontProvider, load_font};
use ab_glyph::FontArc;
use image::RgbImage;
use rand::Rng;
use tracing::{debug, warn};

/// A generated captcha and how it was drawn.
#[derive(Debug, Clone)]
pub struct Captcha {
    /// The label.
    pub text: String,
    pub image: RgbImage,
    /// Font size shared by every glyph.
    pub font_size: u32,
    /// One entry per character, left to right.
    pub positions: Vec<CharPosition>,
    pub noise: NoiseReport,
}

/// Generates captchas for a validated spec with a parsed font.
///
/// Holds no mutable state; the random source is supplied per call, so one
/// generator can be shared by several threads.
pub struct CaptchaGenerator {
    spec: CaptchaSpec,
    font: FontArc,
}

impl CaptchaGenerator {
    /// Creates a generator.
    ///
    /// # Errors
    ///
    /// Returns `CaptchaError::Config` if the spec is invalid.
    pub fn new(spec: CaptchaSpec, font: FontArc) -> Result<Self> {
        spec.validate()?;
        Ok(Self { spec, font })
    }

    /// Creates a generator, loading the font from `provider`.
    ///
    /// # Errors
    ///
    /// Returns `CaptchaError::Config` if the spec is invalid, or
    /// `CaptchaError::Font` if the font cannot be loaded.
    pub fn from_provider(spec: CaptchaSpec, provider: &dyn FontProvider) -> Result<Self> {
        spec.validate()?;
        let font = load_font(provider)?;
        Ok(Self { spec, font })
    }

    #[must_use]
    pub const fn spec(&self) -> &CaptchaSpec {
        &self.spec
    }

    /// Fits a single font size to the whole `text`.
    #[must_use]
    pub fn fit_text(&self, text: &str) -> FontFit {
        let fit = fit_font_size(&self.font, text, self.spec.size, self.spec.min_font_size);
        if !fit.converged {
            warn!(
                text = %text,
                size = %self.spec.size,
                font_size = fit.size,
                "Text does not fit, using minimum font size"
            );
        }
        fit
    }

    /// Generates one captcha.
    ///
    /// # Errors
    ///
    /// Returns `CaptchaError::Config` if text cannot be sampled from the spec.
    pub fn generate(&self, rng: &mut impl Rng) -> Result<Captcha> {
        let spec = &self.spec;
        let mut image = RgbImage::from_pixel(spec.size.width, spec.size.height, random_color(rng));

        let text = sample_text(&spec.alphabet, spec.length, rng)?;
        let fit = self.fit_text(&text);
        debug!(text = %text, font_size = fit.size, "Font fitted");

        let cell_width = spec.cell_width();
        let renderer = GlyphRenderer::new(
            &self.font,
            fit.size,
            cell_width,
            spec.size.height,
            spec.rotation,
        );
        let glyphs: Vec<RenderedGlyph> = text.chars().map(|ch| renderer.render(ch, rng)).collect();

        let jitter = spec.vertical_jitter.then_some(spec.jitter);
        let positions = composite_glyphs(&mut image, &glyphs, cell_width, jitter, rng);

        let lines = add_noise_lines(
            &mut image,
            spec.noise.line_count,
            spec.noise.line_width,
            rng,
        );
        let dot_count = spec.noise.dot_count.sample(rng);
        let dots = add_noise_dots(&mut image, dot_count, spec.noise.dot_width, rng);

        Ok(Captcha {
            text,
            image,
            font_size: fit.size,
            positions,
            noise: NoiseReport { lines, dots },
        })
    }
}
