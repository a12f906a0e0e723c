//! Command-line arguments.
//!
//! Every flag can also come from a `CAPTCHA_*` environment variable (or a
//! `.env` file loaded at start-up).

use crate::config::error::{CaptchaError, Result};
use crate::config::settings::{
    CaptchaSpec, DEFAULT_MIN_FONT_SIZE, InclusiveRange, NoiseSpec, Size,
};
use crate::dataset::BatchOptions;
use clap::Parser;
use std::path::PathBuf;

/// Captcha dataset generator.
#[derive(Debug, Parser)]
#[command(author, version, about = "Generates labeled captcha images")]
pub struct Args {
    /// Characters to build captchas from.
    #[arg(long, env = "CAPTCHA_ALPHABET")]
    pub alphabet: String,

    /// Number of characters per captcha.
    #[arg(long = "len", env = "CAPTCHA_LENGTH")]
    pub length: usize,

    /// Number of captchas to generate.
    #[arg(long, env = "CAPTCHA_NUM")]
    pub num: usize,

    /// Image size as `WIDTH,HEIGHT` in pixels.
    #[arg(long, env = "CAPTCHA_SIZE")]
    pub size: Size,

    /// Output directory for images and `labels.csv`.
    #[arg(long, env = "CAPTCHA_OUTPUT")]
    pub output: PathBuf,

    /// Per-character rotation range `MIN,MAX` in degrees.
    #[arg(long, env = "CAPTCHA_ROTATE", default_value = "0,0", allow_hyphen_values = true)]
    pub rotate: InclusiveRange<i32>,

    /// Move characters vertically at random.
    #[arg(long, env = "CAPTCHA_MOVE_VERTICAL")]
    pub move_vertical: bool,

    /// Vertical offset range `MIN,MAX` used with `--move-vertical`.
    #[arg(long, env = "CAPTCHA_JITTER", default_value = "-20,10", allow_hyphen_values = true)]
    pub jitter: InclusiveRange<i32>,

    /// Number of random lines `MIN,MAX`.
    #[arg(long, env = "CAPTCHA_LINES_NUM", default_value = "0,0")]
    pub lines_num: InclusiveRange<u32>,

    /// Width of random lines `MIN,MAX` in pixels.
    #[arg(long, env = "CAPTCHA_LINES_WIDTH", default_value = "0,0")]
    pub lines_width: InclusiveRange<u32>,

    /// Number of random dots `MIN,MAX`.
    #[arg(long, env = "CAPTCHA_DOTS_NUMBER", default_value = "0,0")]
    pub dots_number: InclusiveRange<u32>,

    /// Diameter of random dots in pixels.
    #[arg(long, env = "CAPTCHA_DOTS_WIDTH", default_value_t = 0)]
    pub dots_width: u32,

    /// Zero padding width of image file names.
    #[arg(long, env = "CAPTCHA_PADDING", default_value_t = 0)]
    pub padding: usize,

    /// Smallest font size the fit search may fall back to.
    #[arg(long, env = "CAPTCHA_MIN_FONT_SIZE", default_value_t = DEFAULT_MIN_FONT_SIZE)]
    pub min_font_size: u32,

    /// TrueType/OpenType font file. Defaults to the bundled font.
    #[arg(long, env = "CAPTCHA_FONT")]
    pub font: Option<PathBuf>,

    /// Seed for reproducible datasets.
    #[arg(long, env = "CAPTCHA_SEED")]
    pub seed: Option<u64>,

    /// Number of worker threads.
    #[arg(long, env = "CAPTCHA_WORKERS", default_value_t = 1)]
    pub workers: usize,
}

impl Args {
    /// Builds and validates the captcha spec described by the flags.
    ///
    /// # Errors
    ///
    /// Returns `CaptchaError::Config` if the combination is invalid.
    pub fn captcha_spec(&self) -> Result<CaptchaSpec> {
        let spec = CaptchaSpec {
            alphabet: self.alphabet.chars().collect(),
            length: self.length,
            size: self.size,
            rotation: self.rotate,
            vertical_jitter: self.move_vertical,
            jitter: self.jitter,
            min_font_size: self.min_font_size,
            noise: NoiseSpec {
                line_count: self.lines_num,
                line_width: self.lines_width,
                dot_count: self.dots_number,
                dot_width: self.dots_width,
            },
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Batch settings described by the flags.
    ///
    /// # Errors
    ///
    /// Returns `CaptchaError::Config` if `--workers` is zero.
    pub fn batch_options(&self) -> Result<BatchOptions> {
        if self.workers == 0 {
            return Err(CaptchaError::config("workers must be at least 1"));
        }
        Ok(BatchOptions {
            count: self.num,
            workers: self.workers,
            seed: self.seed,
        })
    }
}
