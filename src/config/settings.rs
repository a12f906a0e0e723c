//! Configuration settings.
//!
//! Defines the `CaptchaSpec` describing one captcha family, its noise
//! parameters, and the strict parsers for `W,H` and `MIN,MAX` arguments.

use crate::config::error::{CaptchaError, Result};
use rand::Rng;
use rand::distr::uniform::SampleUniform;
use std::fmt;
use std::str::FromStr;

/// Smallest font size the fit search falls back to.
pub const DEFAULT_MIN_FONT_SIZE: u32 = 10;

/// Vertical offset window used when jitter is enabled.
pub const DEFAULT_JITTER: InclusiveRange<i32> = InclusiveRange { min: -20, max: 10 };

/// Splits `"a,b"` (optionally wrapped in parentheses) into two parsed values.
fn parse_pair<T: FromStr>(input: &str, what: &str) -> Result<(T, T)> {
    let trimmed = input.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(trimmed);

    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let &[first, second] = parts.as_slice() else {
        return Err(CaptchaError::config(format!(
            "{what}: expected two integers separated by a comma, got '{input}'"
        )));
    };

    let parse = |s: &str| {
        s.parse::<T>().map_err(|_| {
            CaptchaError::config(format!("{what}: '{s}' is not a valid integer in '{input}'"))
        })
    };
    Ok((parse(first)?, parse(second)?))
}

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl FromStr for Size {
    type Err = CaptchaError;

    fn from_str(s: &str) -> Result<Self> {
        let (width, height) = parse_pair::<u32>(s, "size")?;
        if width == 0 || height == 0 {
            return Err(CaptchaError::config(format!(
                "size: width and height must be positive, got '{s}'"
            )));
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Closed interval `[min, max]` sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InclusiveRange<T> {
    min: T,
    max: T,
}

impl<T: Copy + PartialOrd + fmt::Display> InclusiveRange<T> {
    /// Creates a range, rejecting `min > max`.
    ///
    /// # Errors
    ///
    /// Returns `CaptchaError::Config` if the bounds are reversed.
    pub fn new(min: T, max: T) -> Result<Self> {
        if min > max {
            return Err(CaptchaError::config(format!(
                "range: minimum {min} is greater than maximum {max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Range containing a single value.
    #[must_use]
    pub const fn exactly(value: T) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    #[must_use]
    pub const fn min(&self) -> T {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> T {
        self.max
    }

    #[must_use]
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }
}

impl<T: Copy + PartialOrd + SampleUniform> InclusiveRange<T> {
    pub fn sample(&self, rng: &mut impl Rng) -> T {
        rng.random_range(self.min..=self.max)
    }
}

impl<T> FromStr for InclusiveRange<T>
where
    T: FromStr + Copy + PartialOrd + fmt::Display,
{
    type Err = CaptchaError;

    fn from_str(s: &str) -> Result<Self> {
        let (min, max) = parse_pair::<T>(s, "range")?;
        Self::new(min, max)
    }
}

impl<T: fmt::Display> fmt::Display for InclusiveRange<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.min, self.max)
    }
}

/// Line and dot noise parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseSpec {
    /// Number of lines drawn per captcha.
    pub line_count: InclusiveRange<u32>,
    /// Stroke width of each line.
    pub line_width: InclusiveRange<u32>,
    /// Number of dots drawn per captcha.
    pub dot_count: InclusiveRange<u32>,
    /// Diameter of each dot.
    pub dot_width: u32,
}

impl Default for NoiseSpec {
    fn default() -> Self {
        Self {
            line_count: InclusiveRange::exactly(0),
            line_width: InclusiveRange::exactly(0),
            dot_count: InclusiveRange::exactly(0),
            dot_width: 0,
        }
    }
}

/// Everything needed to generate captchas of one family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptchaSpec {
    /// Characters eligible for the text. Repeated characters weigh more.
    pub alphabet: Vec<char>,
    /// Number of characters per captcha.
    pub length: usize,
    /// Final image size.
    pub size: Size,
    /// Per-glyph rotation in degrees.
    pub rotation: InclusiveRange<i32>,
    /// Whether glyphs get a random vertical offset.
    pub vertical_jitter: bool,
    /// Vertical offset window used when `vertical_jitter` is set.
    pub jitter: InclusiveRange<i32>,
    /// Lower bound of the font fit search.
    pub min_font_size: u32,
    pub noise: NoiseSpec,
}

impl CaptchaSpec {
    /// Creates a spec with no rotation, no jitter and no noise.
    #[must_use]
    pub fn new(alphabet: &str, length: usize, size: Size) -> Self {
        Self {
            alphabet: alphabet.chars().collect(),
            length,
            size,
            rotation: InclusiveRange::exactly(0),
            vertical_jitter: false,
            jitter: DEFAULT_JITTER,
            min_font_size: DEFAULT_MIN_FONT_SIZE,
            noise: NoiseSpec::default(),
        }
    }

    /// Checks the cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns `CaptchaError::Config` for an empty alphabet, a zero length,
    /// a zero dimension, a length larger than the width, or a zero minimum
    /// font size.
    pub fn validate(&self) -> Result<()> {
        if self.alphabet.is_empty() {
            return Err(CaptchaError::config("alphabet must not be empty"));
        }
        if self.length == 0 {
            return Err(CaptchaError::config("length must be at least 1"));
        }
        if self.size.width == 0 || self.size.height == 0 {
            return Err(CaptchaError::config(format!(
                "size must be positive, got {}",
                self.size
            )));
        }
        if u32::try_from(self.length).map_or(true, |len| len > self.size.width) {
            return Err(CaptchaError::config(format!(
                "length {} exceeds canvas width {}",
                self.length, self.size.width
            )));
        }
        if self.min_font_size == 0 {
            return Err(CaptchaError::config("minimum font size must be positive"));
        }
        Ok(())
    }

    /// Width of the slot reserved for each character.
    ///
    /// Zero when the spec is invalid.
    #[must_use]
    pub fn cell_width(&self) -> u32 {
        u32::try_from(self.length)
            .ok()
            .filter(|&len| len > 0)
            .map_or(0, |len| self.size.width / len)
    }
}
