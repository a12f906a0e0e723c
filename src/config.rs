//! Configuration management.
//!
//! Parses command-line flags (with environment fallbacks) into a validated
//! `CaptchaSpec` and batch options.

mod cli;
mod error;
mod settings;

pub use cli::Args;
pub use error::{CaptchaError, Result};
pub use settings::{
    CaptchaSpec, DEFAULT_JITTER, DEFAULT_MIN_FONT_SIZE, InclusiveRange, NoiseSpec, Size,
};
