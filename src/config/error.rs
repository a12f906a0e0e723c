//! Error types and result aliases.
//!
//! Defines the core `CaptchaError` enumeration and common `Result` type.

use thiserror::Error;

/// Captcha generation errors.
#[derive(Debug, Error)]
pub enum CaptchaError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Font bytes missing or not a usable outline font.
    #[error("font error: {0}")]
    Font(String),

    /// Filesystem error while writing the dataset.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Label file error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Batch stopped by an external cancellation request.
    #[error("batch cancelled after {completed} captchas")]
    Cancelled { completed: usize },
}

impl CaptchaError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias for `CaptchaError`.
pub type Result<T> = std::result::Result<T, CaptchaError>;
