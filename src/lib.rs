//! Library definitions.
//!
//! Exports the captcha synthesis pipeline, font sources, configuration and
//! the dataset writer.

pub mod captcha;
pub mod config;
pub mod dataset;
pub mod font;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;
pub use captcha::{Captcha, CaptchaGenerator, CharPosition, NoiseReport};
pub use config::{Args, CaptchaError, CaptchaSpec, InclusiveRange, NoiseSpec, Result, Size};
pub use dataset::{
    BatchOptions, BatchSummary, CancelToken, DatasetWriter, LABELS_FILE, generate_batch,
};
pub use font::{EmbeddedFont, FileFont, FontProvider, load_font};
