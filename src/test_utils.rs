//! Test utilities and shared configuration.
//!
//! This module provides common helpers for unit and integration tests,
//! reducing duplication across the codebase.

use crate::captcha::CaptchaGenerator;
use crate::config::{CaptchaSpec, Size};
use crate::font::{EmbeddedFont, load_font};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Creates a standard spec for testing purposes.
///
/// This spec has:
/// - Alphabet `ABC`, four characters
/// - A 120x40 canvas
/// - No rotation, jitter or noise
#[must_use]
pub fn create_test_spec() -> CaptchaSpec {
    CaptchaSpec::new("ABC", 4, Size::new(120, 40))
}

/// Builds a generator for `spec` using the embedded font.
///
/// # Panics
///
/// Panics if the spec is invalid or the embedded font fails to load.
#[must_use]
pub fn create_test_generator(spec: CaptchaSpec) -> CaptchaGenerator {
    let font = load_font(&EmbeddedFont).expect("embedded font must load");
    CaptchaGenerator::new(spec, font).expect("test spec must be valid")
}

/// Deterministic random source.
#[must_use]
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
