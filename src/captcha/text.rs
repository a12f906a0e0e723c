//! Captcha text sampling.

use crate::config::{CaptchaError, Result};
use rand::Rng;

/// Draws `length` characters uniformly, with replacement, from `alphabet`.
///
/// # Errors
///
/// Returns `CaptchaError::Config` if the alphabet is empty or `length` is zero.
pub fn sample_text(alphabet: &[char], length: usize, rng: &mut impl Rng) -> Result<String> {
    if alphabet.is_empty() {
        return Err(CaptchaError::config("alphabet must not be empty"));
    }
    if length == 0 {
        return Err(CaptchaError::config("length must be at least 1"));
    }

    Ok((0..length)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())])
        .collect())
}
