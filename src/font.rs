//! Font sources.
//!
//! The pipeline treats the font as opaque bytes supplied by a `FontProvider`
//! and parses them once per batch into a shareable `FontArc`.

use crate::config::{CaptchaError, Result};
use ab_glyph::FontArc;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

const EMBEDDED_FONT_BYTES: &[u8] = include_bytes!("../assets/DejaVuSans-Bold.ttf");

/// Supplies raw outline font bytes.
pub trait FontProvider {
    /// Returns the font file contents.
    ///
    /// # Errors
    ///
    /// Returns `CaptchaError::Font` if the bytes cannot be obtained.
    fn font_bytes(&self) -> Result<Cow<'static, [u8]>>;
}

/// The font bundled with the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedFont;

impl FontProvider for EmbeddedFont {
    fn font_bytes(&self) -> Result<Cow<'static, [u8]>> {
        Ok(Cow::Borrowed(EMBEDDED_FONT_BYTES))
    }
}

/// A TrueType/OpenType file on disk.
#[derive(Debug, Clone)]
pub struct FileFont {
    path: PathBuf,
}

impl FileFont {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl FontProvider for FileFont {
    fn font_bytes(&self) -> Result<Cow<'static, [u8]>> {
        std::fs::read(&self.path).map(Cow::Owned).map_err(|e| {
            CaptchaError::Font(format!(
                "failed to read font '{}': {e}",
                self.path.display()
            ))
        })
    }
}

/// Parses the provider's bytes into a font usable for layout and drawing.
///
/// # Errors
///
/// Returns `CaptchaError::Font` if the bytes are unavailable or are not a
/// valid outline font.
pub fn load_font(provider: &dyn FontProvider) -> Result<FontArc> {
    match provider.font_bytes()? {
        Cow::Borrowed(bytes) => FontArc::try_from_slice(bytes),
        Cow::Owned(bytes) => FontArc::try_from_vec(bytes),
    }
    .map_err(|e| CaptchaError::Font(format!("invalid font data: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ab_glyph::Font;

    struct BrokenFont;

    impl FontProvider for BrokenFont {
        fn font_bytes(&self) -> Result<Cow<'static, [u8]>> {
            Ok(Cow::Owned(b"definitely not a font".to_vec()))
        }
    }

    #[test]
    fn test_embedded_font_loads() {
        let font = load_font(&EmbeddedFont).unwrap();
        assert!(font.glyph_id('A').0 != 0);
    }

    #[test]
    fn test_corrupt_bytes_are_font_errors() {
        let err = load_font(&BrokenFont).unwrap_err();
        assert!(matches!(err, CaptchaError::Font(_)));
    }

    #[test]
    fn test_missing_file_is_font_error() {
        let provider = FileFont::new("/nonexistent/captchanova/font.ttf");
        let err = load_font(&provider).unwrap_err();
        assert!(err.to_string().contains("failed to read font"));
    }

    #[test]
    fn test_file_font_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("font.ttf");
        std::fs::write(&path, EMBEDDED_FONT_BYTES).unwrap();

        let font = load_font(&FileFont::new(&path)).unwrap();
        assert!(font.glyph_id('Z').0 != 0);
    }
}
