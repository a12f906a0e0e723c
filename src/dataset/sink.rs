//! Dataset persistence.
//!
//! Writes each captcha as `<index>.png` and records its label in `labels.csv`.

use crate::captcha::Captcha;
use crate::config::Result;
use csv::Writer;
use image::ImageFormat;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the label file inside the output directory.
pub const LABELS_FILE: &str = "labels.csv";

/// Header row of the label file.
const LABELS_HEADER: [&str; 2] = ["Id", "Label"];

/// Writes images and labels into one output directory.
pub struct DatasetWriter {
    dir: PathBuf,
    padding: usize,
    labels: Writer<File>,
    written: usize,
}

impl DatasetWriter {
    /// Creates the output directory if needed and starts a fresh label file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the label file cannot be created.
    pub fn create(dir: impl AsRef<Path>, padding: usize) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let mut labels = Writer::from_path(dir.join(LABELS_FILE))?;
        labels.write_record(LABELS_HEADER)?;
        labels.flush()?;

        Ok(Self {
            dir,
            padding,
            labels,
            written: 0,
        })
    }

    /// File name for the captcha at `index`, zero padded to the configured width.
    #[must_use]
    pub fn image_name(&self, index: usize) -> String {
        format!("{index:0width$}.png", width = self.padding)
    }

    /// Saves the image and appends its label row.
    ///
    /// The row is flushed immediately so an aborted batch keeps every label
    /// written so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be encoded or either file cannot
    /// be written.
    pub fn write(&mut self, index: usize, captcha: &Captcha) -> Result<PathBuf> {
        let path = self.dir.join(self.image_name(index));
        captcha.image.save_with_format(&path, ImageFormat::Png)?;

        self.labels
            .write_record([index.to_string().as_str(), captcha.text.as_str()])?;
        self.labels.flush()?;
        self.written += 1;

        debug!(index = index, label = %captcha.text, path = %path.display(), "Captcha written");
        Ok(path)
    }

    #[must_use]
    pub const fn written(&self) -> usize {
        self.written
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Flushes the label file and returns the number of captchas written.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush fails.
    pub fn finish(mut self) -> Result<usize> {
        self.labels.flush()?;
        Ok(self.written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captcha::NoiseReport;
    use image::{Rgb, RgbImage};

    fn captcha(text: &str) -> Captcha {
        Captcha {
            text: text.to_string(),
            image: RgbImage::from_pixel(12, 6, Rgb([40, 80, 120])),
            font_size: 10,
            positions: Vec::new(),
            noise: NoiseReport::default(),
        }
    }

    #[test]
    fn test_image_name_padding() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DatasetWriter::create(dir.path(), 4).unwrap();
        assert_eq!(writer.image_name(7), "0007.png");
        assert_eq!(writer.image_name(12345), "12345.png");

        let unpadded = DatasetWriter::create(dir.path(), 0).unwrap();
        assert_eq!(unpadded.image_name(7), "7.png");
    }

    #[test]
    fn test_creates_nested_directory_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a").join("b");
        let writer = DatasetWriter::create(&out, 0).unwrap();
        assert_eq!(writer.finish().unwrap(), 0);

        let labels = fs::read_to_string(out.join(LABELS_FILE)).unwrap();
        assert_eq!(labels, "Id,Label\n");
    }

    #[test]
    fn test_write_image_and_label() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = DatasetWriter::create(dir.path(), 2).unwrap();
        let path = writer.write(0, &captcha("ABCA")).unwrap();
        writer.write(1, &captcha("CCBA")).unwrap();
        assert_eq!(writer.written(), 2);
        assert_eq!(writer.finish().unwrap(), 2);

        assert_eq!(path, dir.path().join("00.png"));
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 6));

        let labels = fs::read_to_string(dir.path().join(LABELS_FILE)).unwrap();
        assert_eq!(labels, "Id,Label\n0,ABCA\n1,CCBA\n");
    }

    #[test]
    fn test_labels_with_commas_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = DatasetWriter::create(dir.path(), 0).unwrap();
        writer.write(0, &captcha("A,B")).unwrap();
        writer.finish().unwrap();

        let mut reader = csv::Reader::from_path(dir.path().join(LABELS_FILE)).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][1], "A,B");
    }
}
