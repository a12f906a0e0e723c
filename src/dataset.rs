//! Dataset output.
//!
//! Batch generation over worker threads and the PNG + CSV sink.

pub mod batch;
pub mod sink;

pub use batch::{BatchOptions, BatchSummary, CancelToken, captcha_rng, generate_batch};
pub use sink::{DatasetWriter, LABELS_FILE};
