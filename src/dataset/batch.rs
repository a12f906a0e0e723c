//! Batch generation.
//!
//! Spreads captcha indices over worker threads and persists the results in
//! index order. Each index gets its own generator seeded from the batch seed,
//! so a seed reproduces the same dataset whatever the worker count.

use crate::captcha::{Captcha, CaptchaGenerator};
use crate::config::{CaptchaError, Result};
use crate::dataset::sink::DatasetWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use tracing::{info, warn};

/// Shared flag requesting that a batch stop before its next captcha.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How many captchas to produce and how.
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub count: usize,
    /// Worker threads; at least one.
    pub workers: usize,
    /// Base seed. Drawn from the thread RNG when absent.
    pub seed: Option<u64>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            count: 0,
            workers: 1,
            seed: None,
        }
    }
}

/// Outcome of a completed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub written: usize,
    /// Seed that reproduces this batch.
    pub seed: u64,
}

/// Random source for the captcha at `index`.
#[must_use]
pub fn captcha_rng(seed: u64, index: usize) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(index as u64))
}

/// Generates `options.count` captchas and writes them through `writer`.
///
/// # Errors
///
/// Returns `CaptchaError::Config` for zero workers, the first generation or
/// write error, or `CaptchaError::Cancelled` when `cancel` fires first.
/// Captchas persisted before the error stay on disk.
pub fn generate_batch(
    generator: &CaptchaGenerator,
    mut writer: DatasetWriter,
    options: &BatchOptions,
    cancel: &CancelToken,
) -> Result<BatchSummary> {
    if options.workers == 0 {
        return Err(CaptchaError::config("workers must be at least 1"));
    }

    let seed = options.seed.unwrap_or_else(|| rand::rng().random());
    let workers = options.workers.min(options.count).max(1);
    info!(
        count = options.count,
        workers = workers,
        seed = seed,
        length = generator.spec().length,
        size = %generator.spec().size,
        output = %writer.dir().display(),
        "Batch started"
    );

    let next_index = AtomicUsize::new(0);
    let written = thread::scope(|scope| {
        let (tx, rx) = mpsc::sync_channel::<(usize, Result<Captcha>)>(workers * 2);
        for _ in 0..workers {
            let tx = tx.clone();
            let next_index = &next_index;
            scope.spawn(move || {
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let index = next_index.fetch_add(1, Ordering::Relaxed);
                    if index >= options.count {
                        break;
                    }
                    let result = generator.generate(&mut captcha_rng(seed, index));
                    if tx.send((index, result)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        write_in_order(rx, &mut writer, cancel)
    })?;

    if written < options.count {
        warn!(completed = written, requested = options.count, "Batch cancelled");
        return Err(CaptchaError::Cancelled { completed: written });
    }

    let written = writer.finish()?;
    info!(written = written, seed = seed, "Batch complete");
    Ok(BatchSummary { written, seed })
}

/// Drains `rx`, writing captchas strictly by ascending index.
///
/// `pending` holds captchas finished ahead of the lowest index still in
/// flight. Workers claim indices in ascending order, so it stays within a few
/// entries per worker while generation times are similar; a single captcha
/// that takes far longer than the rest lets it grow by up to the remainder
/// of the batch.
///
/// Stops at the first error; dropping `rx` then unblocks the workers.
fn write_in_order(
    rx: Receiver<(usize, Result<Captcha>)>,
    writer: &mut DatasetWriter,
    cancel: &CancelToken,
) -> Result<usize> {
    let mut pending = BTreeMap::new();
    let mut next = 0;

    for (index, result) in rx {
        pending.insert(index, result?);
        while let Some(captcha) = pending.remove(&next) {
            if cancel.is_cancelled() {
                return Ok(next);
            }
            writer.write(next, &captcha)?;
            next += 1;
        }
    }
    Ok(next)
}
