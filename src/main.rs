//! `captchanova` - labeled captcha dataset generator.
//!
//! Copyright (C) 2026 Maverick
//! SPDX-License-Identifier: AGPL-3.0-only
//!
//! Loads configuration, sets up logging, and writes a batch of captcha
//! images with their labels.

use captchanova::{
    Args, BatchSummary, CancelToken, CaptchaGenerator, DatasetWriter, EmbeddedFont, FileFont,
    FontProvider, Result, generate_batch,
};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn run(args: &Args) -> Result<BatchSummary> {
    let spec = args.captcha_spec()?;
    let options = args.batch_options()?;

    let provider: Box<dyn FontProvider> = match &args.font {
        Some(path) => Box::new(FileFont::new(path)),
        None => Box::new(EmbeddedFont),
    };
    let generator = CaptchaGenerator::from_provider(spec, provider.as_ref())?;

    let writer = DatasetWriter::create(&args.output, args.padding)?;
    generate_batch(&generator, writer, &options, &CancelToken::new())
}

fn main() {
    dotenvy::dotenv().ok();

    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(non_blocking);

    if log_format.eq_ignore_ascii_case("pretty") {
        subscriber.init();
    } else {
        subscriber.json().init();
    }

    let args = Args::parse();
    info!(
        alphabet = %args.alphabet,
        length = args.length,
        num = args.num,
        size = %args.size,
        output = %args.output.display(),
        "Generator initialized"
    );

    let code = match run(&args) {
        Ok(summary) => {
            info!(written = summary.written, seed = summary.seed, "Dataset written");
            0
        }
        Err(e) => {
            error!(error = %e, "Generation failed");
            1
        }
    };

    drop(guard);
    std::process::exit(code);
}
