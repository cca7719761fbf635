pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod processor;
pub mod writer;

pub use error::{DecodeError, Result};
pub use model::DecodedWorld;

use anyhow::Context;
use clap::Parser;

use crate::config::DecodeConfig;

pub fn run() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let config = match &args.config {
        Some(path) => DecodeConfig::load(path)?,
        None => DecodeConfig::default(),
    };
    let config = args.apply(config);
    log::debug!("{config:?}");

    // 1. ── Load ───────────────────────────────────────────────────────
    let raw = parser::load(&args.input, &config)
        .with_context(|| format!("Loading game files from {}", args.input.display()))?;

    // 2. ── Decode ─────────────────────────────────────────────────────
    let world = processor::run(&raw, &config).with_context(|| "Decoding world")?;

    // 3. ── Write outputs ──────────────────────────────────────────────
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Creating {}", args.output.display()))?;

    writer::json::emit(&world, &args.output).with_context(|| "Writing world JSON")?;

    Ok(())
}
