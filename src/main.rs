mod emitter;
mod manifest;
mod naming;
mod output;
mod svg_parser;
mod templates;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "fa-codegen")]
#[command(about = "Generate Rust constructors for Font Awesome SVG icons")]
struct Cli {
    /// Write output to FILE (default standard output)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Font Awesome release to fetch metadata for
    #[arg(long, default_value = manifest::DEFAULT_VERSION)]
    fa_version: String,

    /// Read icon metadata from a local icons.json instead of fetching it
    #[arg(long, value_name = "FILE", conflicts_with = "fa_version")]
    manifest: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let icons = match &cli.manifest {
        Some(path) => manifest::load(path)
            .with_context(|| format!("Failed to load icons from {}", path.display()))?,
        None => manifest::fetch(&cli.fa_version)
            .with_context(|| format!("Failed to get icons for Font Awesome {}", cli.fa_version))?,
    };

    if icons.is_empty() {
        warn!("Icon manifest contains no icons");
    }

    info!(icons = icons.len(), "Generating constructors");
    let generated = emitter::generate(&icons);

    for skipped in &generated.skipped {
        warn!(key = %skipped.key, "Skipped: {}", skipped.reason);
    }

    output::write_output(cli.output.as_deref(), &generated.source)?;

    info!(
        constructors = generated.constructors,
        skipped = generated.skipped.len(),
        "Done"
    );

    Ok(())
}

/// Logs go to stderr; stdout carries the generated module
fn init_logging(verbose: bool) {
    tracing_subscriber::registry()
        .with(log_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

/// The level comes from `--verbose` alone; no environment variable is read
fn log_filter(verbose: bool) -> EnvFilter {
    EnvFilter::new(if verbose { "debug" } else { "info" })
}
