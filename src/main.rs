//! DiskStrip: disk usage scanner with a strip treemap layout.
//!
//! Thin binary entry point. All logic lives in the `diskstrip-core`
//! and `diskstrip-cli` crates.

use clap::Parser;
use diskstrip_cli::args::Args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialise structured logging on stderr so it never mixes with output.
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("DiskStrip starting");

    diskstrip_cli::run(&args)
}
