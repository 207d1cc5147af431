//! ditaa-docs CLI - Markdown documentation with ditaa diagrams.
//!
//! Provides commands for:
//! - `build`: Build the documentation once
//! - `watch`: Build, then rebuild whenever sources or included diagrams change

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, WatchArgs};
use output::Output;

/// Log filter used when neither `--verbose` nor `RUST_LOG` is given.
///
/// Render activity is logged at INFO by `ditaa_diagrams`, so it stays visible
/// unless `--quiet-render` turns it off.
const DEFAULT_LOG_FILTER: &str = "warn,ditaa_diagrams=info";

/// ditaa-docs - render ditaa diagrams in Markdown documentation.
#[derive(Parser)]
#[command(name = "ditaa-docs", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the documentation.
    Build(BuildArgs),
    /// Build the documentation and rebuild on changes.
    Watch(WatchArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Build(args) => args.verbose,
        Commands::Watch(args) => args.build.verbose,
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Watch(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

/// --verbose enables INFO level, otherwise use RUST_LOG or the default filter.
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    }
}
