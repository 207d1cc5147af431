//! `ditaa-docs build` command implementation.

use std::path::PathBuf;

use clap::Args;
use ditaa_builder::{BuildConfig, SiteBuilder};
use ditaa_config::{CliSettings, Config};
use ditaa_diagrams::BuildSession;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover ditaa.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Markdown source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format (overrides config).
    #[arg(long, value_parser = ["html", "markdown"])]
    format: Option<String>,

    /// ditaa executable (overrides config and DITAA_CMD).
    #[arg(long = "ditaa", value_name = "CMD")]
    command: Option<String>,

    /// Do not log each diagram render.
    #[arg(long)]
    quiet_render: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Load the configuration with these arguments as overrides.
    pub(crate) fn load_config(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            source_dir: self.source_dir.clone(),
            output_dir: self.output_dir.clone(),
            format: self.format.clone(),
            command: self.command.clone(),
            log_enabled: self.quiet_render.then_some(false),
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }

    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.load_config()?;
        let builder = SiteBuilder::new(BuildConfig::from(&config));

        output.info(&format!(
            "Source: {}",
            config.docs_resolved.source_dir.display()
        ));
        output.info(&format!(
            "Output: {}",
            config.docs_resolved.output_dir.display()
        ));

        let report = builder.build(&mut BuildSession::new())?;
        output.report(&report, &config.docs_resolved.output_dir);
        Ok(())
    }
}
