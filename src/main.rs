//! rechallenge - preview pipeline for coding challenge files.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use rechallenge::cli::{Cli, Commands, transform};
use rechallenge::config::Config;
use rechallenge::logger::{set_stderr_only, set_verbose};
use rechallenge::pipeline::Pipeline;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    set_verbose(cli.verbose);

    let config = Config::load_or_default(&cli.config)?;
    let mut pipeline = Pipeline::new(&config)?;
    if cli.no_style {
        pipeline = pipeline.without_style_compiler();
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        match &cli.command {
            Commands::Transform { input, output } => {
                // Results go to stdout, keep log lines out of them
                set_stderr_only(output.is_none());
                transform::transform_files(&pipeline, input, output.as_deref()).await
            }
            Commands::Check { input } => transform::check_files(&pipeline, input).await,
        }
    })
}
