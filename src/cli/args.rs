//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Preview pipeline for coding challenge files
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: rechallenge.toml)
    #[arg(short = 'C', long, global = true, default_value = "rechallenge.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Leave Sass blocks uncompiled
    #[arg(long, global = true)]
    pub no_style: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run files through the pipeline and emit the result
    #[command(visible_alias = "t")]
    Transform {
        #[command(flatten)]
        input: InputArgs,

        /// Write results into this directory instead of stdout
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        output: Option<PathBuf>,
    },

    /// Run files through the pipeline and report which ones fail
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        input: InputArgs,
    },
}

/// Input files shared by all subcommands
#[derive(clap::Args, Debug, Clone)]
pub struct InputArgs {
    /// Challenge files (js, jsx, html; anything else passes through)
    #[arg(value_name = "PATH", required = true, value_hint = clap::ValueHint::FilePath)]
    pub paths: Vec<PathBuf>,

    /// Code prepended to every input before compilation
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub head: Option<PathBuf>,

    /// Code appended to every input before compilation
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub tail: Option<PathBuf>,
}
