//! CLI struct definitions for the `artful-debug` command-line interface.
//!
//! All clap-derived types live here. Dispatch logic lives in `lib.rs`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "artful-debug",
    version = env!("CARGO_PKG_VERSION"),
    about = "Level-routed debug logging: run message scripts through a profile, inspect presets, render stored logs as HTML."
)]
pub(crate) struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Feed a message script through the engine
    Run(RunCli),
    /// List the built-in profiles and their routing
    Profiles {
        /// Output format: 'text' or 'json'.
        #[clap(long, default_value = "text")]
        format: String,
    },
    /// Render an exported store (JSON lines) as HTML
    Render {
        /// Store export produced by `run --export`.
        #[clap(long)]
        input: PathBuf,
        /// Output file (stdout if not specified).
        #[clap(long)]
        output: Option<PathBuf>,
        /// Show variable dumps without secret redaction.
        #[clap(long)]
        no_redact: bool,
    },
    /// Show how a message would be classified
    Classify {
        /// Raw message including any prefix, e.g. '!!disk full'.
        message: String,
    },
}

#[derive(clap::Args, Debug)]
pub(crate) struct RunCli {
    /// Script file; one message per line (stdin if not specified).
    pub script: Option<PathBuf>,
    /// Profile to load (overrides configuration).
    #[clap(short, long)]
    pub profile: Option<String>,
    /// Configuration file (defaults to the lookup under the current directory).
    #[clap(short, long)]
    pub config: Option<PathBuf>,
    /// Slow-region threshold in seconds.
    #[clap(long)]
    pub slow: Option<f64>,
    /// Write the store as JSON lines when the script ends.
    #[clap(long)]
    pub export: Option<PathBuf>,
}
