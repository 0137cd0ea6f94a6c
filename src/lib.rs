//! artful-debug: level-routed debug logging.
//!
//! Messages are classified into severity levels, either from an explicit
//! [`Prefix`] or from the two-character prefix convention:
//!
//! | prefix | level            |
//! |--------|------------------|
//! | `$$`   | finish (natural) |
//! | `XX`   | fatal            |
//! | `->`   | redirect         |
//! | `!!`   | important        |
//! | `>>`   | open timed region  |
//! | `<<`   | close timed region |
//! | none   | log              |
//!
//! Each level routes to an ordered list of output services. Registering a
//! service at a level enables it for every more urgent level too. By default
//! every level is empty, so logging costs one table lookup.
//!
//! # Example
//!
//! ```
//! use artful_debug::{Level, Logger, ServiceName};
//!
//! let mut logger = Logger::new();
//! logger.set_service_level(ServiceName::Store, Level::Log).unwrap();
//! logger.log(">> load", None).unwrap();
//! logger.log("!!cache miss", None).unwrap();
//! logger.log("<< load", None).unwrap();
//! assert_eq!(logger.store().len(), 3);
//! assert_eq!(logger.depth(), 0);
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: levels, dispatch table, engine, timed regions, profiles, config, HTML viewer
//! - [`services`]: output service implementations

pub mod core;
pub mod script;
pub mod services;

mod cli;

pub use crate::core::dispatch::{DispatchTable, ServiceName};
pub use crate::core::engine::{Logger, Outcome};
pub use crate::core::entry::{Bracket, Entry};
pub use crate::core::error::DebugError;
pub use crate::core::host::{ErrorMask, ErrorReport, SharedLogger, install_panic_hook, shared};
pub use crate::core::level::{Level, Prefix, classify};
pub use crate::core::profile::Profile;

use crate::cli::{Cli, Command, RunCli};
use crate::core::config;
use crate::core::html::{HtmlOptions, render_html};
use clap::Parser;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};

pub const DEFAULT_RUN_PROFILE: &str = "cterm";

pub fn run() -> Result<(), DebugError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(run_cli) => run_messages(run_cli),
        Command::Profiles { format } => show_profiles(&format),
        Command::Render {
            input,
            output,
            no_redact,
        } => {
            let entries = read_store_export(BufReader::new(File::open(&input)?))?;
            let options = HtmlOptions {
                redact: !no_redact,
                ..HtmlOptions::default()
            };
            let html = render_html(&entries, &options);
            match output {
                Some(path) => fs::write(path, html)?,
                None => io::stdout().write_all(html.as_bytes())?,
            }
            Ok(())
        }
        Command::Classify { message } => {
            let classified = classify(&message);
            println!(
                "level={} prefix={} message={}",
                classified.level,
                if classified.prefix == Prefix::None {
                    "none"
                } else {
                    classified.prefix.marker()
                },
                classified.message
            );
            Ok(())
        }
    }
}

fn run_messages(run_cli: RunCli) -> Result<(), DebugError> {
    let mut config = match &run_cli.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(&std::env::current_dir()?)?,
    };
    if let Some(slow) = run_cli.slow {
        config.slow_threshold_secs = slow;
    }
    let mut logger = Logger::from_config_with_profile(&config, run_cli.profile.as_deref())?;
    if logger.profile().is_none() {
        logger.load_profile(DEFAULT_RUN_PROFILE)?;
    }

    let outcome = match &run_cli.script {
        Some(path) => script::run_script(&mut logger, BufReader::new(File::open(path)?))?,
        None => script::run_script(&mut logger, io::stdin().lock())?,
    };

    if let Some(path) = &run_cli.export {
        let mut file = File::create(path)?;
        logger.export_store(&mut file)?;
    }
    logger.flush()?;

    match &outcome {
        Outcome::Redirect { location, status } => {
            println!("Location: {} ({})", location, status);
        }
        Outcome::Intercepted { preamble } => {
            println!("{}", preamble);
        }
        Outcome::Continue | Outcome::Exit(_) => {}
    }
    outcome.apply();
    Ok(())
}

/// Parse a store export, one JSON entry per line.
pub fn read_store_export(reader: impl BufRead) -> Result<Vec<Entry>, DebugError> {
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        entries.push(serde_json::from_str(&line)?);
    }
    Ok(entries)
}

fn show_profiles(format: &str) -> Result<(), DebugError> {
    let mut tables = std::collections::BTreeMap::new();
    for profile in Profile::ALL {
        tables.insert(profile.as_str(), profile.table()?);
    }

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&tables)?);
        return Ok(());
    }

    use colored::Colorize;
    for profile in Profile::ALL {
        println!("{}", profile.as_str().bright_cyan().bold());
        for (level, services) in tables[profile.as_str()].iter() {
            let names = services
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            println!("  {:<10} {}", level, names);
        }
    }
    Ok(())
}
