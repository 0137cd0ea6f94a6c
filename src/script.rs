//! Line-oriented message scripts for the `run` command.
//!
//! Each line is logged as-is, prefixes included. Lines starting with `#` are
//! comments. Lines starting with `@` are directives:
//!
//! ```text
//! @sleep 0.02              pause
//! @vars {"id": 7}          attach vars to the next message
//! @level store ALL         set_service_level
//! @profile cterm           load_profile
//! @push file / @pop        push_profile / pop_profile
//! @finish done             finish
//! @fatal boom              fatal, stops the script
//! @redirect /next 302      redirect, stops the script
//! ```

use crate::core::engine::{Logger, Outcome};
use crate::core::error::DebugError;
use crate::core::level::{Prefix, classify};
use regex::Regex;
use serde_json::Value;
use std::io::BufRead;
use std::sync::LazyLock;
use std::time::Duration;

static DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([a-z_]+)(?:\s+(.*))?$").unwrap());

fn bad_directive(line: usize, detail: impl std::fmt::Display) -> DebugError {
    DebugError::ConfigError(format!("script line {}: {}", line, detail))
}

/// Run a script to completion. Returns the outcome of the step that stopped
/// it, or `Continue` after a natural finish at end of input.
pub fn run_script(logger: &mut Logger, reader: impl BufRead) -> Result<Outcome, DebugError> {
    let mut pending_vars: Option<Value> = None;
    let mut finished = false;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = index + 1;
        let trimmed = line.trim_end();
        if trimmed.trim().is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some(caps) = DIRECTIVE.captures(trimmed) else {
            if classify(trimmed).prefix == Prefix::Finish {
                finished = true;
            }
            logger.log(trimmed, pending_vars.take())?;
            continue;
        };
        let arg = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
        match &caps[1] {
            "sleep" => {
                let secs: f64 = arg
                    .parse()
                    .map_err(|e| bad_directive(lineno, format!("@sleep {}: {}", arg, e)))?;
                let pause = Duration::try_from_secs_f64(secs)
                    .map_err(|e| bad_directive(lineno, format!("@sleep {}: {}", arg, e)))?;
                std::thread::sleep(pause);
            }
            "vars" => {
                pending_vars = Some(serde_json::from_str(arg)?);
            }
            "level" => {
                let mut parts = arg.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some(service), Some(level)) => {
                        logger.set_service_level_named(service, level)?
                    }
                    _ => return Err(bad_directive(lineno, "@level needs a service and a level")),
                }
            }
            "profile" => logger.load_profile(arg)?,
            "push" => logger.push_profile(arg)?,
            "pop" => logger.pop_profile()?,
            "finish" => {
                logger.finish(arg, pending_vars.take())?;
                finished = true;
            }
            "fatal" => return logger.fatal(arg, pending_vars.take()),
            "redirect" => {
                let mut parts = arg.split_whitespace();
                let href = parts
                    .next()
                    .ok_or_else(|| bad_directive(lineno, "@redirect needs a target"))?;
                let status = match parts.next() {
                    Some(code) => code
                        .parse::<u16>()
                        .map_err(|e| bad_directive(lineno, format!("@redirect {}: {}", code, e)))?,
                    None => 303,
                };
                return logger.redirect(href, status);
            }
            other => return Err(bad_directive(lineno, format!("unknown directive @{}", other))),
        }
    }

    if !finished {
        logger.finish("end of script", None)?;
    }
    logger.flush()?;
    Ok(Outcome::Continue)
}
