//! TOML configuration for building a logger.
//!
//! Looked up at `<root>/.artful-debug/config.toml`, then `<root>/artful-debug.toml`.
//! A missing file means defaults. `ARTFUL_DEBUG_PROFILE` overrides the profile.

use crate::core::engine::Logger;
use crate::core::error::DebugError;
use crate::core::host::ErrorMask;
use crate::core::html::{DEFAULT_COLLAPSE_BYTES, HtmlOptions};
use crate::core::stack::DEFAULT_SLOW;
use crate::services::file::{FileMode, FileService};
use crate::services::mail::{DEFAULT_SUBJECT, MailService, SendmailMailer};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const PROFILE_ENV: &str = "ARTFUL_DEBUG_PROFILE";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    pub profile: Option<String>,
    pub slow_threshold_secs: f64,
    pub rethrow: bool,
    /// Error kinds logged without ending the run, e.g. `["notice", "deprecated"]`.
    pub ignore_errors: Option<Vec<String>>,
    pub error_log: Option<PathBuf>,
    pub file: Option<FileConfig>,
    pub html: HtmlConfig,
    pub mail: Option<MailConfig>,
}

impl Default for DebugConfig {
    fn default() -> Self {
        DebugConfig {
            profile: None,
            slow_threshold_secs: DEFAULT_SLOW.as_secs_f64(),
            rethrow: true,
            ignore_errors: None,
            error_log: None,
            file: None,
            html: HtmlConfig::default(),
            mail: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub mode: FileMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HtmlConfig {
    pub collapse_bytes: usize,
    pub redact: bool,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        HtmlConfig {
            collapse_bytes: DEFAULT_COLLAPSE_BYTES,
            redact: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MailConfig {
    pub to: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub sendmail: Option<PathBuf>,
}

pub fn parse_config(content: &str) -> Result<DebugConfig, DebugError> {
    toml::from_str(content).map_err(|e| DebugError::ConfigError(e.to_string()))
}

pub fn load_config_file(path: &Path) -> Result<DebugConfig, DebugError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load configuration for a project root, falling back to defaults.
pub fn load_config(root: &Path) -> Result<DebugConfig, DebugError> {
    let candidates = [
        root.join(".artful-debug").join("config.toml"),
        root.join("artful-debug.toml"),
    ];
    for path in &candidates {
        if path.exists() {
            return load_config_file(path);
        }
    }
    Ok(DebugConfig::default())
}

impl DebugConfig {
    /// The profile to load, with the environment taking precedence.
    pub fn effective_profile(&self) -> Result<Option<String>, DebugError> {
        self.select_profile(None)
    }

    /// Precedence: `explicit` (e.g. a command-line flag), the environment,
    /// then the file.
    pub fn select_profile(&self, explicit: Option<&str>) -> Result<Option<String>, DebugError> {
        if let Some(profile) = explicit {
            return Ok(Some(profile.to_string()));
        }
        match env::var(PROFILE_ENV) {
            Ok(profile) if !profile.trim().is_empty() => Ok(Some(profile.trim().to_string())),
            Ok(_) | Err(env::VarError::NotPresent) => Ok(self.profile.clone()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn ignore_mask(&self) -> Result<ErrorMask, DebugError> {
        let Some(names) = &self.ignore_errors else {
            return Ok(ErrorMask::default_ignore());
        };
        let mut mask = ErrorMask::empty();
        for name in names {
            mask |= ErrorMask::from_kind_name(name)
                .ok_or_else(|| DebugError::ConfigError(format!("unknown error kind '{}'", name)))?;
        }
        Ok(mask)
    }

    pub fn slow_threshold(&self) -> Result<Duration, DebugError> {
        Duration::try_from_secs_f64(self.slow_threshold_secs).map_err(|e| {
            DebugError::ConfigError(format!(
                "slow_threshold_secs {}: {}",
                self.slow_threshold_secs, e
            ))
        })
    }
}

impl Logger {
    /// Build a logger with services wired from `config` and its profile loaded.
    pub fn from_config(config: &DebugConfig) -> Result<Logger, DebugError> {
        Logger::from_config_with_profile(config, None)
    }

    /// As [`Logger::from_config`], with `profile` overriding both the
    /// environment and the file.
    pub fn from_config_with_profile(
        config: &DebugConfig,
        profile: Option<&str>,
    ) -> Result<Logger, DebugError> {
        let mut logger = Logger::new();
        logger.set_slow_threshold(config.slow_threshold()?);
        logger.set_html_options(HtmlOptions {
            collapse_bytes: config.html.collapse_bytes,
            redact: config.html.redact,
            ..HtmlOptions::default()
        });
        {
            let policy = logger.error_policy_mut();
            policy.rethrow = config.rethrow;
            policy.ignore = config.ignore_mask()?;
        }
        if let Some(path) = &config.error_log {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            logger = logger.with_error_log(Box::new(file));
        }
        if let Some(file) = &config.file {
            logger.replace_service(Box::new(FileService::new(&file.path, file.mode)?));
        }
        if let Some(mail) = &config.mail {
            let mut mailer = SendmailMailer::new(&mail.to);
            if let Some(program) = &mail.sendmail {
                mailer.program = program.clone();
            }
            let subject = mail.subject.clone().unwrap_or_else(|| DEFAULT_SUBJECT.to_string());
            logger.replace_service(Box::new(MailService::new(Box::new(mailer), subject)));
        }
        if let Some(profile) = config.select_profile(profile)? {
            logger.load_profile(&profile)?;
        }
        Ok(logger)
    }
}
