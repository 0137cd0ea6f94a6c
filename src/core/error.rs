use std::env;
use std::io;
use thiserror::Error;

use crate::core::level::Level;

#[derive(Error, Debug)]
pub enum DebugError {
    #[error("Unknown service '{name}'. Valid services: {valid}")]
    UnknownService { name: String, valid: String },
    #[error("Invalid level: {0}")]
    InvalidLevel(String),
    #[error(
        "Level {0} is a finish level; use set_finish_services, set_fatal_services or set_redirect_services instead"
    )]
    UseDedicatedSetter(Level),
    #[error("Unknown profile '{name}'. Valid profiles: {valid}")]
    UnknownProfile { name: String, valid: String },
    #[error("Profile stack is empty")]
    EmptyProfileStack,
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Mail error: {0}")]
    MailError(String),
    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] env::VarError),
}
