//! Core of the debug engine: levels, routing, timed regions, profiles,
//! configuration and the HTML viewer.
//!
//! Output services live in [`crate::services`].

pub mod assets;
pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod entry;
pub mod error;
pub mod host;
pub mod html;
pub mod level;
pub mod output;
pub mod profile;
pub mod redact;
pub mod stack;
pub mod time;
