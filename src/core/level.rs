//! Severity levels and the message prefix classifier.
//!
//! Levels are ordered from most urgent to most verbose. A service registered
//! at level N fires for every level from `FinishNatural` up to N.

use crate::core::error::DebugError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Disable = 0,
    FinishNatural = 1,
    FinishFatal = 2,
    FinishRedirect = 3,
    Important = 4,
    Stack = 5,
    Log = 6,
}

impl Level {
    /// Every level that can carry services, most urgent first.
    pub const ROUTED: [Level; 6] = [
        Level::FinishNatural,
        Level::FinishFatal,
        Level::FinishRedirect,
        Level::Important,
        Level::Stack,
        Level::Log,
    ];

    pub fn is_finish(self) -> bool {
        matches!(
            self,
            Level::FinishNatural | Level::FinishFatal | Level::FinishRedirect
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Disable => "disable",
            Level::FinishNatural => "finish",
            Level::FinishFatal => "fatal",
            Level::FinishRedirect => "redirect",
            Level::Important => "important",
            Level::Stack => "stack",
            Level::Log => "log",
        }
    }

    pub fn from_index(index: u8) -> Option<Level> {
        match index {
            0 => Some(Level::Disable),
            1 => Some(Level::FinishNatural),
            2 => Some(Level::FinishFatal),
            3 => Some(Level::FinishRedirect),
            4 => Some(Level::Important),
            5 => Some(Level::Stack),
            6 => Some(Level::Log),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Accepts numeric levels, the symbolic prefix tokens and the level names.
impl FromStr for Level {
    type Err = DebugError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        if let Ok(index) = token.parse::<u8>() {
            return Level::from_index(index)
                .ok_or_else(|| DebugError::InvalidLevel(token.to_string()));
        }
        match token {
            "ALL" => Ok(Level::Log),
            "!!" => Ok(Level::Important),
            ">>" | "<<" => Ok(Level::Stack),
            "$$" => Ok(Level::FinishNatural),
            "XX" => Ok(Level::FinishFatal),
            "->" => Ok(Level::FinishRedirect),
            other => match other.to_ascii_lowercase().as_str() {
                "disable" | "none" => Ok(Level::Disable),
                "finish" => Ok(Level::FinishNatural),
                "fatal" => Ok(Level::FinishFatal),
                "redirect" => Ok(Level::FinishRedirect),
                "important" => Ok(Level::Important),
                "stack" => Ok(Level::Stack),
                "log" | "all" => Ok(Level::Log),
                _ => Err(DebugError::InvalidLevel(token.to_string())),
            },
        }
    }
}

/// The kind of a message, historically encoded as a two character prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prefix {
    None,
    Redirect,
    Finish,
    Fatal,
    Important,
    Start,
    End,
}

impl Prefix {
    const TABLE: [(&'static str, Prefix); 6] = [
        ("->", Prefix::Redirect),
        ("$$", Prefix::Finish),
        ("XX", Prefix::Fatal),
        ("!!", Prefix::Important),
        (">>", Prefix::Start),
        ("<<", Prefix::End),
    ];

    pub fn level(self) -> Level {
        match self {
            Prefix::None => Level::Log,
            Prefix::Redirect => Level::FinishRedirect,
            Prefix::Finish => Level::FinishNatural,
            Prefix::Fatal => Level::FinishFatal,
            Prefix::Important => Level::Important,
            Prefix::Start | Prefix::End => Level::Stack,
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Prefix::None => "",
            Prefix::Redirect => "->",
            Prefix::Finish => "$$",
            Prefix::Fatal => "XX",
            Prefix::Important => "!!",
            Prefix::Start => ">>",
            Prefix::End => "<<",
        }
    }
}

/// Result of running the classifier over a raw message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified<'a> {
    pub level: Level,
    pub prefix: Prefix,
    pub message: &'a str,
}

/// Match the first two characters of `raw` against the prefix table.
///
/// A recognised prefix is removed along with a single following space.
pub fn classify(raw: &str) -> Classified<'_> {
    for (marker, prefix) in Prefix::TABLE {
        if let Some(rest) = raw.strip_prefix(marker) {
            return Classified {
                level: prefix.level(),
                prefix,
                message: rest.strip_prefix(' ').unwrap_or(rest),
            };
        }
    }
    Classified {
        level: Level::Log,
        prefix: Prefix::None,
        message: raw,
    }
}
