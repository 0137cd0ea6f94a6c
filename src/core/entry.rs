//! One log entry, built per `log()` call and handed to every service.

use crate::core::level::{Level, Prefix};
use crate::core::time;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::OnceCell;

/// Position of an entry relative to a timed region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bracket {
    #[default]
    None,
    Open,
    Close,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub ts: String,
    /// Seconds since the logger was created.
    pub elapsed_secs: f64,
    pub prefix: Prefix,
    pub level: Level,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vars: Option<Value>,
    pub depth: usize,
    #[serde(default)]
    pub bracket: Bracket,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backtrace: Option<String>,
    #[serde(skip)]
    text: OnceCell<String>,
}

impl Entry {
    pub fn new(prefix: Prefix, message: impl Into<String>, vars: Option<Value>) -> Self {
        Entry {
            id: time::new_entry_id(),
            ts: time::now_epoch_z(),
            elapsed_secs: 0.0,
            prefix,
            level: prefix.level(),
            message: message.into(),
            vars,
            depth: 0,
            bracket: Bracket::None,
            scope: None,
            backtrace: None,
            text: OnceCell::new(),
        }
    }

    /// Important and every finish level.
    pub fn is_important(&self) -> bool {
        self.level != Level::Disable && self.level <= Level::Important
    }

    /// Plain single-line rendering shared by the text services.
    ///
    /// Computed on first use; the entry must not be mutated afterwards.
    pub fn text(&self) -> &str {
        self.text
            .get_or_init(|| self.render_line(self.vars.as_ref()))
    }

    /// Same layout as [`Entry::text`] with a substitute vars payload.
    pub fn render_line(&self, vars: Option<&Value>) -> String {
        let mut line = "  ".repeat(self.depth);
        if self.prefix != Prefix::None {
            line.push_str(self.prefix.marker());
            line.push(' ');
        }
        line.push_str(&self.message);
        if let Some(vars) = vars {
            line.push(' ');
            line.push_str(&vars.to_string());
        }
        line
    }

    /// Drop the memoised text after a mutation.
    pub(crate) fn invalidate_text(&mut self) {
        self.text = OnceCell::new();
    }
}
