//! Depth and timing for `>>` / `<<` bracketed regions.

use crate::core::entry::{Bracket, Entry};
use crate::core::level::{Level, Prefix};
use crate::core::output::compact_line;
use crate::core::time::format_secs;
use std::time::{Duration, Instant};

pub const DEFAULT_SLOW: Duration = Duration::from_millis(100);

const SCOPE_CHARS: usize = 40;

#[derive(Debug, Clone)]
struct Frame {
    started: Instant,
    scope: String,
}

#[derive(Debug, Clone)]
pub struct StackTracker {
    frames: Vec<Frame>,
    depth: usize,
    slow: Duration,
}

impl Default for StackTracker {
    fn default() -> Self {
        StackTracker::new(DEFAULT_SLOW)
    }
}

impl StackTracker {
    pub fn new(slow: Duration) -> Self {
        StackTracker {
            frames: Vec::new(),
            depth: 0,
            slow,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn slow(&self) -> Duration {
        self.slow
    }

    pub fn set_slow(&mut self, slow: Duration) {
        self.slow = slow;
    }

    /// Scopes of the regions still open, outermost first.
    pub fn open_scopes(&self) -> Vec<&str> {
        self.frames.iter().map(|f| f.scope.as_str()).collect()
    }

    /// Update depth and timing for one entry.
    ///
    /// Entries that are neither a start nor an end just record the current depth.
    pub fn track(&mut self, entry: &mut Entry) {
        self.track_at(entry, Instant::now());
    }

    pub(crate) fn track_at(&mut self, entry: &mut Entry, now: Instant) {
        match entry.prefix {
            Prefix::Start => {
                let scope = entry
                    .scope
                    .clone()
                    .unwrap_or_else(|| compact_line(&entry.message, SCOPE_CHARS));
                entry.scope = Some(scope.clone());
                entry.depth = self.depth;
                entry.bracket = Bracket::Open;
                self.frames.push(Frame { started: now, scope });
                self.depth += 1;
            }
            Prefix::End => {
                let elapsed = match self.frames.pop() {
                    Some(frame) => {
                        if entry.scope.is_none() {
                            entry.scope = Some(frame.scope);
                        }
                        now.saturating_duration_since(frame.started)
                    }
                    None => Duration::ZERO,
                };
                self.depth = self.depth.saturating_sub(1);
                entry.depth = self.depth;
                entry.bracket = Bracket::Close;
                entry.message = format!("{} {}", entry.message, format_secs(elapsed));
                if elapsed > self.slow {
                    entry.level = Level::Important;
                    entry.message = format!("SLOW: {}", entry.message);
                }
                entry.invalidate_text();
            }
            _ => entry.depth = self.depth,
        }
    }
}
