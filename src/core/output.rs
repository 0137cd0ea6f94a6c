//! Output destinations and compact text helpers.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// A boxed writer a service can own.
pub type Sink = Box<dyn Write + Send>;

pub fn stdout_sink() -> Sink {
    Box::new(io::stdout())
}

pub fn stderr_sink() -> Sink {
    Box::new(io::stderr())
}

/// Collapse newlines/extra whitespace and bound length for one-line display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// In-memory writer whose clones share one buffer.
///
/// Hand one clone to the logger as a sink and keep another to read back what
/// was written.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        match self.buf.lock() {
            Ok(buf) => String::from_utf8_lossy(&buf).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contents().is_empty()
    }

    pub fn sink(&self) -> Sink {
        Box::new(self.clone())
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self
            .buf
            .lock()
            .map_err(|_| io::Error::other("memory writer lock poisoned"))?;
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
