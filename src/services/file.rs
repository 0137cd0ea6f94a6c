//! Log file sink.
//!
//! The file is opened on the first entry, not at configuration time. In
//! overwrite mode an existing file is moved aside to `<name>.prev` when the
//! service is configured, so each run starts a fresh dump.

use crate::core::dispatch::ServiceName;
use crate::core::entry::Entry;
use crate::core::error::DebugError;
use crate::core::redact::redact;
use crate::services::{Service, ServiceState};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_FILE_NAME: &str = "artful-debug.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileMode {
    #[default]
    Append,
    Overwrite,
}

pub struct FileService {
    path: PathBuf,
    mode: FileMode,
    file: Option<File>,
}

impl Default for FileService {
    fn default() -> Self {
        FileService {
            path: std::env::temp_dir().join(DEFAULT_FILE_NAME),
            mode: FileMode::Append,
            file: None,
        }
    }
}

/// `debug.log` -> `debug.log.prev`
pub fn previous_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".prev");
    PathBuf::from(name)
}

impl FileService {
    pub fn new(path: impl Into<PathBuf>, mode: FileMode) -> Result<Self, DebugError> {
        let path = path.into();
        if mode == FileMode::Overwrite && path.exists() {
            fs::rename(&path, previous_path(&path))?;
        }
        Ok(FileService {
            path,
            mode,
            file: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<File, DebugError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut options = OpenOptions::new();
        options.create(true);
        match self.mode {
            FileMode::Append => options.append(true),
            FileMode::Overwrite => options.write(true).truncate(true),
        };
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o660);
        }
        Ok(options.open(&self.path)?)
    }
}

impl Service for FileService {
    fn name(&self) -> ServiceName {
        ServiceName::File
    }

    fn handle(&mut self, entry: &Entry, state: &mut ServiceState) -> Result<(), DebugError> {
        if self.file.is_none() {
            self.file = Some(self.open()?);
        }
        let line = match (&entry.vars, state.html.redact) {
            (Some(vars), true) => entry.render_line(Some(&redact(vars))),
            _ => entry.text().to_string(),
        };
        if let Some(file) = self.file.as_mut() {
            writeln!(
                file,
                "{} {:>8.3} {:<9} {}",
                entry.ts, entry.elapsed_secs, entry.level, line
            )?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DebugError> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}
