//! Named presets of service wiring.

use crate::core::dispatch::{DispatchTable, ServiceName};
use crate::core::error::DebugError;
use crate::core::level::Level;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Production: important messages to the error log, fatal mail with the stored log.
    Online,
    /// Everything to the log file.
    File,
    /// Important and finish messages to the log file.
    FileMinimal,
    /// Collect everything and render it as HTML when the request ends.
    UnsafeHtml,
    /// Everything to a colour terminal.
    Cterm,
    /// Everything echoed straight to stdout.
    UnsafeEcho,
}

impl Profile {
    pub const ALL: [Profile; 6] = [
        Profile::Online,
        Profile::File,
        Profile::FileMinimal,
        Profile::UnsafeHtml,
        Profile::Cterm,
        Profile::UnsafeEcho,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Online => "online",
            Profile::File => "file",
            Profile::FileMinimal => "file_minimal",
            Profile::UnsafeHtml => "unsafe_html",
            Profile::Cterm => "cterm",
            Profile::UnsafeEcho => "unsafe_echo",
        }
    }

    /// Install this preset on an empty table.
    pub fn apply(self, table: &mut DispatchTable) -> Result<(), DebugError> {
        use ServiceName::*;
        match self {
            Profile::Online => {
                table.set_service_level(ErrorLog, Level::Important)?;
                table.set_service_level(Store, Level::Important)?;
                table.set_finish_level(Level::FinishNatural, &[])?;
                table.set_finish_level(Level::FinishRedirect, &[])?;
                table.set_finish_level(Level::FinishFatal, &[ErrorLog, Store, Mail])?;
            }
            Profile::File => {
                table.set_service_level(File, Level::Log)?;
            }
            Profile::FileMinimal => {
                table.set_service_level(File, Level::Important)?;
            }
            Profile::UnsafeHtml => {
                table.set_service_level(Store, Level::Log)?;
                table.set_finish_level(Level::FinishNatural, &[AllowHtml, Store, OutputHtml])?;
                table.set_finish_level(Level::FinishFatal, &[AllowHtml, Store, OutputHtml])?;
                table.set_finish_level(
                    Level::FinishRedirect,
                    &[AllowHtml, Store, InterceptRedirect, OutputHtml],
                )?;
            }
            Profile::Cterm => {
                table.set_service_level(Cterm, Level::Log)?;
            }
            Profile::UnsafeEcho => {
                table.set_service_level(Echo, Level::Log)?;
            }
        }
        Ok(())
    }

    /// The table this preset produces from scratch.
    pub fn table(self) -> Result<DispatchTable, DebugError> {
        let mut table = DispatchTable::new();
        self.apply(&mut table)?;
        Ok(table)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = DebugError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Profile::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == name)
            .ok_or_else(|| DebugError::UnknownProfile {
                name: name.to_string(),
                valid: Profile::ALL
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}
