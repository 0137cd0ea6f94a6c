//! Service names and the per-level dispatch table.
//!
//! The table maps each routed level to an ordered list of services. Order is
//! invocation order. Two placement rules hold on every list:
//! - `store` sits in front so later services see the entry already stored.
//! - on finish levels `mail` and then `output_html` sit last, since they
//!   consume everything produced before them.

use crate::core::error::DebugError;
use crate::core::level::Level;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceName {
    Echo,
    Cterm,
    ErrorLog,
    Stderr,
    Store,
    File,
    AllowHtml,
    InterceptRedirect,
    OutputHtml,
    Mail,
}

impl ServiceName {
    pub const ALL: [ServiceName; 10] = [
        ServiceName::Echo,
        ServiceName::Cterm,
        ServiceName::ErrorLog,
        ServiceName::Stderr,
        ServiceName::Store,
        ServiceName::File,
        ServiceName::AllowHtml,
        ServiceName::InterceptRedirect,
        ServiceName::OutputHtml,
        ServiceName::Mail,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceName::Echo => "echo",
            ServiceName::Cterm => "cterm",
            ServiceName::ErrorLog => "error_log",
            ServiceName::Stderr => "stderr",
            ServiceName::Store => "store",
            ServiceName::File => "file",
            ServiceName::AllowHtml => "allow_html",
            ServiceName::InterceptRedirect => "intercept_redirect",
            ServiceName::OutputHtml => "output_html",
            ServiceName::Mail => "mail",
        }
    }

    fn valid_names() -> String {
        ServiceName::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ServiceName {
    type Err = DebugError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ServiceName::ALL
            .iter()
            .copied()
            .find(|s| s.as_str() == name)
            .ok_or_else(|| DebugError::UnknownService {
                name: name.to_string(),
                valid: ServiceName::valid_names(),
            })
    }
}

/// Services kept at the end of finish-level lists, in this order.
const TRAILING: [ServiceName; 2] = [ServiceName::Mail, ServiceName::OutputHtml];

/// 0 for ordinary services, then the position within [`TRAILING`] plus one.
fn tail_rank(service: ServiceName) -> usize {
    TRAILING
        .iter()
        .position(|s| *s == service)
        .map_or(0, |i| i + 1)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchTable {
    levels: BTreeMap<Level, Vec<ServiceName>>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn services(&self, level: Level) -> &[ServiceName] {
        self.levels.get(&level).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty_at(&self, level: Level) -> bool {
        self.services(level).is_empty()
    }

    pub fn contains(&self, level: Level, service: ServiceName) -> bool {
        self.services(level).contains(&service)
    }

    /// Enable `service` for every level up to and including `level`, and
    /// disable it for every level above. `Disable` removes it everywhere.
    pub fn set_service_level(&mut self, service: ServiceName, level: Level) -> Result<(), DebugError> {
        if level.is_finish() {
            return Err(DebugError::UseDedicatedSetter(level));
        }
        for routed in Level::ROUTED {
            let list = self.levels.entry(routed).or_default();
            let present = list.contains(&service);
            if routed <= level {
                if !present {
                    if service == ServiceName::Store {
                        list.insert(0, service);
                    } else if routed.is_finish() {
                        let rank = tail_rank(service);
                        let at = list
                            .iter()
                            .position(|s| tail_rank(*s) > rank)
                            .unwrap_or(list.len());
                        list.insert(at, service);
                    } else {
                        list.push(service);
                    }
                }
            } else if present {
                list.retain(|s| *s != service);
            }
        }
        Ok(())
    }

    /// Replace the list for one finish level.
    pub fn set_finish_level(&mut self, level: Level, services: &[ServiceName]) -> Result<(), DebugError> {
        if !level.is_finish() {
            return Err(DebugError::InvalidLevel(format!(
                "{} is not a finish level",
                level
            )));
        }
        let mut list: Vec<ServiceName> = Vec::with_capacity(services.len());
        for service in services {
            if !list.contains(service) {
                list.push(*service);
            }
        }
        let consumes_store =
            list.contains(&ServiceName::OutputHtml) || list.contains(&ServiceName::Mail);
        if consumes_store && list.contains(&ServiceName::Store) {
            list.retain(|s| *s != ServiceName::Store);
            list.insert(0, ServiceName::Store);
        }
        for last in TRAILING {
            if list.contains(&last) {
                list.retain(|s| *s != last);
                list.push(last);
            }
        }
        self.levels.insert(level, list);
        Ok(())
    }

    /// Levels with at least one service, most urgent first.
    pub fn iter(&self) -> impl Iterator<Item = (Level, &[ServiceName])> {
        self.levels
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(level, list)| (*level, list.as_slice()))
    }
}
