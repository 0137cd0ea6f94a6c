//! Output services a level can route entries to.
//!
//! Each service implements [`Service`]. The registry binds every
//! [`ServiceName`] to exactly one implementation; hosts swap implementations
//! (a configured file sink, a mailer) with [`Registry::replace`].
//!
//! - `echo`, `cterm`, `error_log`, `stderr`: one line per entry
//! - `store`: keeps entries for later rendering
//! - `file`: append/overwrite log file
//! - `allow_html`, `intercept_redirect`, `output_html`: HTML response handling
//! - `mail`: sends the rendered store through a [`mail::Mailer`]

pub mod cterm;
pub mod echo;
pub mod error_log;
pub mod file;
pub mod html;
pub mod mail;
pub mod store;

use crate::core::dispatch::ServiceName;
use crate::core::entry::Entry;
use crate::core::error::DebugError;
use crate::core::html::{HtmlOptions, render_html};
use crate::core::output::{Sink, stderr_sink, stdout_sink};
use rustc_hash::FxHashMap;
use std::io::Write;

/// State shared by all services of one logger.
pub struct ServiceState {
    pub store: Vec<Entry>,
    pub html_allowed: bool,
    pub redirect_preamble: Option<String>,
    pub html: HtmlOptions,
    pub stdout: Sink,
    pub stderr: Sink,
    pub error_log: Sink,
}

impl Default for ServiceState {
    fn default() -> Self {
        ServiceState {
            store: Vec::new(),
            html_allowed: false,
            redirect_preamble: None,
            html: HtmlOptions::default(),
            stdout: stdout_sink(),
            stderr: stderr_sink(),
            error_log: stderr_sink(),
        }
    }
}

impl ServiceState {
    /// Render the store with the current redirect preamble.
    pub fn render_store(&self) -> String {
        let options = HtmlOptions {
            preamble: self.redirect_preamble.clone(),
            ..self.html.clone()
        };
        render_html(&self.store, &options)
    }

    pub fn flush(&mut self) -> Result<(), DebugError> {
        self.stdout.flush()?;
        self.stderr.flush()?;
        self.error_log.flush()?;
        Ok(())
    }
}

pub trait Service: Send {
    fn name(&self) -> ServiceName;

    fn handle(&mut self, entry: &Entry, state: &mut ServiceState) -> Result<(), DebugError>;

    fn flush(&mut self) -> Result<(), DebugError> {
        Ok(())
    }
}

pub struct Registry {
    services: FxHashMap<ServiceName, Box<dyn Service>>,
}

impl Default for Registry {
    fn default() -> Self {
        let defaults: Vec<Box<dyn Service>> = vec![
            Box::new(echo::EchoService),
            Box::new(cterm::CtermService),
            Box::new(error_log::ErrorLogService),
            Box::new(error_log::StderrService),
            Box::new(store::StoreService),
            Box::new(file::FileService::default()),
            Box::new(html::AllowHtmlService),
            Box::new(html::InterceptRedirectService),
            Box::new(html::OutputHtmlService),
            Box::new(mail::MailService::default()),
        ];
        let mut registry = Registry {
            services: FxHashMap::default(),
        };
        for service in defaults {
            registry.replace(service);
        }
        registry
    }
}

impl Registry {
    /// Bind a service under its own name, returning the one it displaced.
    pub fn replace(&mut self, service: Box<dyn Service>) -> Option<Box<dyn Service>> {
        self.services.insert(service.name(), service)
    }

    pub fn get_mut(&mut self, name: ServiceName) -> Option<&mut Box<dyn Service>> {
        self.services.get_mut(&name)
    }

    pub fn flush(&mut self) -> Result<(), DebugError> {
        for service in self.services.values_mut() {
            service.flush()?;
        }
        Ok(())
    }
}
