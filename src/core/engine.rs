//! The logger: classification, routing, timed regions and the finish paths.
//!
//! A `Logger` owns the dispatch table, the service registry and the state the
//! services share. Every call runs to completion before returning. Nothing in
//! here ends the process: `fatal`, `redirect` and error handling return an
//! [`Outcome`] for the host to act on.

use crate::core::dispatch::{DispatchTable, ServiceName};
use crate::core::entry::Entry;
use crate::core::error::DebugError;
use crate::core::host::{ErrorMask, ErrorPolicy, ErrorReport};
use crate::core::html::HtmlOptions;
use crate::core::level::{Level, Prefix, classify};
use crate::core::output::Sink;
use crate::core::profile::Profile;
use crate::core::stack::StackTracker;
use crate::services::{Registry, Service, ServiceState};
use serde_json::{Value, json};
use std::backtrace::Backtrace;
use std::io::Write;
use std::time::{Duration, Instant};

/// What the host should do after a finish path ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit(i32),
    /// Emit a `Location` header with this status.
    Redirect { location: String, status: u16 },
    /// The redirect was replaced by a continue link.
    Intercepted { preamble: String },
}

impl Outcome {
    /// Terminate the process on `Exit`; every other outcome is left to the host.
    pub fn apply(self) {
        if let Outcome::Exit(code) = self {
            std::process::exit(code);
        }
    }
}

pub type ExitCallback = Box<dyn FnMut(&str, Option<&Value>) -> Outcome + Send>;
pub type SessionCloser = Box<dyn FnMut() + Send>;

pub struct Logger {
    table: DispatchTable,
    saved: Vec<(DispatchTable, Option<Profile>)>,
    registry: Registry,
    state: ServiceState,
    stack: StackTracker,
    started: Instant,
    errors: ErrorPolicy,
    profile: Option<Profile>,
    on_exit: Option<ExitCallback>,
    on_redirect: Option<SessionCloser>,
}

impl Default for Logger {
    fn default() -> Self {
        Logger::new()
    }
}

impl Logger {
    /// A logger with every level disabled.
    pub fn new() -> Self {
        Logger {
            table: DispatchTable::new(),
            saved: Vec::new(),
            registry: Registry::default(),
            state: ServiceState::default(),
            stack: StackTracker::default(),
            started: Instant::now(),
            errors: ErrorPolicy::default(),
            profile: None,
            on_exit: None,
            on_redirect: None,
        }
    }

    pub fn with_stdout(mut self, sink: Sink) -> Self {
        self.state.stdout = sink;
        self
    }

    pub fn with_stderr(mut self, sink: Sink) -> Self {
        self.state.stderr = sink;
        self
    }

    pub fn with_error_log(mut self, sink: Sink) -> Self {
        self.state.error_log = sink;
        self
    }

    pub fn with_service(mut self, service: Box<dyn Service>) -> Self {
        self.registry.replace(service);
        self
    }

    /// Swap the implementation bound to a service name.
    pub fn replace_service(&mut self, service: Box<dyn Service>) {
        self.registry.replace(service);
    }

    pub fn set_slow_threshold(&mut self, slow: Duration) {
        self.stack.set_slow(slow);
    }

    pub fn set_html_options(&mut self, options: HtmlOptions) {
        self.state.html = options;
    }

    pub fn set_exit_callback(&mut self, callback: ExitCallback) {
        self.on_exit = Some(callback);
    }

    /// Called before a real (non-intercepted) redirect, e.g. to flush a session.
    pub fn set_session_closer(&mut self, closer: SessionCloser) {
        self.on_redirect = Some(closer);
    }

    pub fn error_policy(&self) -> &ErrorPolicy {
        &self.errors
    }

    pub fn error_policy_mut(&mut self) -> &mut ErrorPolicy {
        &mut self.errors
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.profile
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    pub fn services_for(&self, level: Level) -> &[ServiceName] {
        self.table.services(level)
    }

    // Configuration

    pub fn set_service_level(&mut self, service: ServiceName, level: Level) -> Result<(), DebugError> {
        self.table.set_service_level(service, level)
    }

    /// String form: `set_service_level_named("store", "ALL")`.
    pub fn set_service_level_named(&mut self, service: &str, level: &str) -> Result<(), DebugError> {
        let service = service.parse()?;
        let level = level.parse()?;
        self.set_service_level(service, level)
    }

    pub fn set_finish_services(&mut self, services: &[ServiceName]) -> Result<(), DebugError> {
        self.table.set_finish_level(Level::FinishNatural, services)
    }

    pub fn set_fatal_services(&mut self, services: &[ServiceName]) -> Result<(), DebugError> {
        self.table.set_finish_level(Level::FinishFatal, services)
    }

    pub fn set_redirect_services(&mut self, services: &[ServiceName]) -> Result<(), DebugError> {
        self.table.set_finish_level(Level::FinishRedirect, services)
    }

    /// Replace the whole table with a preset and take over error handling.
    pub fn load_profile(&mut self, name: &str) -> Result<(), DebugError> {
        let profile: Profile = name.parse()?;
        self.load(profile)
    }

    pub fn load(&mut self, profile: Profile) -> Result<(), DebugError> {
        let mut table = DispatchTable::new();
        profile.apply(&mut table)?;
        self.table = table;
        self.profile = Some(profile);
        self.errors.installed = true;
        self.errors.reporting = ErrorMask::all();
        Ok(())
    }

    pub fn push_profile(&mut self, name: &str) -> Result<(), DebugError> {
        let profile: Profile = name.parse()?;
        self.saved.push((self.table.clone(), self.profile));
        self.load(profile)
    }

    pub fn pop_profile(&mut self) -> Result<(), DebugError> {
        let (table, profile) = self.saved.pop().ok_or(DebugError::EmptyProfileStack)?;
        self.table = table;
        self.profile = profile;
        Ok(())
    }

    // Logging

    /// Log a message using the prefix convention (`!!`, `>>`, `<<`, ...).
    pub fn log(&mut self, raw: &str, vars: Option<Value>) -> Result<(), DebugError> {
        let classified = classify(raw);
        self.log_kind(classified.prefix, classified.message, vars)
    }

    /// Log with an explicit message kind; the text is taken verbatim.
    pub fn log_kind(&mut self, prefix: Prefix, message: &str, vars: Option<Value>) -> Result<(), DebugError> {
        if self.table.is_empty_at(prefix.level()) {
            return Ok(());
        }
        self.dispatch(Entry::new(prefix, message, vars))
    }

    /// Open a timed region.
    pub fn start(&mut self, message: &str) -> Result<(), DebugError> {
        self.log_kind(Prefix::Start, message, None)
    }

    /// Close the innermost timed region.
    pub fn end(&mut self, message: &str) -> Result<(), DebugError> {
        self.log_kind(Prefix::End, message, None)
    }

    fn dispatch(&mut self, mut entry: Entry) -> Result<(), DebugError> {
        entry.elapsed_secs = self.started.elapsed().as_secs_f64();
        self.stack.track(&mut entry);
        let Self {
            table,
            registry,
            state,
            ..
        } = self;
        // A slow region may have escalated the entry to Important.
        for name in table.services(entry.level) {
            if let Some(service) = registry.get_mut(*name) {
                service.handle(&entry, state)?;
            }
        }
        Ok(())
    }

    pub fn finish(&mut self, message: &str, vars: Option<Value>) -> Result<(), DebugError> {
        self.log_kind(Prefix::Finish, message, vars)
    }

    /// Log the redirect, then either intercept it or hand it to the host.
    pub fn redirect(&mut self, href: &str, status: u16) -> Result<Outcome, DebugError> {
        self.log_kind(
            Prefix::Redirect,
            &format!("Redirect [{}] to {}", status, href),
            Some(json!({ "href": href, "status": status })),
        )?;
        if self.table.contains(Level::FinishRedirect, ServiceName::InterceptRedirect) {
            let preamble = self
                .state
                .redirect_preamble
                .clone()
                .unwrap_or_else(|| crate::services::html::continue_link(href, status));
            return Ok(Outcome::Intercepted { preamble });
        }
        if let Some(close) = self.on_redirect.as_mut() {
            close();
        }
        self.flush()?;
        Ok(Outcome::Redirect {
            location: href.to_string(),
            status,
        })
    }

    /// Log at the fatal level with a backtrace, then decide how to stop.
    pub fn fatal(&mut self, message: &str, vars: Option<Value>) -> Result<Outcome, DebugError> {
        self.log_fatal(message, vars.clone())?;
        Ok(self.exit_outcome(message, vars.as_ref()))
    }

    fn log_fatal(&mut self, message: &str, vars: Option<Value>) -> Result<(), DebugError> {
        if self.table.is_empty_at(Level::FinishFatal) {
            return Ok(());
        }
        let mut entry = Entry::new(Prefix::Fatal, message, vars);
        entry.backtrace = Some(Backtrace::force_capture().to_string());
        self.dispatch(entry)?;
        self.flush()
    }

    fn exit_outcome(&mut self, message: &str, vars: Option<&Value>) -> Outcome {
        match self.on_exit.as_mut() {
            Some(callback) => callback(message, vars),
            None => Outcome::Exit(1),
        }
    }

    /// Handle an error the host reports.
    ///
    /// Kinds outside the reporting mask, or any report while no profile has
    /// installed the logger as handler, pass through untouched.
    pub fn handle_error(&mut self, report: &ErrorReport) -> Result<Outcome, DebugError> {
        if !self.errors.installed || !self.errors.reporting.intersects(report.kind) {
            return Ok(Outcome::Continue);
        }
        let message = format!(
            "{}: {} in {}:{}",
            report.kind.kind_name(),
            report.message,
            report.file,
            report.line
        );
        self.log_kind(Prefix::Important, &message, None)?;
        if self.errors.ignore.intersects(report.kind) {
            return Ok(Outcome::Continue);
        }
        // Stand down before the fatal path so a failure in it is not re-entered.
        self.errors.installed = false;
        self.fatal(&message, None)
    }

    /// Log a panic. Returns `None` when it should propagate to the previous
    /// hook, otherwise the exit outcome.
    pub fn handle_panic(&mut self, message: &str, location: Option<Value>) -> Option<Outcome> {
        let text = format!("Panic: {}", message);
        // The panic is already in flight; a failing sink has nowhere to report.
        let _ = self.log_fatal(&text, location.clone());
        self.errors.installed = false;
        if self.errors.rethrow {
            None
        } else {
            Some(self.exit_outcome(&text, location.as_ref()))
        }
    }

    // Store access

    pub fn store(&self) -> &[Entry] {
        &self.state.store
    }

    pub fn take_store(&mut self) -> Vec<Entry> {
        std::mem::take(&mut self.state.store)
    }

    pub fn clear_store(&mut self) {
        self.state.store.clear();
    }

    pub fn render_html(&self) -> String {
        self.state.render_store()
    }

    /// One JSON entry per line.
    pub fn export_store(&self, out: &mut dyn Write) -> Result<(), DebugError> {
        for entry in &self.state.store {
            serde_json::to_writer(&mut *out, entry)?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), DebugError> {
        self.registry.flush()?;
        self.state.flush()
    }
}
