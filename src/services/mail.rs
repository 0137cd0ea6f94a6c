//! Mails the rendered store when a finish level fires.

use crate::core::dispatch::ServiceName;
use crate::core::entry::Entry;
use crate::core::error::DebugError;
use crate::core::output::compact_line;
use crate::services::{Service, ServiceState};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

pub const DEFAULT_SUBJECT: &str = "[artful-debug]";

pub trait Mailer: Send {
    fn send(&mut self, subject: &str, html_body: &str) -> Result<(), DebugError>;
}

/// Hands messages to a local `sendmail -t`.
#[derive(Debug, Clone)]
pub struct SendmailMailer {
    pub to: String,
    pub program: PathBuf,
}

impl SendmailMailer {
    pub fn new(to: impl Into<String>) -> Self {
        SendmailMailer {
            to: to.into(),
            program: PathBuf::from("sendmail"),
        }
    }

    pub fn message(&self, subject: &str, html_body: &str) -> String {
        format!(
            "To: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/html; charset=utf-8\r\n\r\n{}\r\n",
            self.to, subject, html_body
        )
    }
}

impl Mailer for SendmailMailer {
    fn send(&mut self, subject: &str, html_body: &str) -> Result<(), DebugError> {
        let mut child = Command::new(&self.program)
            .arg("-t")
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| DebugError::MailError(format!("{}: {}", self.program.display(), e)))?;
        if let Some(stdin) = child.stdin.as_mut() {
            stdin.write_all(self.message(subject, html_body).as_bytes())?;
        }
        let status = child.wait()?;
        if !status.success() {
            return Err(DebugError::MailError(format!(
                "{} exited with {}",
                self.program.display(),
                status
            )));
        }
        Ok(())
    }
}

/// No-op until a mailer is attached.
pub struct MailService {
    mailer: Option<Box<dyn Mailer>>,
    subject: String,
}

impl Default for MailService {
    fn default() -> Self {
        MailService {
            mailer: None,
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }
}

impl MailService {
    pub fn new(mailer: Box<dyn Mailer>, subject: impl Into<String>) -> Self {
        MailService {
            mailer: Some(mailer),
            subject: subject.into(),
        }
    }
}

impl Service for MailService {
    fn name(&self) -> ServiceName {
        ServiceName::Mail
    }

    fn handle(&mut self, entry: &Entry, state: &mut ServiceState) -> Result<(), DebugError> {
        let Some(mailer) = self.mailer.as_mut() else {
            return Ok(());
        };
        let subject = format!("{} {}", self.subject, compact_line(&entry.message, 60));
        mailer.send(&subject, &state.render_store())
    }
}
