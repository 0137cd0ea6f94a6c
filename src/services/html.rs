//! Services that shape an HTML response: permission, redirect interception
//! and the final rendered dump.

use crate::core::dispatch::ServiceName;
use crate::core::entry::Entry;
use crate::core::error::DebugError;
use crate::core::html::escape;
use crate::services::{Service, ServiceState};
use std::io::Write;

/// Marks the response as able to carry HTML.
pub struct AllowHtmlService;

impl Service for AllowHtmlService {
    fn name(&self) -> ServiceName {
        ServiceName::AllowHtml
    }

    fn handle(&mut self, _entry: &Entry, state: &mut ServiceState) -> Result<(), DebugError> {
        state.html_allowed = true;
        Ok(())
    }
}

/// Replaces a redirect with a link the reader can follow after inspecting
/// the log. Reads `href` and `status` from the redirect entry's vars.
pub struct InterceptRedirectService;

pub fn continue_link(href: &str, status: u16) -> String {
    let href = escape(href);
    format!(
        "Redirect ({}) intercepted: <a href=\"{}\">continue to {}</a>",
        status, href, href
    )
}

impl Service for InterceptRedirectService {
    fn name(&self) -> ServiceName {
        ServiceName::InterceptRedirect
    }

    fn handle(&mut self, entry: &Entry, state: &mut ServiceState) -> Result<(), DebugError> {
        let Some(vars) = &entry.vars else {
            return Ok(());
        };
        if let Some(href) = vars.get("href").and_then(|v| v.as_str()) {
            let status = vars
                .get("status")
                .and_then(|v| v.as_u64())
                .and_then(|s| u16::try_from(s).ok())
                .unwrap_or(303);
            state.redirect_preamble = Some(continue_link(href, status));
        }
        Ok(())
    }
}

/// Writes the rendered store to stdout. Silent unless HTML is allowed.
pub struct OutputHtmlService;

impl Service for OutputHtmlService {
    fn name(&self) -> ServiceName {
        ServiceName::OutputHtml
    }

    fn handle(&mut self, _entry: &Entry, state: &mut ServiceState) -> Result<(), DebugError> {
        if !state.html_allowed {
            return Ok(());
        }
        let html = state.render_store();
        state.stdout.write_all(html.as_bytes())?;
        Ok(())
    }
}
