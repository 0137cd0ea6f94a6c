//! Collapsible HTML viewer over stored entries.
//!
//! Bracketed regions become nested `<ol>` lists. Regions still open when the
//! entries run out are closed at the end; closes without an open region are
//! rendered in place without touching the nesting.

use crate::core::assets::{VIEWER_CSS, VIEWER_JS};
use crate::core::entry::{Bracket, Entry};
use crate::core::level::Prefix;
use crate::core::output::compact_line;
use crate::core::redact::redact;
use serde_json::Value;
use std::fmt::Write as _;

pub const DEFAULT_COLLAPSE_BYTES: usize = 10 * 1024;

#[derive(Debug, Clone)]
pub struct HtmlOptions {
    /// Var dumps whose JSON is larger than this are hidden behind "show more".
    pub collapse_bytes: usize,
    pub redact: bool,
    /// Inline the viewer stylesheet and script.
    pub include_assets: bool,
    /// Raw HTML placed above the log, e.g. an intercepted redirect link.
    pub preamble: Option<String>,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        HtmlOptions {
            collapse_bytes: DEFAULT_COLLAPSE_BYTES,
            redact: true,
            include_assets: true,
            preamble: None,
        }
    }
}

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub fn render_html(entries: &[Entry], options: &HtmlOptions) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"artful-debug\">\n");
    if options.include_assets {
        let _ = writeln!(html, "<style>{}</style>", VIEWER_CSS);
    }
    if let Some(preamble) = &options.preamble {
        let _ = writeln!(html, "<div class=\"preamble\">{}</div>", preamble);
    }
    html.push_str("<ol>\n");

    let mut open = 0usize;
    for entry in entries {
        match entry.bracket {
            Bracket::Open => {
                render_item(&mut html, entry, options, true);
                html.push_str("<ol>\n");
                open += 1;
            }
            Bracket::Close => {
                if open > 0 {
                    html.push_str("</ol></li>\n");
                    open -= 1;
                }
                render_item(&mut html, entry, options, false);
                html.push_str("</li>\n");
            }
            Bracket::None => {
                render_item(&mut html, entry, options, false);
                html.push_str("</li>\n");
            }
        }
    }
    for _ in 0..open {
        html.push_str("</ol></li>\n");
    }

    html.push_str("</ol>\n");
    if options.include_assets {
        let _ = writeln!(html, "<script>{}</script>", VIEWER_JS);
    }
    html.push_str("</div>\n");
    html
}

/// Opens the `<li>` and writes its content; the caller closes it.
fn render_item(html: &mut String, entry: &Entry, options: &HtmlOptions, region: bool) {
    let mut class = format!("level-{}", entry.level.as_str());
    if entry.is_important() {
        class.push_str(" important");
    }
    if region {
        class.push_str(" region");
    }
    let _ = write!(
        html,
        "<li class=\"{}\" id=\"e-{}\"><span class=\"t\">{:0.3}</span><span class=\"msg\">",
        class, entry.id, entry.elapsed_secs
    );
    if entry.prefix != Prefix::None {
        html.push_str(&escape(entry.prefix.marker()));
        html.push(' ');
    }
    html.push_str(&escape(&entry.message));
    html.push_str("</span>");

    if let Some(vars) = &entry.vars {
        let vars = if options.redact { redact(vars) } else { vars.clone() };
        render_vars_block(html, &vars, options.collapse_bytes);
    }
    if let Some(backtrace) = &entry.backtrace {
        let _ = write!(html, "<pre class=\"backtrace\">{}</pre>", escape(backtrace));
    }
}

fn render_vars_block(html: &mut String, vars: &Value, collapse_bytes: usize) {
    let json = vars.to_string();
    html.push_str("<div class=\"vars\">");
    if json.len() > collapse_bytes {
        let _ = write!(
            html,
            "<div class=\"more\">{} <span class=\"toggle\">show more</span><div class=\"body\">",
            escape(&compact_line(&json, 80))
        );
        render_value(html, vars);
        html.push_str("</div></div>");
    } else {
        render_value(html, vars);
    }
    html.push_str("</div>");
}

/// Recursive pretty-printer for a vars payload.
pub fn render_value(html: &mut String, value: &Value) {
    match value {
        Value::Object(map) => {
            html.push_str("<dl>");
            for (key, val) in map {
                let _ = write!(html, "<dt>{}</dt><dd>", escape(key));
                render_value(html, val);
                html.push_str("</dd>");
            }
            html.push_str("</dl>");
        }
        Value::Array(items) => {
            html.push_str("<ol start=\"0\">");
            for item in items {
                html.push_str("<li>");
                render_value(html, item);
                html.push_str("</li>");
            }
            html.push_str("</ol>");
        }
        Value::String(s) => {
            let _ = write!(html, "<span class=\"str\">&quot;{}&quot;</span>", escape(s));
        }
        other => {
            let _ = write!(html, "<span class=\"scalar\">{}</span>", other);
        }
    }
}
