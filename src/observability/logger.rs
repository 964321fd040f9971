//! Structured operational log
//!
//! One log line = one event, serialized as a single JSON object:
//! timestamp first, then level and event name, then the caller's contextual
//! fields in the order they were given. INFO and WARN go to stdout, ERROR to
//! stderr. Logs are synchronous and unbuffered.

use std::fmt;
use std::io::{self, Write};

use chrono::Utc;

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Normal operations
    Info,
    /// Recoverable issues (not-found, rejected writes)
    Warn,
    /// Operation failures
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Log at INFO level
pub fn info(event: &str, fields: &[(&str, &str)]) {
    emit(Level::Info, event, fields, &mut io::stdout());
}

/// Log at WARN level
pub fn warn(event: &str, fields: &[(&str, &str)]) {
    emit(Level::Warn, event, fields, &mut io::stdout());
}

/// Log at ERROR level
pub fn error(event: &str, fields: &[(&str, &str)]) {
    emit(Level::Error, event, fields, &mut io::stderr());
}

fn emit<W: Write>(level: Level, event: &str, fields: &[(&str, &str)], writer: &mut W) {
    let line = render(level, event, fields);
    // One write_all per event keeps lines intact under concurrent requests
    let _ = writer.write_all(line.as_bytes());
    let _ = writer.flush();
}

/// Render a log event as a single JSON line.
///
/// JSON is assembled by hand so field order follows the call site instead of
/// a map's key ordering.
fn render(level: Level, event: &str, fields: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(128);

    out.push_str("{\"ts\":\"");
    out.push_str(&Utc::now().to_rfc3339());
    out.push_str("\",\"level\":\"");
    out.push_str(level.as_str());
    out.push_str("\",\"event\":\"");
    escape_into(&mut out, event);
    out.push('"');

    for (key, value) in fields {
        out.push_str(",\"");
        escape_into(&mut out, key);
        out.push_str("\":\"");
        escape_into(&mut out, value);
        out.push('"');
    }

    out.push('}');
    out.push('\n');
    out
}

fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
}
