//! Event log export to JSON and plain text.
//!
//! The exporter only produces bytes and a suggested file name; how they reach
//! the user is up to the host.

use crate::log::{EventLog, LogEntry};
use chrono::{DateTime, Local, Utc};
use derive_more::{Display, Error};
use serde_json::Value;
use tracing::{error, info, instrument};

/// Target export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum ExportFormat {
    /// Pretty-printed JSON array.
    #[strum(serialize = "JSON")]
    Json,
    /// One line per entry.
    #[strum(serialize = "TXT")]
    Text,
}

impl ExportFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }

    /// MIME type of the produced bytes.
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Text => "text/plain",
        }
    }
}

/// Rendered export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogExport {
    /// Suggested file name.
    pub file_name: String,
    /// MIME type.
    pub mime_type: &'static str,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Export error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Export error: {} at {}:{}", message, file, line)]
pub struct ExportError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ExportError {
    /// Creates a new export error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        error!(error_message = %message, "Export error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("JSON serialization failed: {}", err))
    }
}

/// Renders `log` in `format`, oldest entry first.
#[instrument(skip(log), fields(entries = log.len()))]
pub fn export(
    log: &EventLog,
    format: ExportFormat,
    now: DateTime<Utc>,
) -> Result<LogExport, ExportError> {
    let bytes = match format {
        ExportFormat::Json => serde_json::to_vec_pretty(log.chronological())?,
        ExportFormat::Text => render_text(log).into_bytes(),
    };

    let file_name = format!(
        "tic-tac-toe-logs-{}.{}",
        now.format("%Y-%m-%dT%H-%M-%S%.3fZ"),
        format.extension()
    );

    info!(%format, file_name = %file_name, size = bytes.len(), "Log exported");
    Ok(LogExport {
        file_name,
        mime_type: format.mime_type(),
        bytes,
    })
}

/// Plain-text rendering, one line per entry in chronological order.
pub fn render_text(log: &EventLog) -> String {
    log.chronological()
        .iter()
        .map(render_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// `<local time> - <EVENT>: key: value, key: value`
pub fn render_line(entry: &LogEntry) -> String {
    let timestamp = entry
        .timestamp()
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S");

    let details = entry
        .details()
        .iter()
        .map(|(key, value)| format!("{}: {}", key, render_value(value)))
        .collect::<Vec<_>>()
        .join(", ");

    if details.is_empty() {
        format!("{} - {}", timestamp, entry.event())
    } else {
        format!("{} - {}: {}", timestamp, entry.event(), details)
    }
}

/// Strings raw, scalars as-is, everything else as inline JSON.
fn render_value(value: &Value) -> String {
    match value {
        // Line breaks would split one entry across lines.
        Value::String(s) => s.replace('\r', "\\r").replace('\n', "\\n"),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Splits a text export back into its entry lines.
pub fn parse_text_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|line| !line.trim().is_empty()).collect()
}
