use serde_json::Value;
use yansi::Paint;

use crate::event::{EnrichedRecord, Level};
use crate::LogFormatter;

fn append_exc_text(mut line: String, record: &EnrichedRecord) -> String {
    if let Some(exc_text) = &record.exc_text {
        // Exactly one newline between the main line and the trace.
        if !line.ends_with('\n') {
            line.push('\n');
        }
        line.push_str(exc_text);
    }
    line
}

/// The on-disk line format: UTC with millisecond resolution, then
/// logger name, level and the interpolated message.
pub struct PlainFormatter {}

impl PlainFormatter {
    pub fn new() -> Self {
        Self {}
    }
}

impl LogFormatter for PlainFormatter {
    fn format(&self, record: &EnrichedRecord) -> String {
        let line = format!(
            "{} - {} - {} - {}",
            record.captured_at.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            record.logger_name,
            record.level,
            record.message,
        );
        append_exc_text(line, record)
    }
}

/// Console rendering of the same logical fields, styled per severity.
/// Styling never changes the field values themselves.
pub struct ColorFormatter {
    color: bool,
}

impl ColorFormatter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint_timestamp(&self, timestamp: &str) -> String {
        if self.color {
            timestamp.dim().to_string()
        } else {
            timestamp.to_string()
        }
    }

    fn paint_level(&self, level: Level) -> String {
        if !self.color {
            return level.as_str().to_string();
        }

        match level {
            Level::Debug => level.as_str().blue().to_string(),
            Level::Info => level.as_str().green().to_string(),
            Level::Warning => level.as_str().yellow().to_string(),
            Level::Error => level.as_str().red().to_string(),
            Level::Critical => level.as_str().red().bold().to_string(),
        }
    }
}

impl LogFormatter for ColorFormatter {
    fn format(&self, record: &EnrichedRecord) -> String {
        let line = format!(
            "{} - {} - {} - {}",
            self.paint_timestamp(&record.timestamp),
            record.logger_name,
            self.paint_level(record.level),
            record.message,
        );
        append_exc_text(line, record)
    }
}

/// One flat JSON object per record, containing every enriched field.
/// The capture instant and exception text are carriers for the other
/// formatters and stay out of the payload.
pub struct JsonFormatter {}

impl JsonFormatter {
    pub fn new() -> Self {
        Self {}
    }
}

impl LogFormatter for JsonFormatter {
    fn format(&self, record: &EnrichedRecord) -> String {
        Value::Object(record.fields.clone()).to_string()
    }
}
