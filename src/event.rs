use core::fmt;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One log call, captured before enrichment. Fields hold only the
/// call-site bindings; bound context is merged in by the enrichment
/// chain.
#[derive(Debug, Clone)]
pub struct Event {
    pub template: String,
    pub level: Level,
    pub logger_name: String,
    pub fields: Map<String, Value>,
    pub exc_text: Option<String>,
}

/// An event after the enrichment chain ran. `fields` carries everything
/// a formatter may render, including `message`, `level`, `timestamp`
/// and `logger_name`; the typed copies exist so formatters never have
/// to re-parse the map. `captured_at` and `exc_text` never appear in
/// JSON output.
#[derive(Debug, Clone)]
pub struct EnrichedRecord {
    pub level: Level,
    pub logger_name: String,
    pub message: String,
    pub timestamp: String,
    pub captured_at: DateTime<Utc>,
    pub exc_text: Option<String>,
    pub fields: Map<String, Value>,
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Substitutes `{identifier}` placeholders from `fields`. `{{` and `}}`
/// escape literal braces; anything else between braces must name a
/// present field. Identifier lookup only, no expression evaluation.
pub(crate) fn interpolate(template: &str, fields: &Map<String, Value>) -> eyre::Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    out.push('{');
                    continue;
                }

                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(k) => key.push(k),
                        None => return Err(eyre::eyre!("Unterminated placeholder {{{}", key)),
                    }
                }

                match fields.get(&key) {
                    Some(value) => out.push_str(&render_value(value)),
                    None => return Err(eyre::eyre!("Unresolved placeholder {{{}}}", key)),
                }
            }
            '}' => {
                // A lone closing brace passes through, `}}` collapses.
                if chars.peek() == Some(&'}') {
                    chars.next();
                }
                out.push('}');
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}
