use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::enrich::enrich;
use crate::event::{Event, Level};

/// A view over the process-wide pipeline: a dotted name plus bound
/// context fields merged into every event it produces. Cheap to clone
/// and safe to share across threads; the sink set behind it is fixed
/// for the process lifetime.
#[derive(Clone)]
pub struct Logger {
    name: String,
    context: Map<String, Value>,
    dispatcher: Arc<Dispatcher>,
    config: Arc<Config>,
}

impl Logger {
    pub(crate) fn root(dispatcher: Arc<Dispatcher>, config: Arc<Config>) -> Self {
        Self {
            name: "root".to_string(),
            context: Map::new(),
            dispatcher,
            config,
        }
    }

    /// Derives a view with a different logger name. The name is
    /// informational only; it routes nothing.
    pub fn named(&self, name: impl Into<String>) -> Logger {
        Logger {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Adds a default field to every event from the returned view.
    /// Additive: prior bindings stay, a rebound key takes the new
    /// value, call-site fields still win at log time.
    pub fn bind(&self, key: impl Into<String>, value: impl Into<Value>) -> Logger {
        let mut context = self.context.clone();
        context.insert(key.into(), value.into());
        Logger {
            context,
            ..self.clone()
        }
    }

    pub fn debug(&self, template: &str, fields: &[(&str, Value)]) {
        self.log(Level::Debug, template, fields, None);
    }

    pub fn info(&self, template: &str, fields: &[(&str, Value)]) {
        self.log(Level::Info, template, fields, None);
    }

    pub fn warning(&self, template: &str, fields: &[(&str, Value)]) {
        self.log(Level::Warning, template, fields, None);
    }

    pub fn error(&self, template: &str, fields: &[(&str, Value)]) {
        self.log(Level::Error, template, fields, None);
    }

    pub fn critical(&self, template: &str, fields: &[(&str, Value)]) {
        self.log(Level::Critical, template, fields, None);
    }

    /// Like `error`, with the report chain attached as trailing trace
    /// lines on the text sinks.
    pub fn error_with(&self, template: &str, fields: &[(&str, Value)], err: &eyre::Report) {
        self.log(Level::Error, template, fields, Some(render_report(err)));
    }

    pub fn critical_with(&self, template: &str, fields: &[(&str, Value)], err: &eyre::Report) {
        self.log(Level::Critical, template, fields, Some(render_report(err)));
    }

    pub fn flush(&self) {
        self.dispatcher.flush();
    }

    // Total: enrichment degrades instead of failing and the dispatcher
    // absorbs delivery errors, so nothing escapes to the call site.
    fn log(&self, level: Level, template: &str, fields: &[(&str, Value)], exc_text: Option<String>) {
        let event = Event {
            template: template.to_string(),
            level,
            logger_name: self.name.clone(),
            fields: fields
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect(),
            exc_text,
        };

        let record = enrich(event, &self.context, &self.config);
        self.dispatcher.dispatch(&record);
    }
}

fn render_report(err: &eyre::Report) -> String {
    let mut out = err.to_string();
    for cause in err.chain().skip(1) {
        out.push_str("\nCaused by: ");
        out.push_str(&cause.to_string());
    }
    out
}
