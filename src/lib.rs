mod config;
mod dispatch;
mod enrich;
mod event;
mod formatters;
mod logger;
mod sinks;

pub use config::{Builder, ColorChoice, Config};
pub use event::{EnrichedRecord, Event, Level};
pub use logger::Logger;
pub use sinks::ConsoleStream;

pub trait LogFormatter: Sync + Send {
    fn format(&self, record: &EnrichedRecord) -> String;
}

pub trait LogSink: Sync + Send {
    fn write_log(&self, rendered: &str) -> eyre::Result<()>;
    fn flush(&self);
}
