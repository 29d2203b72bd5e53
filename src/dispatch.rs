use crate::event::{EnrichedRecord, Level};
use crate::{LogFormatter, LogSink};

/// One registered destination: its formatter, its delivery handle and
/// the lowest level it accepts. Built once at init, immutable after.
pub struct SinkConfig {
    formatter: Box<dyn LogFormatter>,
    sink: Box<dyn LogSink>,
    min_level: Level,
}

impl SinkConfig {
    pub fn new(formatter: Box<dyn LogFormatter>, sink: Box<dyn LogSink>, min_level: Level) -> Self {
        Self {
            formatter,
            sink,
            min_level,
        }
    }
}

pub struct Dispatcher {
    sinks: Vec<SinkConfig>,
}

impl Dispatcher {
    pub fn new(sinks: Vec<SinkConfig>) -> Self {
        Self { sinks }
    }

    /// Fans the record out to every sink at or above its threshold,
    /// formatting per sink. A failing sink is reported on stderr and
    /// skipped; the remaining sinks still get the record.
    pub fn dispatch(&self, record: &EnrichedRecord) {
        for entry in &self.sinks {
            if record.level < entry.min_level {
                continue;
            }

            let rendered = entry.formatter.format(record);
            if let Err(err) = entry.sink.write_log(&rendered) {
                eprintln!("fanlog: dropped record for one sink: {:#}", err);
            }
        }
    }

    pub fn flush(&self) {
        for entry in &self.sinks {
            entry.sink.flush();
        }
    }
}
