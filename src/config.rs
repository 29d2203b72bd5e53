use std::path::PathBuf;
use std::sync::Arc;

use crate::dispatch::{Dispatcher, SinkConfig};
use crate::event::Level;
use crate::formatters::{ColorFormatter, JsonFormatter, PlainFormatter};
use crate::logger::Logger;
use crate::sinks::{ConsoleSink, ConsoleStream, UdpSink, WatchedFileSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

/// Process-wide enrichment settings, fixed once `build` runs.
#[derive(Debug, Clone)]
pub struct Config {
    pub timestamp_format: String,
    pub use_utc: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
            use_utc: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Wires the sink set. Each destination comes with its fixed formatter:
/// colored text on the console, plain text in the file, JSON on the
/// wire. `build` validates everything up front; a sink that cannot be
/// wired fails initialization rather than degrading later.
pub struct Builder {
    config: Config,
    color: ColorChoice,
    console: Option<(ConsoleStream, Level)>,
    file: Option<(PathBuf, Level)>,
    remote: Option<(String, u16, Level)>,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            config: Config::new(),
            color: ColorChoice::Auto,
            console: None,
            file: None,
            remote: None,
        }
    }

    pub fn with_console(self, stream: ConsoleStream, min_level: Level) -> Self {
        Self {
            console: Some((stream, min_level)),
            ..self
        }
    }

    pub fn with_file(self, path: impl Into<PathBuf>, min_level: Level) -> Self {
        Self {
            file: Some((path.into(), min_level)),
            ..self
        }
    }

    pub fn with_remote(self, host: impl Into<String>, port: u16, min_level: Level) -> Self {
        Self {
            remote: Some((host.into(), port, min_level)),
            ..self
        }
    }

    pub fn with_timestamp_format(self, format: impl Into<String>) -> Self {
        Self {
            config: Config {
                timestamp_format: format.into(),
                ..self.config
            },
            ..self
        }
    }

    pub fn with_utc(self, use_utc: bool) -> Self {
        Self {
            config: Config {
                use_utc,
                ..self.config
            },
            ..self
        }
    }

    pub fn with_color(self, color: ColorChoice) -> Self {
        Self { color, ..self }
    }

    pub fn build(self) -> eyre::Result<Logger> {
        let mut sinks = Vec::new();

        if let Some((stream, min_level)) = self.console {
            let color = match self.color {
                ColorChoice::Always => true,
                ColorChoice::Never => false,
                ColorChoice::Auto => (yansi::Condition::TTY_AND_COLOR.0)(),
            };
            sinks.push(SinkConfig::new(
                Box::new(ColorFormatter::new(color)),
                Box::new(ConsoleSink::new(stream)),
                min_level,
            ));
        }

        if let Some((path, min_level)) = self.file {
            sinks.push(SinkConfig::new(
                Box::new(PlainFormatter::new()),
                Box::new(WatchedFileSink::new(path)?),
                min_level,
            ));
        }

        if let Some((host, port, min_level)) = self.remote {
            sinks.push(SinkConfig::new(
                Box::new(JsonFormatter::new()),
                Box::new(UdpSink::new(&host, port)?),
                min_level,
            ));
        }

        if sinks.is_empty() {
            return Err(eyre::eyre!("No sinks configured"));
        }

        Ok(Logger::root(
            Arc::new(Dispatcher::new(sinks)),
            Arc::new(self.config),
        ))
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_format() {
        let config = Config::new();
        assert_eq!(config.timestamp_format, "%Y-%m-%d %H:%M:%S");
        assert!(!config.use_utc);
    }

    #[test]
    fn build_without_sinks_is_a_configuration_error() {
        assert!(Builder::new().build().is_err());
    }

    #[test]
    fn build_with_unopenable_file_is_fatal() {
        let result = Builder::new()
            .with_file("/nonexistent-dir/sub/test.log", Level::Debug)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn build_with_unresolvable_remote_is_fatal() {
        let result = Builder::new()
            .with_remote("name.invalid.", 514, Level::Info)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn build_wires_a_file_logger() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Builder::new()
            .with_file(dir.path().join("test.log"), Level::Debug)
            .build()
            .unwrap();

        logger.info("configured", &[]);
        logger.flush();

        let contents = std::fs::read_to_string(dir.path().join("test.log")).unwrap();
        assert!(contents.contains("configured"));
    }
}
