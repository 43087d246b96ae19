//! Console and file logging driven by the configured thresholds.
use std::fs::OpenOptions;
use std::path::Path;

use env_logger::{Builder, Logger, Target, WriteStyle};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::domain::LogLevel;
use crate::services::settings::Settings;

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to open log file")]
    OpenFile(#[source] std::io::Error),
    #[error("failed to install logger")]
    Install(#[source] SetLoggerError),
}

/// Sends each record to the console and the log file, each with its own level.
pub struct DualLogger {
    console: Logger,
    file: Option<Logger>,
}

impl DualLogger {
    /// `RUST_LOG` takes precedence over `console_level` on the console.
    pub fn new(
        console_level: LogLevel,
        file_level: LogLevel,
        log_file: Option<&Path>,
    ) -> Result<Self, LoggingError> {
        let console_filters = std::env::var(env_logger::DEFAULT_FILTER_ENV).ok();
        Self::with_console_filters(
            console_level,
            file_level,
            log_file,
            console_filters.as_deref(),
        )
    }

    /// Like [`DualLogger::new`], with `console_filters` in `RUST_LOG` syntax.
    pub fn with_console_filters(
        console_level: LogLevel,
        file_level: LogLevel,
        log_file: Option<&Path>,
        console_filters: Option<&str>,
    ) -> Result<Self, LoggingError> {
        let mut console = Builder::new();
        console.filter_level(console_level.to_level_filter());
        if let Some(filters) = console_filters {
            console.parse_filters(filters);
        }
        let console = console.build();

        let file = match log_file {
            Some(path) => {
                let handle = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(LoggingError::OpenFile)?;
                Some(
                    Builder::new()
                        .filter_level(file_level.to_level_filter())
                        .write_style(WriteStyle::Never)
                        .target(Target::Pipe(Box::new(handle)))
                        .build(),
                )
            }
            None => None,
        };

        Ok(Self { console, file })
    }

    /// Most verbose level any sink accepts.
    pub fn max_level(&self) -> LevelFilter {
        let console = self.console.filter();
        match &self.file {
            Some(file) => console.max(file.filter()),
            None => console,
        }
    }
}

impl Log for DualLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console.enabled(metadata)
            || self
                .file
                .as_ref()
                .is_some_and(|file| file.enabled(metadata))
    }

    fn log(&self, record: &Record) {
        self.console.log(record);
        if let Some(file) = &self.file {
            file.log(record);
        }
    }

    fn flush(&self) {
        self.console.flush();
        if let Some(file) = &self.file {
            file.flush();
        }
    }
}

/// Install the global logger for `settings`.
pub fn init(settings: &Settings, log_file: Option<&Path>) -> Result<(), LoggingError> {
    let logger = DualLogger::new(
        settings.console_log_level(),
        settings.file_log_level(),
        log_file,
    )?;
    let max_level = logger.max_level();
    log::set_boxed_logger(Box::new(logger)).map_err(LoggingError::Install)?;
    log::set_max_level(max_level);
    Ok(())
}
