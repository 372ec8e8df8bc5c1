use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Diagnostic verbosity for the SDK's `log` output.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warning,
    Info,
    Debug,
    Verbose,
}

impl LogLevel {
    pub fn as_level_filter(self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::Off,
            Self::Error => LevelFilter::Error,
            Self::Warning => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Verbose => LevelFilter::Trace,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        level.as_level_filter()
    }
}

/// Sets the process-wide ceiling for log records. Installing a logger is left
/// to the host.
pub fn set_log_level(level: LogLevel) {
    log::set_max_level(level.as_level_filter());
}
