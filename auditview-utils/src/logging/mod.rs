//! Logging setup
//!
//! Thin layer over `tracing-subscriber`. Binaries call [`init_logging`] once;
//! libraries either emit `tracing` events directly or go through a named
//! [`Logger`] so that every line carries the component it came from.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log levels accepted on the command line and in config files
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for LogLevel {
    type Err = crate::UtilError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(crate::UtilError::Config(format!("Unknown log level: {other}"))),
        }
    }
}

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub include_location: bool,
    pub include_thread_id: bool,
    pub colored_output: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            include_location: false,
            include_thread_id: false,
            colored_output: true,
        }
    }
}

/// Initialize the global subscriber.
///
/// `RUST_LOG` overrides the configured level. Output goes to stderr so that
/// rendered reports on stdout stay machine-readable.
pub fn init_logging(config: LoggerConfig) -> crate::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::from(config.level).into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(config.include_thread_id)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_ansi(config.colored_output);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| crate::UtilError::Config(format!("Failed to initialize logging: {e}")))?;

    Ok(())
}

/// Named logger that prefixes every event with its component name
#[derive(Debug, Clone)]
pub struct Logger {
    name: String,
    level: LogLevel,
}

impl Logger {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            level: LogLevel::Trace,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.level = level;
    }

    pub const fn level(&self) -> LogLevel {
        self.level
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    pub fn debug(&self, message: &str) {
        if self.is_enabled(LogLevel::Debug) {
            tracing::debug!(component = %self.name, "{message}");
        }
    }

    pub fn info(&self, message: &str) {
        if self.is_enabled(LogLevel::Info) {
            tracing::info!(component = %self.name, "{message}");
        }
    }

    pub fn warn(&self, message: &str) {
        if self.is_enabled(LogLevel::Warn) {
            tracing::warn!(component = %self.name, "{message}");
        }
    }

    pub fn error(&self, message: &str) {
        if self.is_enabled(LogLevel::Error) {
            tracing::error!(component = %self.name, "{message}");
        }
    }
}

/// Get a logger by component name, e.g. `get_logger("auditview.viz")`
pub fn get_logger(name: &str) -> Logger {
    Logger::new(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Error > LogLevel::Warn);
        assert!(LogLevel::Warn > LogLevel::Info);
        assert!(LogLevel::Info > LogLevel::Debug);
        assert!(LogLevel::Debug > LogLevel::Trace);
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("DEBUG".parse::<LogLevel>().ok(), Some(LogLevel::Debug));
        assert_eq!("warning".parse::<LogLevel>().ok(), Some(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_logger_level_filtering() {
        let mut logger = get_logger("auditview.test");
        assert_eq!(logger.name(), "auditview.test");
        logger.set_level(LogLevel::Warn);

        assert!(!logger.is_enabled(LogLevel::Debug));
        assert!(!logger.is_enabled(LogLevel::Info));
        assert!(logger.is_enabled(LogLevel::Warn));
        assert!(logger.is_enabled(LogLevel::Error));
    }
}
