//! Named request/stack/independent loggers with runtime-adjustable levels.
//!
//! Each named logger is a tracing target. Events are routed into
//! `<log_dir>/<file>` by a per-layer filter that consults [`LogLevels`],
//! so `PUT /logs/level` takes effect on the next event without rebuilding
//! the subscriber.

use crate::utils::error::{Result, ServiceError};
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::filter::dynamic_filter_fn;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

pub const REQUEST_LOGGER: &str = "request-logger";
pub const STACK_LOGGER: &str = "stack-logger";
pub const INDEPENDENT_LOGGER: &str = "independent-logger";

const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S%.3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Accepts the level names used by the `/logs/level` endpoint, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Some(LogLevel::Debug),
            "INFO" => Some(LogLevel::Info),
            "WARNING" | "WARN" => Some(LogLevel::Warning),
            "ERROR" => Some(LogLevel::Error),
            "CRITICAL" | "FATAL" => Some(LogLevel::Critical),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    /// Whether an event at `level` passes a logger configured at `self`.
    pub fn allows(self, level: &Level) -> bool {
        let event_level = match *level {
            Level::TRACE | Level::DEBUG => LogLevel::Debug,
            Level::INFO => LogLevel::Info,
            Level::WARN => LogLevel::Warning,
            Level::ERROR => LogLevel::Error,
        };
        // TRACE 比 DEBUG 更細，只有在 DEBUG 門檻下也不輸出
        *level != Level::TRACE && event_level >= self
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared, mutable level table for the named loggers.
#[derive(Debug, Clone)]
pub struct LogLevels {
    levels: Arc<RwLock<HashMap<String, LogLevel>>>,
}

impl LogLevels {
    pub fn new() -> Self {
        let mut levels = HashMap::new();
        levels.insert(REQUEST_LOGGER.to_string(), LogLevel::Info);
        levels.insert(STACK_LOGGER.to_string(), LogLevel::Info);
        levels.insert(INDEPENDENT_LOGGER.to_string(), LogLevel::Debug);
        Self {
            levels: Arc::new(RwLock::new(levels)),
        }
    }

    pub fn get(&self, logger_name: &str) -> Option<LogLevel> {
        let levels = self.levels.read().unwrap_or_else(PoisonError::into_inner);
        levels.get(logger_name).copied()
    }

    /// Returns the applied level, or `None` for an unknown logger or level name.
    pub fn set(&self, logger_name: &str, level_name: &str) -> Option<LogLevel> {
        let level = LogLevel::parse(level_name)?;
        let mut levels = self.levels.write().unwrap_or_else(PoisonError::into_inner);
        let slot = levels.get_mut(logger_name)?;
        *slot = level;
        Some(level)
    }

    pub fn enabled(&self, logger_name: &str, level: &Level) -> bool {
        self.get(logger_name)
            .map(|threshold| threshold.allows(level))
            .unwrap_or(false)
    }
}

impl Default for LogLevels {
    fn default() -> Self {
        Self::new()
    }
}

/// `dd-mm-YYYY HH:MM:SS.mmm LEVEL: message | request #n`
pub fn format_line(
    timestamp: &DateTime<Local>,
    level: &Level,
    message: &str,
    request_number: Option<u64>,
) -> String {
    let level_name = match *level {
        Level::WARN => "WARNING",
        Level::ERROR => "ERROR",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    };
    let mut line = format!(
        "{} {}: {}",
        timestamp.format(TIMESTAMP_FORMAT),
        level_name,
        message
    );
    if let Some(number) = request_number {
        line.push_str(&format!(" | request #{}", number));
    }
    line
}

#[derive(Default)]
struct RequestFieldVisitor {
    message: String,
    request_number: Option<u64>,
}

impl Visit for RequestFieldVisitor {
    fn record_u64(&mut self, field: &Field, value: u64) {
        if field.name() == "request_number" {
            self.request_number = Some(value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        if field.name() == "request_number" {
            self.request_number = u64::try_from(value).ok();
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}

pub struct RequestFormatter;

impl<S, N> FormatEvent<S, N> for RequestFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = RequestFieldVisitor::default();
        event.record(&mut visitor);
        let line = format_line(
            &Local::now(),
            event.metadata().level(),
            &visitor.message,
            visitor.request_number,
        );
        writeln!(writer, "{}", line)
    }
}

fn named_layer<W>(
    writer: W,
    logger_name: &'static str,
    levels: &LogLevels,
) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let levels = levels.clone();
    tracing_subscriber::fmt::layer()
        .event_format(RequestFormatter)
        .with_ansi(false)
        .with_writer(writer)
        // 動態過濾：每個事件都重新判斷，不快取 callsite interest
        .with_filter(dynamic_filter_fn(
            move |metadata: &Metadata<'_>, _cx: &Context<'_, Registry>| {
                metadata.target() == logger_name
                    && levels.enabled(logger_name, metadata.level())
            },
        ))
        .boxed()
}

fn open_log_file(log_dir: &Path, file_name: &str) -> Result<Mutex<std::fs::File>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(file_name))?;
    Ok(Mutex::new(file))
}

/// Installs the global subscriber: operational logs on stdout plus the three
/// named file loggers (the request logger is mirrored to stdout).
pub fn init_service_logger(log_dir: &str, verbose: bool, levels: &LogLevels) -> Result<()> {
    let log_dir = Path::new(log_dir);
    std::fs::create_dir_all(log_dir)?;

    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("small_calc=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("small_calc=info"))
    };

    let layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = vec![
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_filter(filter)
            .boxed(),
        named_layer(open_log_file(log_dir, "requests.log")?, REQUEST_LOGGER, levels),
        named_layer(std::io::stdout, REQUEST_LOGGER, levels),
        named_layer(open_log_file(log_dir, "stack.log")?, STACK_LOGGER, levels),
        named_layer(
            open_log_file(log_dir, "independent.log")?,
            INDEPENDENT_LOGGER,
            levels,
        ),
    ];

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| ServiceError::ConfigError {
            message: format!("Failed to install tracing subscriber: {}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_levels() {
        let levels = LogLevels::new();
        assert_eq!(levels.get(REQUEST_LOGGER), Some(LogLevel::Info));
        assert_eq!(levels.get(STACK_LOGGER), Some(LogLevel::Info));
        assert_eq!(levels.get(INDEPENDENT_LOGGER), Some(LogLevel::Debug));
        assert_eq!(levels.get("unknown-logger"), None);
    }

    #[test]
    fn test_set_level_changes_filtering() {
        let levels = LogLevels::new();
        assert!(!levels.enabled(STACK_LOGGER, &Level::DEBUG));

        assert_eq!(levels.set(STACK_LOGGER, "debug"), Some(LogLevel::Debug));
        assert!(levels.enabled(STACK_LOGGER, &Level::DEBUG));

        assert_eq!(levels.set(STACK_LOGGER, "warn"), Some(LogLevel::Warning));
        assert!(!levels.enabled(STACK_LOGGER, &Level::INFO));
        assert!(levels.enabled(STACK_LOGGER, &Level::ERROR));
    }

    #[test]
    fn test_set_rejects_unknown_logger_or_level() {
        let levels = LogLevels::new();
        assert_eq!(levels.set("other-logger", "INFO"), None);
        assert_eq!(levels.set(STACK_LOGGER, "LOUD"), None);
        assert_eq!(levels.get(STACK_LOGGER), Some(LogLevel::Info));
    }

    #[test]
    fn test_critical_silences_errors() {
        assert!(!LogLevel::Critical.allows(&Level::ERROR));
        assert!(LogLevel::Error.allows(&Level::ERROR));
        assert!(!LogLevel::Debug.allows(&Level::TRACE));
    }

    #[test]
    fn test_format_line() {
        let timestamp = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        let line = format_line(&timestamp, &Level::INFO, "Stack size is 3", Some(12));
        assert_eq!(line, "07-03-2024 09:05:01.000 INFO: Stack size is 3 | request #12");

        let line = format_line(&timestamp, &Level::WARN, "careful", None);
        assert_eq!(line, "07-03-2024 09:05:01.000 WARNING: careful");
    }
}
