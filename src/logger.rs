//! In-process logging for vpnwarden.
//!
//! Entries are kept in a bounded ring buffer that the dashboard renders as
//! its activity panel. Outside the TUI (one-shot CLI commands) warnings and
//! errors are echoed to stderr as well.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::SystemTime;

use crate::constants;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
}

impl LogLevel {
    /// Fixed-width label used in formatted lines.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO ",
            Self::Warning => "WARN ",
            Self::Error => "ERROR",
        }
    }

    /// Colour of the level label in the activity panel.
    pub const fn color(self) -> ratatui::style::Color {
        match self {
            Self::Debug => crate::theme::TEXT_SECONDARY,
            Self::Info => crate::theme::ACCENT_PRIMARY,
            Self::Warning => crate::theme::WARNING,
            Self::Error => crate::theme::ERROR,
        }
    }
}

/// A single log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: SystemTime,
    pub level: LogLevel,
    pub category: String,
    pub message: String,
}

impl LogEntry {
    /// `[HH:MM:SS] [LEVEL] CATEGORY: message`
    pub fn format(&self) -> String {
        format!(
            "[{}] [{}] {}: {}",
            crate::utils::format_system_time_local(self.timestamp),
            self.level.prefix(),
            self.category,
            self.message
        )
    }
}

struct Logger {
    entries: VecDeque<LogEntry>,
    max_entries: usize,
    min_level: LogLevel,
}

impl Logger {
    fn new() -> Self {
        let max = constants::DEFAULT_MAX_LOG_ENTRIES;
        Self {
            entries: VecDeque::with_capacity(max),
            max_entries: max,
            min_level: LogLevel::Info,
        }
    }

    fn push(&mut self, entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }
        self.entries.push_back(entry);
        self.trim();
    }

    fn trim(&mut self) {
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    fn tail(&self, count: usize) -> Vec<LogEntry> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(skip).cloned().collect()
    }
}

static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

/// Whether warnings and errors are mirrored to stderr.
static ECHO_STDERR: AtomicBool = AtomicBool::new(false);

fn get_logger() -> &'static Mutex<Logger> {
    LOGGER.get_or_init(|| Mutex::new(Logger::new()))
}

/// Log a message with the specified level and category
pub fn log(level: LogLevel, category: &str, message: impl Into<String>) {
    let entry = LogEntry {
        timestamp: SystemTime::now(),
        level,
        category: category.to_string(),
        message: message.into(),
    };

    if level >= LogLevel::Warning && ECHO_STDERR.load(Ordering::Relaxed) {
        eprintln!("{}", entry.format());
    }

    if let Ok(mut logger) = get_logger().lock() {
        logger.push(entry);
    }
}

/// The newest `count` entries, oldest first.
pub fn tail(count: usize) -> Vec<LogEntry> {
    get_logger()
        .lock()
        .map(|logger| logger.tail(count))
        .unwrap_or_default()
}

/// Apply the level and capacity from user settings.
pub fn configure(log_level: &str, max_entries: usize) {
    if let Ok(mut logger) = get_logger().lock() {
        logger.min_level = parse_log_level(log_level);
        logger.max_entries = max_entries.max(1);
        logger.trim();
    }
}

/// Mirror warnings and errors to stderr (used outside the TUI).
pub fn set_stderr_echo(enabled: bool) {
    ECHO_STDERR.store(enabled, Ordering::Relaxed);
}

/// Parse a log level name (case-insensitive); unknown names map to `Info`.
#[must_use]
pub fn parse_log_level(s: &str) -> LogLevel {
    match s.trim().to_ascii_lowercase().as_str() {
        "debug" => LogLevel::Debug,
        "warning" | "warn" => LogLevel::Warning,
        "error" | "err" => LogLevel::Error,
        _ => LogLevel::Info,
    }
}

#[macro_export]
macro_rules! log_debug {
    ($category:expr, $($arg:tt)*) => {
        $crate::logger::log($crate::logger::LogLevel::Debug, $category, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($category:expr, $($arg:tt)*) => {
        $crate::logger::log($crate::logger::LogLevel::Info, $category, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($category:expr, $($arg:tt)*) => {
        $crate::logger::log($crate::logger::LogLevel::Warning, $category, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($category:expr, $($arg:tt)*) => {
        $crate::logger::log($crate::logger::LogLevel::Error, $category, format!($($arg)*))
    };
}
