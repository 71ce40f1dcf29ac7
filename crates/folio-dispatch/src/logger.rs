//! User-facing log output.
//!
//! The [`Logger`] trait is the leveled, labelled output channel that commands
//! and the dispatcher report through. Every line has a short label ("Source:",
//! "ERROR:") printed right-aligned in a fixed gutter, followed by the message:
//!
//! ```text
//!             Source: /home/me/blog
//!        Destination: /home/me/blog/_site
//!              ERROR: YOUR SITE COULD NOT BE BUILT:
//! ```
//!
//! Developer diagnostics are a separate concern and go through `tracing`.
//!
//! Two implementations ship with the crate:
//!
//! - [`TerminalLogger`]: styled output on stderr, filtered by [`LogLevel`]
//! - [`RecordingLogger`]: keeps every line in memory, for tests and embedding

use std::cell::{Cell, RefCell};
use std::fmt;

use console::{style, Term};

use crate::error::Halt;

/// Width of the right-aligned label gutter.
pub const LABEL_WIDTH: usize = 20;

/// Severity of a log line. Ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Formats a label and message into one output line.
///
/// The label gets a trailing space and is right-aligned to [`LABEL_WIDTH`].
///
/// ```rust
/// use folio_dispatch::format_line;
///
/// assert_eq!(format_line("Source:", "."), "            Source: .");
/// assert_eq!(format_line("", "done"), format!("{}done", " ".repeat(20)));
/// ```
pub fn format_line(label: &str, message: &str) -> String {
    format!("{:>width$}{}", format!("{} ", label), message, width = LABEL_WIDTH)
}

/// Leveled output channel used by commands and the dispatcher.
///
/// Implementors only provide [`log`](Logger::log); the per-level methods and
/// [`abort_with`](Logger::abort_with) are derived from it.
pub trait Logger {
    /// Writes one line at the given level.
    fn log(&self, level: LogLevel, label: &str, message: &str);

    /// Changes the minimum level that is written. The default ignores it.
    fn set_level(&self, _level: LogLevel) {}

    fn debug(&self, label: &str, message: &str) {
        self.log(LogLevel::Debug, label, message);
    }

    fn info(&self, label: &str, message: &str) {
        self.log(LogLevel::Info, label, message);
    }

    fn warn(&self, label: &str, message: &str) {
        self.log(LogLevel::Warn, label, message);
    }

    fn error(&self, label: &str, message: &str) {
        self.log(LogLevel::Error, label, message);
    }

    /// Logs an error line and returns the termination request.
    ///
    /// The caller is expected to hand the returned [`Halt`] up to `main`.
    #[must_use = "the returned Halt must reach main to stop the process"]
    fn abort_with(&self, label: &str, message: &str) -> Halt {
        self.error(label, message);
        Halt::abort()
    }
}

/// Logger writing styled lines to stderr.
///
/// Errors are red, warnings yellow, debug lines dimmed. Lines below the
/// configured level are dropped.
#[derive(Debug, Default)]
pub struct TerminalLogger {
    level: Cell<LogLevel>,
}

impl TerminalLogger {
    /// Creates a logger at [`LogLevel::Info`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a logger with the given minimum level.
    pub fn with_level(level: LogLevel) -> Self {
        Self {
            level: Cell::new(level),
        }
    }

    /// Returns the current minimum level.
    pub fn level(&self) -> LogLevel {
        self.level.get()
    }

    /// Returns true if a line at `level` would be written.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level.get()
    }
}

impl Logger for TerminalLogger {
    fn log(&self, level: LogLevel, label: &str, message: &str) {
        if !self.enabled(level) {
            return;
        }
        let line = format_line(label, message);
        let styled = match level {
            LogLevel::Error => style(line).for_stderr().red(),
            LogLevel::Warn => style(line).for_stderr().yellow(),
            LogLevel::Info => style(line).for_stderr(),
            LogLevel::Debug => style(line).for_stderr().dim(),
        };
        // Nowhere left to report a failing stderr.
        let _ = Term::stderr().write_line(&styled.to_string());
    }

    fn set_level(&self, level: LogLevel) {
        self.level.set(level);
    }
}

/// One line captured by a [`RecordingLogger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub label: String,
    pub message: String,
    /// True for the line written by [`Logger::abort_with`].
    pub aborted: bool,
}

impl LogRecord {
    /// The record formatted the way [`TerminalLogger`] prints it, unstyled.
    pub fn line(&self) -> String {
        format_line(&self.label, &self.message)
    }
}

/// Logger that records every line instead of printing it.
///
/// Level filtering is not applied: everything is kept, including lines a
/// terminal logger would drop. The last requested level is remembered.
///
/// ```rust
/// use folio_dispatch::{Logger, RecordingLogger};
///
/// let logger = RecordingLogger::new();
/// logger.error("ERROR:", "it broke");
/// let _halt = logger.abort_with("", "bye");
///
/// assert_eq!(logger.errors().len(), 1);
/// assert_eq!(logger.aborts().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RecordingLogger {
    records: RefCell<Vec<LogRecord>>,
    level: Cell<Option<LogLevel>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The level last passed to `set_level`, if any.
    pub fn level(&self) -> Option<LogLevel> {
        self.level.get()
    }

    /// All recorded lines in order.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.borrow().clone()
    }

    /// Error-level lines that were not abort lines.
    pub fn errors(&self) -> Vec<LogRecord> {
        self.records
            .borrow()
            .iter()
            .filter(|r| r.level == LogLevel::Error && !r.aborted)
            .cloned()
            .collect()
    }

    /// Lines written by `abort_with`.
    pub fn aborts(&self) -> Vec<LogRecord> {
        self.records
            .borrow()
            .iter()
            .filter(|r| r.aborted)
            .cloned()
            .collect()
    }

    /// Lines at the given level, abort lines included.
    pub fn at_level(&self, level: LogLevel) -> Vec<LogRecord> {
        self.records
            .borrow()
            .iter()
            .filter(|r| r.level == level)
            .cloned()
            .collect()
    }

    /// Every recorded message, without labels.
    pub fn messages(&self) -> Vec<String> {
        self.records
            .borrow()
            .iter()
            .map(|r| r.message.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }

    fn push(&self, level: LogLevel, label: &str, message: &str, aborted: bool) {
        self.records.borrow_mut().push(LogRecord {
            level,
            label: label.to_string(),
            message: message.to_string(),
            aborted,
        });
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: LogLevel, label: &str, message: &str) {
        self.push(level, label, message, false);
    }

    fn set_level(&self, level: LogLevel) {
        self.level.set(Some(level));
    }

    fn abort_with(&self, label: &str, message: &str) -> Halt {
        self.push(LogLevel::Error, label, message, true);
        Halt::abort()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HaltReason;

    #[test]
    fn test_format_line_right_aligns_label() {
        let line = format_line("ERROR:", "YOUR SITE COULD NOT BE BUILT:");
        assert_eq!(line, "             ERROR: YOUR SITE COULD NOT BE BUILT:");
        assert_eq!(line.find("YOUR"), Some(LABEL_WIDTH));
    }

    #[test]
    fn test_format_line_empty_label() {
        assert_eq!(format_line("", "x"), format!("{}x", " ".repeat(LABEL_WIDTH)));
    }

    #[test]
    fn test_format_line_long_label_not_truncated() {
        let label = "Folio 0.4.0 with a long suffix";
        let line = format_line(label, "msg");
        assert_eq!(line, format!("{} msg", label));
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_terminal_logger_level_filter() {
        let logger = TerminalLogger::new();
        assert!(!logger.enabled(LogLevel::Debug));
        assert!(logger.enabled(LogLevel::Info));

        logger.set_level(LogLevel::Error);
        assert_eq!(logger.level(), LogLevel::Error);
        assert!(!logger.enabled(LogLevel::Warn));
        assert!(logger.enabled(LogLevel::Error));

        let verbose = TerminalLogger::with_level(LogLevel::Debug);
        assert!(verbose.enabled(LogLevel::Debug));
    }

    #[test]
    fn test_recording_logger_keeps_order() {
        let logger = RecordingLogger::new();
        logger.info("Source:", "a");
        logger.warn("Watch:", "b");
        logger.error("", "c");

        assert_eq!(logger.messages(), vec!["a", "b", "c"]);
        assert_eq!(logger.at_level(LogLevel::Warn).len(), 1);
        assert_eq!(logger.errors().len(), 1);
        assert!(logger.aborts().is_empty());
    }

    #[test]
    fn test_recording_logger_abort_with() {
        let logger = RecordingLogger::new();
        let halt = logger.abort_with("", "----");

        assert_eq!(halt.status, 1);
        assert_eq!(halt.reason, HaltReason::Abort);
        assert!(logger.errors().is_empty());
        assert_eq!(logger.aborts()[0].message, "----");
        assert_eq!(logger.at_level(LogLevel::Error).len(), 1);
    }

    #[test]
    fn test_default_abort_with_logs_error() {
        struct Collect(RefCell<Vec<(LogLevel, String)>>);
        impl Logger for Collect {
            fn log(&self, level: LogLevel, _label: &str, message: &str) {
                self.0.borrow_mut().push((level, message.to_string()));
            }
        }

        let logger = Collect(RefCell::new(Vec::new()));
        let halt = logger.abort_with("", "bye");
        assert_eq!(halt, Halt::abort());
        assert_eq!(logger.0.borrow()[0], (LogLevel::Error, "bye".to_string()));
    }

    #[test]
    fn test_recording_logger_clear() {
        let logger = RecordingLogger::new();
        logger.debug("", "x");
        assert!(!logger.is_empty());
        logger.clear();
        assert!(logger.is_empty());
        assert_eq!(logger.records(), Vec::new());
    }

    #[test]
    fn test_log_record_line() {
        let record = LogRecord {
            level: LogLevel::Info,
            label: "Source:".into(),
            message: "/tmp".into(),
            aborted: false,
        };
        assert_eq!(record.line(), "            Source: /tmp");
    }
}
