//! Structured logging with bitmask levels.
//!
//! The framework logs through the [`Logger`] trait and nothing else. When
//! no `logger` service is configured, [`crate::App::logger`] hands out a
//! [`NullLogger`] - the core never crashes for lack of logging.
//!
//! Levels are a bitmask so a configuration can enable any combination,
//! e.g. `ERROR | WARNING | INFO` for production or [`LogLevel::all()`]
//! while debugging.

mod format;
mod target;

pub use format::{Formatter, LineFormatter};
pub use target::{FileTarget, StderrTarget, Target};

use std::time::SystemTime;

use bitflags::bitflags;
use serde_json::Value;

bitflags! {
    /// Log level bitmask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LogLevel: u8 {
        const FATAL    = 1 << 0;
        const CRITICAL = 1 << 1;
        const ERROR    = 1 << 2;
        const WARNING  = 1 << 3;
        const INFO     = 1 << 4;
        const DEBUG    = 1 << 5;
        const TRACE    = 1 << 6;
    }
}

impl LogLevel {
    const NAMES: [(LogLevel, &'static str); 7] = [
        (LogLevel::FATAL, "FATAL"),
        (LogLevel::CRITICAL, "CRITICAL"),
        (LogLevel::ERROR, "ERROR"),
        (LogLevel::WARNING, "WARNING"),
        (LogLevel::INFO, "INFO"),
        (LogLevel::DEBUG, "DEBUG"),
        (LogLevel::TRACE, "TRACE"),
    ];

    /// The display name of a single level, "UNKNOWN" for combined masks.
    pub fn name(self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(level, _)| *level == self)
            .map(|(_, name)| *name)
            .unwrap_or("UNKNOWN")
    }

    /// Parses a single level name, case-insensitively.
    pub fn from_name(name: &str) -> Option<LogLevel> {
        Self::NAMES
            .iter()
            .find(|(_, candidate)| candidate.eq_ignore_ascii_case(name))
            .map(|(level, _)| *level)
    }

    /// Builds a mask from level names; unknown names are skipped.
    pub fn mask_from_names<I, S>(names: I) -> LogLevel
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|name| Self::from_name(name.as_ref()))
            .fold(LogLevel::empty(), |mask, level| mask | level)
    }
}

/// One log record, handed to the formatter.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity of the record.
    pub level: LogLevel,
    /// Subsystem scope, e.g. "core" or "plugin".
    pub scope: String,
    /// Emitting type or module.
    pub origin: String,
    /// Human-readable message.
    pub message: String,
    /// Structured context data.
    pub context: Value,
    /// Wall-clock time the record was created.
    pub timestamp: SystemTime,
}

/// Logger contract used by the framework and by components.
pub trait Logger {
    /// Writes a log record.
    fn log(&self, level: LogLevel, scope: &str, origin: &str, message: &str, context: &Value);

    /// Whether a level is enabled, for skipping expensive context builds.
    fn enabled(&self, level: LogLevel) -> bool;
}

/// Null-object logger: always off, writes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: LogLevel, _scope: &str, _origin: &str, _message: &str, _context: &Value) {
        // intentionally empty
    }

    fn enabled(&self, _level: LogLevel) -> bool {
        false
    }
}

/// Logger filtering by a level mask and writing to one or more targets.
///
/// Target write failures are dropped: logging must never take a request
/// down with it.
pub struct MaskLogger {
    mask: LogLevel,
    formatter: Box<dyn Formatter>,
    targets: Vec<Box<dyn Target>>,
}

impl MaskLogger {
    /// Creates a logger with the given mask, a [`LineFormatter`], and no
    /// targets yet.
    pub fn new(mask: LogLevel) -> Self {
        Self {
            mask,
            formatter: Box::new(LineFormatter),
            targets: Vec::new(),
        }
    }

    /// Replaces the formatter.
    pub fn with_formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Adds an output target.
    pub fn add_target(mut self, target: impl Target + 'static) -> Self {
        self.targets.push(Box::new(target));
        self
    }
}

impl Logger for MaskLogger {
    fn log(&self, level: LogLevel, scope: &str, origin: &str, message: &str, context: &Value) {
        if !self.enabled(level) {
            return;
        }

        let entry = LogEntry {
            level,
            scope: scope.to_string(),
            origin: origin.to_string(),
            message: message.to_string(),
            context: context.clone(),
            timestamp: SystemTime::now(),
        };

        let line = self.formatter.format(&entry);
        for target in &self.targets {
            let _ = target.write_line(&line);
        }
    }

    fn enabled(&self, level: LogLevel) -> bool {
        self.mask.intersects(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Collects lines for assertions.
    struct MemoryTarget {
        lines: Rc<RefCell<Vec<String>>>,
    }

    impl Target for MemoryTarget {
        fn write_line(&self, line: &str) -> std::io::Result<()> {
            self.lines.borrow_mut().push(line.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_level_names_roundtrip() {
        assert_eq!(LogLevel::ERROR.name(), "ERROR");
        assert_eq!(LogLevel::from_name("error"), Some(LogLevel::ERROR));
        assert_eq!(LogLevel::from_name("nope"), None);
        assert_eq!((LogLevel::ERROR | LogLevel::INFO).name(), "UNKNOWN");
    }

    #[test]
    fn test_mask_from_names_skips_unknown() {
        let mask = LogLevel::mask_from_names(["error", "bogus", "debug"]);
        assert_eq!(mask, LogLevel::ERROR | LogLevel::DEBUG);
    }

    #[test]
    fn test_null_logger_is_always_disabled() {
        let logger = NullLogger;
        assert!(!logger.enabled(LogLevel::FATAL));
        // Must not panic or write anything.
        logger.log(LogLevel::FATAL, "core", "test", "ignored", &Value::Null);
    }

    #[test]
    fn test_mask_logger_filters_by_level() {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let logger = MaskLogger::new(LogLevel::ERROR | LogLevel::WARNING).add_target(MemoryTarget {
            lines: lines.clone(),
        });

        logger.log(LogLevel::ERROR, "core", "App", "boom", &Value::Null);
        logger.log(LogLevel::DEBUG, "core", "App", "dropped", &Value::Null);

        assert_eq!(lines.borrow().len(), 1);
        assert!(lines.borrow()[0].contains("boom"));
    }

    #[test]
    fn test_mask_logger_writes_to_all_targets() {
        let first = Rc::new(RefCell::new(Vec::new()));
        let second = Rc::new(RefCell::new(Vec::new()));
        let logger = MaskLogger::new(LogLevel::all())
            .add_target(MemoryTarget {
                lines: first.clone(),
            })
            .add_target(MemoryTarget {
                lines: second.clone(),
            });

        logger.log(LogLevel::INFO, "core", "App", "hello", &json!({"k": 1}));

        assert_eq!(first.borrow().len(), 1);
        assert_eq!(second.borrow().len(), 1);
    }
}
