//! Log record formatting.

use std::time::UNIX_EPOCH;

use serde_json::Value;

use super::LogEntry;

/// Turns a [`LogEntry`] into one output line.
pub trait Formatter {
    /// Formats an entry. The result must not contain newlines.
    fn format(&self, entry: &LogEntry) -> String;
}

/// Default single-line format:
///
/// ```text
/// [1765629125.042] ERROR core App: something failed {"route":"/demo"}
/// ```
///
/// The context suffix is omitted when the context is null or empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineFormatter;

impl Formatter for LineFormatter {
    fn format(&self, entry: &LogEntry) -> String {
        let elapsed = entry
            .timestamp
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();

        let mut line = format!(
            "[{}.{:03}] {} {} {}: {}",
            elapsed.as_secs(),
            elapsed.subsec_millis(),
            entry.level.name(),
            entry.scope,
            entry.origin,
            entry.message
        );

        let has_context = match &entry.context {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            _ => true,
        };
        if has_context {
            line.push(' ');
            line.push_str(&entry.context.to_string());
        }

        line
    }
}
