//! Progress reporting sink.
//!
//! The patch engine and the resource fetcher describe what they are doing
//! through a [`Reporter`] handed to them by the caller, so they never write
//! to the console on their own. The binary uses [`LogReporter`]; tests use
//! [`RecordingReporter`] to assert on what was reported.

use log::Level;
use parking_lot::Mutex;

/// Receiver for human-readable progress messages.
pub trait Reporter: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards every message to the `log` facade under the `rime_mate` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn info(&self, message: &str) {
        log::info!(target: "rime_mate", "{message}");
    }

    fn warn(&self, message: &str) {
        log::warn!(target: "rime_mate", "{message}");
    }

    fn error(&self, message: &str) {
        log::error!(target: "rime_mate", "{message}");
    }
}

/// Keeps every message in memory, in the order received.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<(Level, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded messages.
    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages.lock().clone()
    }

    /// True if any message at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.messages
            .lock()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }

    fn push(&self, level: Level, message: &str) {
        self.messages.lock().push((level, message.to_string()));
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_reporter_keeps_order_and_level() {
        let reporter = RecordingReporter::new();
        reporter.info("first");
        reporter.warn("second");
        reporter.error("third");

        let messages = reporter.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], (Level::Info, "first".to_string()));
        assert_eq!(messages[1], (Level::Warn, "second".to_string()));
        assert_eq!(messages[2], (Level::Error, "third".to_string()));
        assert!(reporter.contains(Level::Warn, "sec"));
        assert!(!reporter.contains(Level::Info, "sec"));
    }
}
