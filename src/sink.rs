//! Logger factories the rule can be given.
//!
//! - [`LogFactory`]: the `log` facade, target = test class.
//! - [`TracingFactory`]: `tracing` events with a `test_class` field.
//! - [`CaptureFactory`]: in-memory records for assertions.
//!
//! Any `Fn(&str) -> impl TestLogger` is a factory as well.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use log::Level;

/// A logger bound to one test class. Lifecycle records are all informational.
pub trait TestLogger {
    fn info(&self, message: &str);

    /// Informational record with the failure attached.
    fn info_with_error(&self, message: &str, error: &dyn fmt::Debug);
}

/// Resolves a logger for a test class. Called once per wrapped invocation.
pub trait LoggerFactory {
    type Logger: TestLogger;

    fn logger(&self, test_class: &str) -> Self::Logger;
}

impl<F, L> LoggerFactory for F
where
    F: Fn(&str) -> L,
    L: TestLogger,
{
    type Logger = L;

    fn logger(&self, test_class: &str) -> L {
        self(test_class)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogFactory;

#[derive(Debug, Clone)]
pub struct LogLogger {
    target: String,
}

impl LoggerFactory for LogFactory {
    type Logger = LogLogger;

    fn logger(&self, test_class: &str) -> LogLogger {
        LogLogger {
            target: test_class.to_string(),
        }
    }
}

impl TestLogger for LogLogger {
    fn info(&self, message: &str) {
        log::info!(target: self.target.as_str(), "{message}");
    }

    // the facade has no slot for an error, so it follows on the next line
    fn info_with_error(&self, message: &str, error: &dyn fmt::Debug) {
        log::info!(target: self.target.as_str(), "{message}\n{error:?}");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFactory;

#[derive(Debug, Clone)]
pub struct TracingLogger {
    test_class: String,
}

impl LoggerFactory for TracingFactory {
    type Logger = TracingLogger;

    fn logger(&self, test_class: &str) -> TracingLogger {
        TracingLogger {
            test_class: test_class.to_string(),
        }
    }
}

impl TestLogger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(test_class = %self.test_class, "{message}");
    }

    fn info_with_error(&self, message: &str, error: &dyn fmt::Debug) {
        tracing::info!(test_class = %self.test_class, error = ?error, "{message}");
    }
}

/// One record seen by a [`CaptureFactory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRecord {
    pub target: String,
    pub level: Level,
    pub message: String,
    /// `{:?}` of the attached error, if any.
    pub error: Option<String>,
}

/// Collects every record from the loggers it hands out. Clones share the
/// same buffer.
#[derive(Debug, Clone, Default)]
pub struct CaptureFactory {
    records: Arc<Mutex<Vec<CapturedRecord>>>,
}

impl CaptureFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records so far, in emission order.
    #[must_use]
    pub fn records(&self) -> Vec<CapturedRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.message).collect()
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[derive(Debug, Clone)]
pub struct CaptureLogger {
    target: String,
    records: Arc<Mutex<Vec<CapturedRecord>>>,
}

impl CaptureLogger {
    fn push(&self, message: &str, error: Option<String>) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(CapturedRecord {
                target: self.target.clone(),
                level: Level::Info,
                message: message.to_string(),
                error,
            });
    }
}

impl LoggerFactory for CaptureFactory {
    type Logger = CaptureLogger;

    fn logger(&self, test_class: &str) -> CaptureLogger {
        CaptureLogger {
            target: test_class.to_string(),
            records: Arc::clone(&self.records),
        }
    }
}

impl TestLogger for CaptureLogger {
    fn info(&self, message: &str) {
        self.push(message, None);
    }

    fn info_with_error(&self, message: &str, error: &dyn fmt::Debug) {
        self.push(message, Some(format!("{error:?}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_clones_share_records() {
        let capture = CaptureFactory::new();
        let other = capture.clone();
        capture.logger("A").info("one");
        other.logger("B").info_with_error("two", &"boom");
        let records = capture.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].target, "A");
        assert_eq!(records[1].target, "B");
        assert_eq!(records[1].error.as_deref(), Some("\"boom\""));
        assert!(records.iter().all(|r| r.level == Level::Info));
        other.clear();
        assert!(capture.records().is_empty());
    }

    #[test]
    fn closures_are_factories() {
        let capture = CaptureFactory::new();
        let inner = capture.clone();
        let factory = move |class: &str| inner.logger(&format!("custom::{class}"));
        factory.logger("T").info("hello");
        assert_eq!(capture.records()[0].target, "custom::T");
    }
}
