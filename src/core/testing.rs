//! Sinks and formatters shared by unit tests

use super::error::{LoggerError, Result};
use super::log_record::LogRecord;
use super::registry::Keyed;
use crate::formatters::Formatter;
use crate::sinks::Sink;
use parking_lot::Mutex;
use std::sync::Arc;

/// Captures every message with the record it came from
#[derive(Clone, Default)]
pub struct MemorySink {
    pub key: &'static str,
    pub entries: Arc<Mutex<Vec<(String, LogRecord)>>>,
}

impl MemorySink {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            entries: Arc::default(),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries.lock().iter().map(|(m, _)| m.clone()).collect()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.entries.lock().iter().map(|(_, r)| r.clone()).collect()
    }
}

impl Keyed for MemorySink {
    fn key(&self) -> &str {
        self.key
    }
}

impl Sink for MemorySink {
    fn write(&self, message: &str, record: &LogRecord) -> Result<()> {
        self.entries.lock().push((message.to_string(), record.clone()));
        Ok(())
    }
}

/// Fails every write with a fixed message
pub struct FailingSink(pub &'static str);

impl Keyed for FailingSink {
    fn key(&self) -> &str {
        "failing"
    }
}

impl Sink for FailingSink {
    fn write(&self, _message: &str, _record: &LogRecord) -> Result<()> {
        Err(LoggerError::other(self.0))
    }
}

/// Panics on every write
pub struct PanickingSink;

impl Keyed for PanickingSink {
    fn key(&self) -> &str {
        "panicking"
    }
}

impl Sink for PanickingSink {
    fn write(&self, _message: &str, _record: &LogRecord) -> Result<()> {
        panic!("sink exploded")
    }
}

/// Renders only the message, or the error message when there is none
pub struct MessageFormatter;

impl Keyed for MessageFormatter {
    fn key(&self) -> &str {
        "message"
    }
}

impl Formatter for MessageFormatter {
    fn format(&self, record: &LogRecord) -> Result<String> {
        Ok(record.render()?.unwrap_or_default())
    }
}
