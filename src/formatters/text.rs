//! Human-readable single-line formatter

use super::Formatter;
use crate::core::{
    error::Result, log_record::LogRecord, registry::Keyed, timestamp::TimestampFormat,
};

/// `[10:30:45:1234] [INFO]  category - message`
///
/// The short level name and its closing bracket are left-aligned in six
/// columns. A record without a renderer prints its state's display form.
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    timestamp_format: TimestampFormat,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }
}

impl Keyed for TextFormatter {
    fn key(&self) -> &str {
        "text"
    }
}

impl Formatter for TextFormatter {
    fn format(&self, record: &LogRecord) -> Result<String> {
        let message = match record.render()? {
            Some(message) => message,
            None => record.state.to_string(),
        };
        let level = format!("{}]", record.level.to_str());
        Ok(format!(
            "[{}] [{:<6} {} - {}",
            self.timestamp_format.format(&record.timestamp),
            level,
            record.logger,
            message
        ))
    }
}
