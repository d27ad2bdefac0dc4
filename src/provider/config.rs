//! Provider configuration

use crate::core::log_level::LogLevel;
use crate::formatters::JsonOptions;
use serde::{Deserialize, Serialize};

/// Sink of the console channel; plain output when colors are compiled out
#[cfg(feature = "console")]
const CONSOLE_CHANNEL_SINK: &str = "colored_console";
#[cfg(not(feature = "console"))]
const CONSOLE_CHANNEL_SINK: &str = "console";

/// Wiring of one sub-logger: a formatter key and the sink keys it writes to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerSetup {
    pub formatter: String,
    #[serde(default)]
    pub sinks: Vec<String>,
}

impl LoggerSetup {
    pub fn new(formatter: impl Into<String>) -> Self {
        Self {
            formatter: formatter.into(),
            sinks: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: impl Into<String>) -> Self {
        self.sinks.push(sink.into());
        self
    }
}

/// Configuration consumed by [`LoggerProvider`](super::LoggerProvider)
///
/// Every field has a default, so any subset may be deserialized:
///
/// ```
/// use scyber_log::ScyberLogConfig;
///
/// let config: ScyberLogConfig =
///     serde_json::from_str(r#"{"enableFile": false, "minLevel": "Warning"}"#).unwrap();
/// assert!(config.enable_console);
/// assert!(!config.enable_file);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScyberLogConfig {
    pub enable_console: bool,
    pub enable_file: bool,
    pub console_formatter: String,
    pub file_formatter: String,
    /// `{0}` timestamp, `{1}` logger name; see [`PathTemplate`](crate::sinks::PathTemplate)
    pub file_name_template: String,
    pub min_level: LogLevel,
    /// Keep the `{OriginalFormat}` pair in structured state
    pub include_original_format: bool,
    /// Return pipeline errors to callers instead of swallowing them
    pub throw_pipeline_errors: bool,
    pub json: JsonOptions,
    pub additional_loggers: Vec<LoggerSetup>,
}

impl Default for ScyberLogConfig {
    fn default() -> Self {
        Self {
            enable_console: true,
            enable_file: true,
            console_formatter: "text".to_string(),
            file_formatter: "json".to_string(),
            file_name_template: "Log/{0:%Y-%m-%d}.log".to_string(),
            min_level: LogLevel::Debug,
            include_original_format: false,
            throw_pipeline_errors: false,
            json: JsonOptions::default(),
            additional_loggers: Vec::new(),
        }
    }
}

impl ScyberLogConfig {
    /// Sub-logger setups in creation order: console, file, then additional
    pub fn logger_setups(&self) -> Vec<LoggerSetup> {
        let mut setups = Vec::with_capacity(2 + self.additional_loggers.len());
        if self.enable_console {
            setups.push(LoggerSetup::new(&self.console_formatter).with_sink(CONSOLE_CHANNEL_SINK));
        }
        if self.enable_file {
            setups.push(LoggerSetup::new(&self.file_formatter).with_sink("file"));
        }
        setups.extend(self.additional_loggers.iter().cloned());
        setups
    }
}
