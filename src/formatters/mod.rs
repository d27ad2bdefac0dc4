//! Formatters turn a [`LogRecord`] into the text a sink writes

mod exception;
mod json;
mod text;

pub use exception::serialize_error;
pub use json::{JsonFormatter, JsonOptions, NamingPolicy};
pub use text::TextFormatter;

use crate::core::{error::Result, log_record::LogRecord, registry::Keyed};

/// Pluggable record formatter, registered under [`Keyed::key`]
pub trait Formatter: Keyed + Send + Sync {
    fn format(&self, record: &LogRecord) -> Result<String>;
}
