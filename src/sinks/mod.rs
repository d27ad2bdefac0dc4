//! Sinks write formatted messages to an output destination

#[cfg(feature = "console")]
mod colored_console;
mod console;
#[cfg(feature = "file")]
mod file;

#[cfg(feature = "console")]
pub use colored_console::{ColorGuard, ColoredConsoleSink};
pub use console::ConsoleSink;
#[cfg(feature = "file")]
pub use file::{expand_env_vars, FileSink, PathTemplate};

use crate::core::{error::Result, log_record::LogRecord, registry::Keyed};

/// Pluggable output destination, registered under [`Keyed::key`]
///
/// Implementations are shared across threads and must serialize their own
/// writes.
pub trait Sink: Keyed + Send + Sync {
    fn write(&self, message: &str, record: &LogRecord) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
