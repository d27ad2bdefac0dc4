//! Plain console sink

use super::Sink;
use crate::core::{error::Result, log_record::LogRecord, registry::Keyed};
use parking_lot::{Mutex, MutexGuard};
use std::io::{self, Write};

// Shared by every console sink so lines and color changes never interleave
static CONSOLE_LOCK: Mutex<()> = parking_lot::const_mutex(());

pub(crate) fn console_lock() -> MutexGuard<'static, ()> {
    CONSOLE_LOCK.lock()
}

/// Writes each message as one line to standard output
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl Keyed for ConsoleSink {
    fn key(&self) -> &str {
        "console"
    }
}

impl Sink for ConsoleSink {
    fn write(&self, message: &str, _record: &LogRecord) -> Result<()> {
        let _guard = console_lock();
        let mut out = io::stdout().lock();
        writeln!(out, "{}", message)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let _guard = console_lock();
        io::stdout().flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_level::LogLevel;

    #[test]
    fn test_console_sink_writes() {
        let sink = ConsoleSink::new();
        assert_eq!(sink.key(), "console");
        let record = LogRecord::new("Tests", LogLevel::Info);
        sink.write("Hello World!", &record).unwrap();
        sink.flush().unwrap();
    }
}
