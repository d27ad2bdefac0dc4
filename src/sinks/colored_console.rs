//! Console sink that colors each line by level

use super::console::console_lock;
use super::Sink;
use crate::core::{error::Result, log_record::LogRecord, registry::Keyed};
use colored::Color;
use std::io::{self, Write};

const RESET: &[u8] = b"\x1b[0m";

/// Applies a foreground/background pair until dropped
///
/// Dropping the guard resets the terminal colors, including when the write
/// in between fails.
pub struct ColorGuard<'a, W: Write> {
    writer: &'a mut W,
    active: bool,
}

impl<'a, W: Write> ColorGuard<'a, W> {
    pub fn new(writer: &'a mut W, colors: Option<(Color, Color)>) -> io::Result<Self> {
        let active = match colors {
            Some((foreground, background)) => {
                let sgr = format!(
                    "\x1b[{};{}m",
                    foreground.to_fg_str(),
                    background.to_bg_str()
                );
                writer.write_all(sgr.as_bytes())?;
                true
            }
            None => false,
        };
        Ok(Self { writer, active })
    }

    pub fn writer(&mut self) -> &mut W {
        self.writer
    }
}

impl<W: Write> Drop for ColorGuard<'_, W> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.writer.write_all(RESET);
        }
    }
}

/// Writes a message with the level's colors, then a plain newline
pub(crate) fn write_colored<W: Write>(
    out: &mut W,
    message: &str,
    colors: Option<(Color, Color)>,
) -> io::Result<()> {
    {
        let mut guard = ColorGuard::new(out, colors)?;
        guard.writer().write_all(message.as_bytes())?;
    }
    out.write_all(b"\n")
}

/// Standard output with per-level colors
///
/// Critical: white on red. Error: red on black. Warn: yellow on black.
/// Info: white on black. Debug: green on black. Other levels are uncolored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColoredConsoleSink {
    colorize: Option<bool>,
}

impl ColoredConsoleSink {
    /// Colors follow the terminal's capabilities and `NO_COLOR`/`CLICOLOR`
    pub fn new() -> Self {
        Self::default()
    }

    /// Force colors on or off
    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            colorize: Some(use_colors),
        }
    }

    fn should_colorize(&self) -> bool {
        self.colorize
            .unwrap_or_else(|| colored::control::SHOULD_COLORIZE.should_colorize())
    }
}

impl Keyed for ColoredConsoleSink {
    fn key(&self) -> &str {
        "colored_console"
    }
}

impl Sink for ColoredConsoleSink {
    fn write(&self, message: &str, record: &LogRecord) -> Result<()> {
        let colors = if self.should_colorize() {
            record.level.console_colors()
        } else {
            None
        };
        let _guard = console_lock();
        let mut out = io::stdout().lock();
        write_colored(&mut out, message, colors)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let _guard = console_lock();
        io::stdout().flush()?;
        Ok(())
    }
}
