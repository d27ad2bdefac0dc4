//! Timestamp formatting for formatter output

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, SecondsFormat, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Timestamp format options
///
/// # Examples
///
/// ```
/// use scyber_log::TimestampFormat;
/// use chrono::{Local, TimeZone};
///
/// let when = Local.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(TimestampFormat::Clock.format(&when), "10:30:45:0000");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// Time of day with ten-thousandths of a second: `10:30:45:1234`
    ///
    /// The text formatter's default.
    #[default]
    Clock,

    /// RFC 3339 with microseconds and local offset: `2025-01-08T10:30:45.123456+01:00`
    ///
    /// The JSON formatter's default.
    Rfc3339Micros,

    /// RFC 3339 with whole seconds: `2025-01-08T10:30:45+01:00`
    Rfc3339,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Custom strftime format, validated by [`TimestampFormat::custom`]
    Custom(String),
}

impl TimestampFormat {
    /// Custom strftime format; rejects specifiers chrono cannot render
    pub fn custom(format: impl Into<String>) -> Result<Self> {
        let format = format.into();
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(LoggerError::config(
                "TimestampFormat",
                format!("invalid strftime format '{}'", format),
            ));
        }
        Ok(TimestampFormat::Custom(format))
    }

    #[must_use]
    pub fn format(&self, datetime: &DateTime<Local>) -> String {
        match self {
            TimestampFormat::Clock => {
                let ten_thousandths = (datetime.nanosecond() % 1_000_000_000) / 100_000;
                format!("{}:{:04}", datetime.format("%H:%M:%S"), ten_thousandths)
            }
            TimestampFormat::Rfc3339Micros => {
                datetime.to_rfc3339_opts(SecondsFormat::Micros, false)
            }
            TimestampFormat::Rfc3339 => datetime.to_rfc3339_opts(SecondsFormat::Secs, false),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) => {
                let mut out = String::new();
                match write!(out, "{}", datetime.format(format_str)) {
                    Ok(()) => out,
                    // Unvalidated custom formats fall back rather than panic
                    Err(_) => datetime.to_rfc3339_opts(SecondsFormat::Micros, false),
                }
            }
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, TimestampFormat::UnixMillis)
    }
}
