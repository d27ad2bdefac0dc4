//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum LogLevel {
    Trace = 0,
    #[default]
    Debug = 1,
    #[serde(alias = "Information")]
    Info = 2,
    #[serde(alias = "Warning")]
    Warn = 3,
    Error = 4,
    Critical = 5,
    /// Above every real severity; a logger set to `None` emits nothing else
    None = 6,
}

impl LogLevel {
    pub const ALL: [LogLevel; 7] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Critical,
        LogLevel::None,
    ];

    /// Short form used by the text and JSON formatters
    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRIT",
            LogLevel::None => "NONE ",
        }
    }

    /// Foreground/background pair for the colored console sink
    #[cfg(feature = "console")]
    pub fn console_colors(&self) -> Option<(colored::Color, colored::Color)> {
        use colored::Color::*;
        match self {
            LogLevel::Critical => Some((White, Red)),
            LogLevel::Error => Some((Red, Black)),
            LogLevel::Warn => Some((Yellow, Black)),
            LogLevel::Info => Some((White, Black)),
            LogLevel::Debug => Some((Green, Black)),
            LogLevel::Trace | LogLevel::None => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" | "INFORMATION" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "CRIT" | "CRITICAL" => Ok(LogLevel::Critical),
            "NONE" => Ok(LogLevel::None),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_names() {
        assert_eq!(LogLevel::Info.to_str(), "INFO");
        assert_eq!(LogLevel::Critical.to_str(), "CRIT");
        assert_eq!(LogLevel::None.to_str(), "NONE ");
    }

    #[test]
    fn test_parse_long_and_short_names() {
        assert_eq!("Information".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("CRITICAL".parse::<LogLevel>(), Ok(LogLevel::Critical));
        assert_eq!(" none ".parse::<LogLevel>(), Ok(LogLevel::None));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_ordering() {
        for pair in LogLevel::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[cfg(feature = "console")]
    #[test]
    fn test_console_palette() {
        use colored::Color;
        assert_eq!(
            LogLevel::Critical.console_colors(),
            Some((Color::White, Color::Red))
        );
        assert_eq!(LogLevel::Debug.console_colors(), Some((Color::Green, Color::Black)));
        assert_eq!(LogLevel::Trace.console_colors(), None);
    }
}
