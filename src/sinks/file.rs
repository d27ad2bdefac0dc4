//! File sink with a dated, per-logger path template

use super::Sink;
use crate::core::{
    error::{LoggerError, Result},
    log_record::LogRecord,
    registry::Keyed,
};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

// One lock per resolved path, shared by every FileSink in the process
static PATH_LOCKS: LazyLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn path_lock(path: &Path) -> Arc<Mutex<()>> {
    let mut locks = PATH_LOCKS.lock();
    Arc::clone(locks.entry(path.to_path_buf()).or_default())
}

#[derive(Debug, Clone, PartialEq)]
enum PathSegment {
    Literal(String),
    /// `{0}` or `{0:<strftime>}`
    Timestamp(String),
    /// `{1}`
    LoggerName,
}

/// Log file path template
///
/// `{0}` is the current local time (`{0:%Y%m%d}` picks a strftime format,
/// default `%Y-%m-%d`), `{1}` the logger's name, `{{`/`}}` literal braces.
/// Environment variables written `%VAR%` or `${VAR}` are expanded after
/// substitution.
#[derive(Debug, Clone, PartialEq)]
pub struct PathTemplate {
    text: String,
    segments: Vec<PathSegment>,
}

impl PathTemplate {
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let invalid = |message: String| LoggerError::config("FileSink", message);

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut body = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        body.push(c);
                    }
                    if !closed {
                        return Err(invalid(format!("unclosed placeholder in '{}'", text)));
                    }
                    if !literal.is_empty() {
                        segments.push(PathSegment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(parse_placeholder(&body).map_err(invalid)?);
                }
                '}' => return Err(invalid(format!("unmatched '}}' in '{}'", text))),
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(PathSegment::Literal(literal));
        }
        Ok(Self { text, segments })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Substitute the placeholders and expand environment variables
    pub fn resolve(&self, now: &DateTime<Local>, logger: &str) -> PathBuf {
        let mut path = String::with_capacity(self.text.len() + logger.len());
        for segment in &self.segments {
            match segment {
                PathSegment::Literal(text) => path.push_str(text),
                PathSegment::Timestamp(format) => {
                    // Validated in parse
                    let _ = write!(path, "{}", now.format(format));
                }
                PathSegment::LoggerName => path.push_str(logger),
            }
        }
        PathBuf::from(expand_env_vars(&path))
    }
}

fn parse_placeholder(body: &str) -> std::result::Result<PathSegment, String> {
    let (index, format) = match body.split_once(':') {
        Some((index, format)) => (index.trim(), Some(format)),
        None => (body.trim(), None),
    };
    match (index, format) {
        ("0", format) => {
            let format = format.unwrap_or(DEFAULT_DATE_FORMAT);
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(format!("invalid date format '{}'", format));
            }
            Ok(PathSegment::Timestamp(format.to_string()))
        }
        ("1", None) => Ok(PathSegment::LoggerName),
        _ => Err(format!(
            "unknown placeholder '{{{}}}'; expected {{0}} (timestamp) or {{1}} (logger name)",
            body
        )),
    }
}

/// Expand `%VAR%` and `${VAR}`; unknown variables are left as written
pub fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find(['%', '$']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let (name, consumed) = if let Some(after) = tail.strip_prefix("${") {
            match after.find('}') {
                Some(end) => (&after[..end], end + 3),
                None => ("", 0),
            }
        } else if let Some(after) = tail.strip_prefix('%') {
            match after.find('%') {
                Some(end) => (&after[..end], end + 2),
                None => ("", 0),
            }
        } else {
            ("", 0)
        };

        let value = (!name.is_empty() && !name.contains(char::is_whitespace))
            .then(|| std::env::var(name).ok())
            .flatten();
        match value {
            Some(value) => {
                out.push_str(&value);
                rest = &tail[consumed..];
            }
            None => {
                // Keep the marker character and continue scanning after it
                let marker = tail.chars().next().map_or(1, char::len_utf8);
                out.push_str(&tail[..marker]);
                rest = &tail[marker..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Appends each message as a line to the file its template resolves to
///
/// The file and its parent directories are created on demand. Writers to the
/// same resolved path serialize on a process-wide per-path lock.
#[derive(Debug, Clone)]
pub struct FileSink {
    template: PathTemplate,
}

impl FileSink {
    pub fn new(template: impl Into<String>) -> Result<Self> {
        Ok(Self {
            template: PathTemplate::parse(template)?,
        })
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    /// Path a message from `logger` would be written to right now
    pub fn current_path(&self, logger: &str) -> PathBuf {
        self.template.resolve(&Local::now(), logger)
    }
}

impl Keyed for FileSink {
    fn key(&self) -> &str {
        "file"
    }
}

impl Sink for FileSink {
    fn write(&self, message: &str, record: &LogRecord) -> Result<()> {
        let path = self.current_path(&record.logger);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "creating log directory",
                    parent.display().to_string(),
                    e,
                )
            })?;
        }

        let lock = path_lock(&path);
        let _guard = lock.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation("opening log file", path.display().to_string(), e)
            })?;
        writeln!(file, "{}", message).map_err(|e| {
            LoggerError::io_operation("writing log file", path.display().to_string(), e)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_level::LogLevel;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn fixed_now() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 2, 29, 12, 0, 0)
            .single()
            .expect("valid datetime")
    }

    #[test]
    fn test_template_resolution() {
        let template = PathTemplate::parse("logs/{1}/{0}.log").unwrap();
        assert_eq!(
            template.resolve(&fixed_now(), "Tests"),
            PathBuf::from("logs/Tests/2024-02-29.log")
        );

        let template = PathTemplate::parse("logs/{0:%Y%m}-{{x}}.log").unwrap();
        assert_eq!(
            template.resolve(&fixed_now(), "Tests"),
            PathBuf::from("logs/202402-{x}.log")
        );
    }

    #[test]
    fn test_invalid_templates() {
        for text in ["logs/{2}.log", "logs/{0", "logs/}.log", "logs/{0:%Q}.log", "{1:%Y}"] {
            assert!(
                matches!(
                    PathTemplate::parse(text),
                    Err(LoggerError::InvalidConfiguration { .. })
                ),
                "{} should be rejected",
                text
            );
        }
    }

    #[test]
    fn test_env_expansion() {
        std::env::set_var("SCYBER_LOG_TEST_DIR", "/var/tmp");
        assert_eq!(
            expand_env_vars("%SCYBER_LOG_TEST_DIR%/a.log"),
            "/var/tmp/a.log"
        );
        assert_eq!(
            expand_env_vars("${SCYBER_LOG_TEST_DIR}/b.log"),
            "/var/tmp/b.log"
        );
        assert_eq!(
            expand_env_vars("%SCYBER_LOG_UNSET_VAR%/c.log"),
            "%SCYBER_LOG_UNSET_VAR%/c.log"
        );
        assert_eq!(expand_env_vars("100% done $5"), "100% done $5");
    }

    #[test]
    fn test_writes_create_directories_and_append() -> Result<()> {
        let dir = tempdir()?;
        let template = format!("{}/nested/{{1}}-{{0}}.log", dir.path().display());
        let sink = FileSink::new(template)?;
        let record = LogRecord::new("Tests", LogLevel::Info);

        sink.write("first", &record)?;
        sink.write("second", &record)?;

        let path = sink.current_path("Tests");
        assert!(path.starts_with(dir.path().join("nested")));
        let content = fs::read_to_string(&path)?;
        assert_eq!(content, "first\nsecond\n");
        Ok(())
    }
}
