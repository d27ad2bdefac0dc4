//! Template logging macro
//!
//! `log!` captures a message template and its arguments as
//! [`TemplateValues`](crate::TemplateValues) state, so structured sinks see
//! the named values while text sinks see the rendered message.
//!
//! # Examples
//!
//! ```no_run
//! use scyber_log::prelude::*;
//! use scyber_log::log;
//!
//! let logger = Logger::builder("app").build();
//!
//! log!(logger, LogLevel::Info, "Server started")?;
//! log!(logger, LogLevel::Info, "Listening on port {Port}", 8080)?;
//!
//! let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
//! log!(logger, LogLevel::Error, error = err, "Write to {Path} failed", "/var/log")?;
//! # Ok::<(), LoggerError>(())
//! ```

/// Log a message template with positional arguments
///
/// Arguments bind to the template's placeholders in order and must convert
/// into [`FieldValue`](crate::FieldValue). An `error = expr` argument
/// attaches any [`LoggableError`](crate::LoggableError). Evaluates to the
/// logger's `Result<()>`.
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, error = $error:expr, $template:expr $(, $arg:expr)* $(,)?) => {{
        use $crate::Log as _;
        let values = $crate::TemplateValues::new(
            $template,
            vec![$($crate::FieldValue::from($arg)),*],
        );
        let error: $crate::ErrorRef = ::std::sync::Arc::new($error);
        $logger.log(
            $level,
            $crate::EventId::default(),
            $crate::State::new(values),
            Some(error),
            Some($crate::TemplateValues::renderer()),
        )
    }};
    ($logger:expr, $level:expr, $template:expr $(, $arg:expr)* $(,)?) => {{
        use $crate::Log as _;
        let values = $crate::TemplateValues::new(
            $template,
            vec![$($crate::FieldValue::from($arg)),*],
        );
        $logger.log(
            $level,
            $crate::EventId::default(),
            $crate::State::new(values),
            None,
            Some($crate::TemplateValues::renderer()),
        )
    }};
}
