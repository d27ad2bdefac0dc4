//! Error types for the logging pipeline

use std::sync::Arc;

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// A logger setup names a formatter nobody registered
    #[error("Formatter [{key}] not registered.")]
    FormatterNotRegistered { key: String },

    /// A logger setup names a sink nobody registered
    #[error("Sink [{key}] not registered.")]
    SinkNotRegistered { key: String },

    /// Two components of the same kind share a key
    #[error("Duplicate {kind} key [{key}]")]
    DuplicateKey { kind: &'static str, key: String },

    /// Malformed or under-supplied message template
    #[error("Invalid message template [{template}]: {message}")]
    Template { template: String, message: String },

    /// Formatter error with format type
    #[error("Formatter error ({format_type}): {message}")]
    FormatterError {
        format_type: String,
        message: String,
    },

    /// A pluggable component panicked instead of returning an error
    #[error("{component} panicked: {message}")]
    Panicked { component: String, message: String },

    /// Several independent failures reported together
    #[error("{message}{}", summarize(.errors))]
    Aggregate {
        message: String,
        errors: Vec<Arc<LoggerError>>,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

fn summarize(errors: &[Arc<LoggerError>]) -> String {
    errors.iter().map(|e| format!(" ({})", e)).collect()
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn formatter_not_registered(key: impl Into<String>) -> Self {
        LoggerError::FormatterNotRegistered { key: key.into() }
    }

    pub fn sink_not_registered(key: impl Into<String>) -> Self {
        LoggerError::SinkNotRegistered { key: key.into() }
    }

    pub fn duplicate_key(kind: &'static str, key: impl Into<String>) -> Self {
        LoggerError::DuplicateKey {
            kind,
            key: key.into(),
        }
    }

    /// Create a message template error
    pub fn template(template: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Template {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Create a formatter error
    pub fn formatter(format_type: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FormatterError {
            format_type: format_type.into(),
            message: message.into(),
        }
    }

    pub fn panicked(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Panicked {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a multi-error result from already shared errors
    pub fn aggregate(message: impl Into<String>, errors: Vec<Arc<LoggerError>>) -> Self {
        LoggerError::Aggregate {
            message: message.into(),
            errors,
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Inner errors of an aggregate, empty for every other variant
    pub fn inner_errors(&self) -> &[Arc<LoggerError>] {
        match self {
            LoggerError::Aggregate { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Short variant name, used as the error type in structured output
    pub fn kind(&self) -> &'static str {
        match self {
            LoggerError::IoOperation { .. } => "IoOperation",
            LoggerError::IoError(_) => "IoError",
            LoggerError::JsonError(_) => "JsonError",
            LoggerError::InvalidConfiguration { .. } => "InvalidConfiguration",
            LoggerError::FormatterNotRegistered { .. } => "FormatterNotRegistered",
            LoggerError::SinkNotRegistered { .. } => "SinkNotRegistered",
            LoggerError::DuplicateKey { .. } => "DuplicateKey",
            LoggerError::Template { .. } => "Template",
            LoggerError::FormatterError { .. } => "FormatterError",
            LoggerError::Panicked { .. } => "Panicked",
            LoggerError::Aggregate { .. } => "Aggregate",
            LoggerError::Other(_) => "Other",
        }
    }
}

/// Run a pluggable component, turning a panic into [`LoggerError::Panicked`]
///
/// One misbehaving formatter, sink or renderer must not unwind through the
/// pipeline and take the caller down with it.
pub(crate) fn isolate<T>(component: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(panic_info) => Err(LoggerError::panicked(
            component,
            panic_message(panic_info.as_ref()),
        )),
    }
}

pub(crate) fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
