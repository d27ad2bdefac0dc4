//! Errors that can be attached to a log record
//!
//! The JSON formatter describes an attached error by its type name, message,
//! stack trace, inner error(s) and any extra fields the error chooses to
//! expose through [`LoggableError::visit_fields`].

use super::error::{panic_message, LoggerError};
use super::field_value::FieldValue;
use serde::Serialize;
use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Shared handle to an attached error
pub type ErrorRef = Arc<dyn LoggableError>;

pub trait LoggableError: Error + Send + Sync + 'static {
    fn type_name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }

    fn stack_trace(&self) -> Option<String> {
        None
    }

    fn inner_error(&self) -> Option<&dyn LoggableError> {
        None
    }

    /// Member errors of an aggregate; suppresses the single inner error
    fn inner_errors(&self) -> Option<Vec<&dyn LoggableError>> {
        None
    }

    fn visit_fields(&self, _fields: &mut ErrorFields) {}
}

/// What was captured for one extra error field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSlot {
    Value(serde_json::Value),
    /// Reading the field failed; holds the failure message
    Unreadable(String),
    /// The field was read but could not be serialized
    Unserializable(String),
    /// Code-location metadata, never serialized
    CallSite,
    /// Cancellation handle, never serialized
    CancellationHandle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorField {
    pub name: String,
    pub slot: FieldSlot,
}

/// Collector passed to [`LoggableError::visit_fields`]
#[derive(Debug, Default)]
pub struct ErrorFields {
    entries: Vec<ErrorField>,
}

impl ErrorFields {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, name: &str, slot: FieldSlot) -> &mut Self {
        self.entries.push(ErrorField {
            name: name.to_string(),
            slot,
        });
        self
    }

    pub fn value(&mut self, name: &str, value: impl Into<FieldValue>) -> &mut Self {
        let value: FieldValue = value.into();
        self.push(name, FieldSlot::Value(value.to_json_value()))
    }

    /// Record a field whose read may fail or panic
    pub fn read<E, F>(&mut self, name: &str, read: F) -> &mut Self
    where
        E: fmt::Display,
        F: FnOnce() -> std::result::Result<FieldValue, E>,
    {
        let slot = match catch_unwind(AssertUnwindSafe(read)) {
            Ok(Ok(value)) => FieldSlot::Value(value.to_json_value()),
            Ok(Err(err)) => FieldSlot::Unreadable(err.to_string()),
            Err(panic_info) => FieldSlot::Unreadable(panic_message(panic_info.as_ref())),
        };
        self.push(name, slot)
    }

    /// Record an arbitrary serializable field
    pub fn serialize<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> &mut Self {
        let slot = match catch_unwind(AssertUnwindSafe(|| serde_json::to_value(value))) {
            Ok(Ok(json)) => FieldSlot::Value(json),
            Ok(Err(err)) => {
                FieldSlot::Unserializable(format!("Error serializing property; {}", err))
            }
            Err(panic_info) => FieldSlot::Unserializable(format!(
                "Error serializing property; {}",
                panic_message(panic_info.as_ref())
            )),
        };
        self.push(name, slot)
    }

    pub fn call_site(&mut self, name: &str) -> &mut Self {
        self.push(name, FieldSlot::CallSite)
    }

    pub fn cancellation_handle(&mut self, name: &str) -> &mut Self {
        self.push(name, FieldSlot::CancellationHandle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ErrorField> {
        self.entries.iter()
    }

    /// Fields that belong in structured output, failures rendered as strings
    pub fn serializable(&self) -> impl Iterator<Item = (&str, serde_json::Value)> + '_ {
        self.entries.iter().filter_map(|field| {
            let value = match &field.slot {
                FieldSlot::Value(json) => json.clone(),
                FieldSlot::Unreadable(message) | FieldSlot::Unserializable(message) => {
                    serde_json::Value::String(message.clone())
                }
                FieldSlot::CallSite | FieldSlot::CancellationHandle => return None,
            };
            Some((field.name.as_str(), value))
        })
    }
}

/// Adapter for any standard error
///
/// Keeps the concrete type's name so structured output can report it.
#[derive(Debug)]
pub struct GenericError {
    type_name: &'static str,
    inner: Box<dyn Error + Send + Sync>,
}

impl GenericError {
    pub fn new<E: Error + Send + Sync + 'static>(err: E) -> Self {
        Self {
            type_name: std::any::type_name::<E>(),
            inner: Box::new(err),
        }
    }
}

impl fmt::Display for GenericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl Error for GenericError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source()
    }
}

impl LoggableError for GenericError {
    fn type_name(&self) -> String {
        self.type_name.to_string()
    }
}

impl LoggableError for std::io::Error {}

impl LoggableError for LoggerError {
    fn type_name(&self) -> String {
        format!("scyber_log::LoggerError::{}", self.kind())
    }

    fn inner_error(&self) -> Option<&dyn LoggableError> {
        match self {
            LoggerError::IoOperation { source, .. } => Some(source as &dyn LoggableError),
            LoggerError::IoError(source) => Some(source as &dyn LoggableError),
            LoggerError::Aggregate { errors, .. } => {
                errors.first().map(|e| e.as_ref() as &dyn LoggableError)
            }
            _ => None,
        }
    }

    fn inner_errors(&self) -> Option<Vec<&dyn LoggableError>> {
        match self {
            LoggerError::Aggregate { errors, .. } => Some(
                errors
                    .iter()
                    .map(|e| e.as_ref() as &dyn LoggableError)
                    .collect(),
            ),
            _ => None,
        }
    }

    fn visit_fields(&self, fields: &mut ErrorFields) {
        match self {
            LoggerError::FormatterNotRegistered { key }
            | LoggerError::SinkNotRegistered { key }
            | LoggerError::DuplicateKey { key, .. } => {
                fields.value("Key", key.as_str());
            }
            LoggerError::Template { template, .. } => {
                fields.value("Template", template.as_str());
            }
            LoggerError::IoOperation { message, .. } => {
                fields.value("Target", message.as_str());
            }
            LoggerError::Panicked { component, .. } => {
                fields.value("Component", component.as_str());
            }
            _ => {}
        }
    }
}

/// Which pipeline stage a [`PipelineFault`] reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultKind {
    Format,
    Sink { sink: String },
}

/// Failure of the pipeline itself, logged through the pipeline at Warn
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct PipelineFault {
    kind: FaultKind,
    message: String,
    template: Option<String>,
    stack_trace: String,
    #[source]
    source: Arc<LoggerError>,
}

impl PipelineFault {
    pub fn format_failure(source: Arc<LoggerError>, template: Option<String>) -> Self {
        let message = match &template {
            Some(template) => format!("Error formatting log message. Format string: [{}]", template),
            None => "Error formatting log message. This is most often the result of a state \
                     that cannot be serialized. See the inner error for more details."
                .to_string(),
        };
        Self {
            kind: FaultKind::Format,
            message,
            template,
            stack_trace: Backtrace::force_capture().to_string(),
            source,
        }
    }

    pub fn sink_failure(sink: &str, source: Arc<LoggerError>) -> Self {
        Self {
            kind: FaultKind::Sink {
                sink: sink.to_string(),
            },
            message: format!(
                "Error writing log message to sink [{}]. See the inner error for more details.",
                sink
            ),
            template: None,
            stack_trace: Backtrace::force_capture().to_string(),
            source,
        }
    }

    pub fn kind(&self) -> &FaultKind {
        &self.kind
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn inner(&self) -> &Arc<LoggerError> {
        &self.source
    }
}

impl LoggableError for PipelineFault {
    fn type_name(&self) -> String {
        "scyber_log::PipelineFault".to_string()
    }

    fn stack_trace(&self) -> Option<String> {
        Some(self.stack_trace.clone())
    }

    fn inner_error(&self) -> Option<&dyn LoggableError> {
        Some(self.source.as_ref())
    }

    fn visit_fields(&self, fields: &mut ErrorFields) {
        if let FaultKind::Sink { sink } = &self.kind {
            fields.value("Sink", sink.as_str());
        }
        if let Some(template) = &self.template {
            fields.value("FormatString", template.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("not today"))
        }
    }

    #[test]
    fn test_field_slots() {
        let mut fields = ErrorFields::new();
        fields
            .value("Code", 42)
            .read("Broken", || -> Result<FieldValue, String> { Err("getter failed".into()) })
            .read("Panicky", || -> Result<FieldValue, String> { panic!("getter panicked") })
            .serialize("Payload", &Unserializable)
            .call_site("TargetSite")
            .cancellation_handle("CancellationToken");

        let serialized: Vec<(&str, serde_json::Value)> = fields.serializable().collect();
        assert_eq!(
            serialized,
            vec![
                ("Code", serde_json::json!(42)),
                ("Broken", serde_json::json!("getter failed")),
                ("Panicky", serde_json::json!("getter panicked")),
                ("Payload", serde_json::json!("Error serializing property; not today")),
            ]
        );
        assert_eq!(fields.iter().count(), 6);
    }

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "boom")
        }
    }

    impl Error for Boom {}

    #[test]
    fn test_generic_error_keeps_type_name() {
        let err = GenericError::new(Boom);
        assert!(err.type_name().ends_with("Boom"));
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_aggregate_exposes_members() {
        let err = LoggerError::aggregate(
            "Exceptional!",
            vec![
                Arc::new(LoggerError::other("Exception 1")),
                Arc::new(LoggerError::other("Exception 2")),
            ],
        );
        assert_eq!(LoggableError::inner_errors(&err).map(|m| m.len()), Some(2));
        assert_eq!(
            err.inner_error().map(|e| e.to_string()).as_deref(),
            Some("Exception 1")
        );
        assert_eq!(err.type_name(), "scyber_log::LoggerError::Aggregate");
    }

    #[test]
    fn test_sink_fault_message() {
        let fault = PipelineFault::sink_failure("file", Arc::new(LoggerError::other("disk full")));
        assert_eq!(
            fault.to_string(),
            "Error writing log message to sink [file]. See the inner error for more details."
        );
        assert_eq!(fault.inner_error().unwrap().to_string(), "disk full");
        assert!(fault.stack_trace().is_some());
        assert!(fault.source().is_some());
    }

    #[test]
    fn test_format_fault_message_includes_template() {
        let fault = PipelineFault::format_failure(
            Arc::new(LoggerError::template("{Hello", "unclosed placeholder at 0")),
            Some("{Hello".to_string()),
        );
        assert_eq!(
            fault.to_string(),
            "Error formatting log message. Format string: [{Hello]"
        );
        assert_eq!(fault.template(), Some("{Hello"));
    }
}
