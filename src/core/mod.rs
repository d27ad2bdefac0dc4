//! Core pipeline types and traits

pub mod error;
pub mod field_value;
pub mod log_level;
pub mod log_record;
pub mod loggable;
pub mod logger;
pub mod registry;
pub mod scope;
pub mod state;
pub mod state_mapper;
pub mod template;
#[cfg(test)]
pub(crate) mod testing;
pub mod timestamp;

pub use error::{LoggerError, Result};
pub use field_value::FieldValue;
pub use log_level::LogLevel;
pub use log_record::{EventId, LogRecord};
pub use loggable::{
    ErrorField, ErrorFields, ErrorRef, FaultKind, FieldSlot, GenericError, LoggableError,
    PipelineFault,
};
pub use logger::{Log, Logger, LoggerBuilder};
pub use registry::{Keyed, KeyedRegistry};
pub use scope::{AggregateDisposable, Dispose, DisposeAction, ScopeGuard, ScopeTracker};
pub use state::{
    error_message_renderer, renderer, KeyValueList, LogState, Renderer, State, Structured,
    ORIGINAL_FORMAT_KEY,
};
pub use state_mapper::{normalize, Normalized, StateMapper, StructuredValues, TemplateMapper};
pub use template::{MessageTemplate, TemplateValues};
pub use timestamp::TimestampFormat;
