//! # ScyberLog
//!
//! A pluggable structured-logging pipeline. Each log call carries a severity,
//! an event id, an arbitrary state value, an optional error and a renderer.
//! The state is normalized, formatted once and handed to every sink of the
//! sub-logger.
//!
//! ## Features
//!
//! - **Pluggable**: formatters and sinks are registered by key and wired
//!   together by configuration
//! - **Structured**: message templates keep their named values, JSON output
//!   reflects errors including their inner errors
//! - **Fault isolated**: a failing or panicking sink never stops the others,
//!   and pipeline failures are reported through the pipeline itself
//! - **Scoped**: nested scopes are captured on every record
//!
//! ## Example
//!
//! ```no_run
//! use scyber_log::prelude::*;
//!
//! let provider = LoggerProvider::builder().with_default_components().build()?;
//! let logger = provider.create_logger("app")?;
//!
//! let _scope = logger.begin_scope(State::from("request 42"))?;
//! scyber_log::log!(logger, LogLevel::Info, "{Greeting} {Kilo}", "HELLO", 1000)?;
//! # Ok::<(), LoggerError>(())
//! ```

pub mod core;
pub mod formatters;
pub mod macros;
pub mod provider;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        EventId, FieldValue, Keyed, Log, LogLevel, LogRecord, LogState, LoggableError, Logger,
        LoggerError, Result, ScopeGuard, State, Structured, TemplateValues,
    };
    pub use crate::formatters::{Formatter, JsonFormatter, TextFormatter};
    pub use crate::provider::{CompositeLogger, LoggerProvider, ScyberLogConfig};
    pub use crate::sinks::{ConsoleSink, Sink};
}

pub use crate::core::{
    error_message_renderer, renderer, ErrorFields, ErrorRef, EventId, FieldValue, GenericError,
    Keyed, KeyValueList, Log, LogLevel, LogRecord, LogState, LoggableError, Logger, LoggerBuilder,
    LoggerError, MessageTemplate, PipelineFault, Renderer, Result, ScopeGuard, State,
    StateMapper, Structured, StructuredValues, TemplateMapper, TemplateValues, TimestampFormat,
};
pub use formatters::{Formatter, JsonFormatter, JsonOptions, NamingPolicy, TextFormatter};
pub use provider::{
    CompositeLogger, FaultIsolatedLogger, LoggerProvider, LoggerProviderBuilder, LoggerSetup,
    ScyberLogConfig,
};
pub use sinks::{ConsoleSink, Sink};
#[cfg(feature = "console")]
pub use sinks::ColoredConsoleSink;
#[cfg(feature = "file")]
pub use sinks::FileSink;
