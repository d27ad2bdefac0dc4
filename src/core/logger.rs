//! Core logger: level filter, state normalization, formatting, sink fan-out
//!
//! Failures inside the pipeline are logged through the same pipeline at Warn,
//! one level deep. The outer call reports; the nested (terminal) call only
//! propagates, so a broken formatter or sink can never recurse.

use super::{
    error::{isolate, LoggerError, Result},
    log_level::LogLevel,
    log_record::{EventId, LogRecord},
    loggable::{ErrorRef, PipelineFault},
    scope::{ScopeGuard, ScopeTracker},
    state::{error_message_renderer, renderer, Renderer, State},
    state_mapper::{normalize, StateMapper, TemplateMapper},
};
use crate::formatters::{Formatter, TextFormatter};
use crate::sinks::Sink;
use std::sync::Arc;

const SINK_FAILURES: &str = "One or more errors occurred while writing to log sinks.";
const FLUSH_FAILURES: &str = "One or more errors occurred while flushing log sinks.";

/// The logging facade every logger kind implements
pub trait Log: Send + Sync {
    fn is_enabled(&self, level: LogLevel) -> bool;

    /// Start a scope; it stays active until the returned guard is disposed
    fn begin_scope(&self, state: State) -> Result<ScopeGuard>;

    fn log(
        &self,
        level: LogLevel,
        event_id: EventId,
        state: State,
        error: Option<ErrorRef>,
        renderer: Option<Renderer>,
    ) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallMode {
    /// Caller-initiated; pipeline failures are reported through the pipeline
    Outer,
    /// Failure report; failures propagate and are never reported again
    Terminal,
}

/// One named logger bound to a formatter and its sinks
pub struct Logger {
    name: String,
    min_level: LogLevel,
    formatter: Arc<dyn Formatter>,
    sinks: Vec<Arc<dyn Sink>>,
    state_mapper: Arc<dyn StateMapper>,
    scopes: ScopeTracker,
}

impl Logger {
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn formatter_key(&self) -> &str {
        self.formatter.key()
    }

    pub fn sink_keys(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.key()).collect()
    }

    /// Active scope states, oldest first
    pub fn active_scopes(&self) -> Vec<State> {
        self.scopes.snapshot()
    }

    /// Flush every sink, reporting all failures together
    pub fn flush(&self) -> Result<()> {
        let errors: Vec<Arc<LoggerError>> = self
            .sinks
            .iter()
            .filter_map(|sink| isolate(&sink_label(sink.as_ref()), || sink.flush()).err())
            .map(Arc::new)
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(LoggerError::aggregate(FLUSH_FAILURES, errors))
        }
    }

    fn log_internal(
        &self,
        level: LogLevel,
        event_id: EventId,
        state: State,
        error: Option<ErrorRef>,
        renderer: Option<Renderer>,
        mode: CallMode,
    ) -> Result<()> {
        if !self.is_enabled(level) {
            return Ok(());
        }

        let original = state.clone();
        let (state, renderer) = normalize(self.state_mapper.as_ref(), state, renderer);
        let record = LogRecord::new(&self.name, level)
            .with_event_id(event_id.clone())
            .with_error(error)
            .with_state(state, renderer)
            .with_scopes(self.scopes.snapshot());

        let label = format!("formatter [{}]", self.formatter.key());
        let message = match isolate(&label, || self.formatter.format(&record)) {
            Ok(message) => message,
            Err(err) if mode == CallMode::Outer => {
                return self.report_format_failure(err, &original, event_id);
            }
            Err(err) => return Err(err),
        };

        let mut failures: Vec<Arc<LoggerError>> = Vec::new();
        for sink in &self.sinks {
            let written = isolate(&sink_label(sink.as_ref()), || sink.write(&message, &record));
            let Err(err) = written else { continue };
            let err = Arc::new(err);

            if mode == CallMode::Outer {
                let fault = PipelineFault::sink_failure(sink.key(), Arc::clone(&err));
                if let Err(report_err) = self.log_internal(
                    LogLevel::Warn,
                    event_id.clone(),
                    State::none(),
                    Some(Arc::new(fault)),
                    Some(error_message_renderer()),
                    CallMode::Terminal,
                ) {
                    failures.push(Arc::new(report_err));
                }
            }
            failures.push(err);
        }

        if mode == CallMode::Outer && !failures.is_empty() {
            return Err(LoggerError::aggregate(SINK_FAILURES, failures));
        }
        Ok(())
    }

    fn report_format_failure(
        &self,
        err: LoggerError,
        original: &State,
        event_id: EventId,
    ) -> Result<()> {
        let template = match err {
            LoggerError::Template { .. } => original.original_format(),
            _ => None,
        };
        let fault = PipelineFault::format_failure(Arc::new(err), template);
        self.log_internal(
            LogLevel::Warn,
            event_id,
            State::none(),
            Some(Arc::new(fault)),
            Some(error_message_renderer()),
            CallMode::Terminal,
        )
    }
}

fn sink_label(sink: &dyn Sink) -> String {
    format!("sink [{}]", sink.key())
}

impl Log for Logger {
    fn is_enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::None && level >= self.min_level
    }

    fn begin_scope(&self, state: State) -> Result<ScopeGuard> {
        let display = state.clone();
        let to_text = renderer(move |_, _| Ok(display.to_string()));
        let (scope, _) = normalize(self.state_mapper.as_ref(), state, Some(to_text));
        Ok(self.scopes.begin(scope))
    }

    fn log(
        &self,
        level: LogLevel,
        event_id: EventId,
        state: State,
        error: Option<ErrorRef>,
        renderer: Option<Renderer>,
    ) -> Result<()> {
        self.log_internal(level, event_id, state, error, renderer, CallMode::Outer)
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("min_level", &self.min_level)
            .field("formatter", &self.formatter.key())
            .field("sinks", &self.sink_keys())
            .finish()
    }
}

/// Fluent construction of a [`Logger`]
///
/// Defaults: minimum level Debug, text formatter, template state mapper, no
/// sinks.
pub struct LoggerBuilder {
    name: String,
    min_level: LogLevel,
    formatter: Option<Arc<dyn Formatter>>,
    sinks: Vec<Arc<dyn Sink>>,
    state_mapper: Option<Arc<dyn StateMapper>>,
}

impl LoggerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_level: LogLevel::default(),
            formatter: None,
            sinks: Vec::new(),
            state_mapper: None,
        }
    }

    #[must_use]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use]
    pub fn formatter(self, formatter: impl Formatter + 'static) -> Self {
        self.shared_formatter(Arc::new(formatter))
    }

    #[must_use]
    pub fn shared_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    #[must_use]
    pub fn sink(self, sink: impl Sink + 'static) -> Self {
        self.shared_sink(Arc::new(sink))
    }

    #[must_use]
    pub fn shared_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    #[must_use]
    pub fn state_mapper(self, mapper: impl StateMapper + 'static) -> Self {
        self.shared_state_mapper(Arc::new(mapper))
    }

    #[must_use]
    pub fn shared_state_mapper(mut self, mapper: Arc<dyn StateMapper>) -> Self {
        self.state_mapper = Some(mapper);
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            name: self.name,
            min_level: self.min_level,
            formatter: self
                .formatter
                .unwrap_or_else(|| Arc::new(TextFormatter::new())),
            sinks: self.sinks,
            state_mapper: self
                .state_mapper
                .unwrap_or_else(|| Arc::new(TemplateMapper::default())),
            scopes: ScopeTracker::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::Keyed;
    use crate::core::state_mapper::StructuredValues;
    use crate::core::template::TemplateValues;
    use crate::core::testing::{FailingSink, MemorySink, MessageFormatter, PanickingSink};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn template(text: &str, args: Vec<crate::FieldValue>) -> (State, Option<Renderer>) {
        (
            State::from(TemplateValues::new(text, args)),
            Some(TemplateValues::renderer()),
        )
    }

    fn log_template(logger: &Logger, level: LogLevel, text: &str) -> Result<()> {
        let (state, renderer) = template(text, vec![]);
        logger.log(level, EventId::default(), state, None, renderer)
    }

    #[test]
    fn test_level_filter() {
        let sink = MemorySink::new("memory");
        let logger = Logger::builder("test")
            .min_level(LogLevel::Warn)
            .formatter(MessageFormatter)
            .sink(sink.clone())
            .build();

        assert!(!logger.is_enabled(LogLevel::Info));
        assert!(logger.is_enabled(LogLevel::Error));
        assert!(!logger.is_enabled(LogLevel::None));

        log_template(&logger, LogLevel::Info, "dropped").unwrap();
        log_template(&logger, LogLevel::Error, "kept").unwrap();
        assert_eq!(sink.messages(), vec!["kept"]);
    }

    #[test]
    fn test_record_carries_normalized_state() {
        let sink = MemorySink::new("memory");
        let logger = Logger::builder("test")
            .formatter(MessageFormatter)
            .sink(sink.clone())
            .build();

        let (state, renderer) = template("{Greeting} {Kilo}", vec!["HELLO".into(), 1000.into()]);
        logger
            .log(LogLevel::Info, EventId::new(7), state, None, renderer)
            .unwrap();

        let records = sink.records();
        assert_eq!(sink.messages(), vec!["HELLO 1000"]);
        assert_eq!(records[0].logger, "test");
        assert_eq!(records[0].event_id, Some(EventId::new(7)));
        assert!(records[0].state.downcast_ref::<StructuredValues>().is_some());
    }

    #[test]
    fn test_scopes_are_attached_in_order() {
        let sink = MemorySink::new("memory");
        let logger = Logger::builder("test")
            .formatter(MessageFormatter)
            .sink(sink.clone())
            .build();

        let outer = logger.begin_scope(State::from("Scope 1")).unwrap();
        let inner = logger.begin_scope(State::from("Scope 2")).unwrap();
        log_template(&logger, LogLevel::Info, "inside").unwrap();
        inner.dispose().unwrap();
        log_template(&logger, LogLevel::Info, "outside").unwrap();
        drop(outer);
        log_template(&logger, LogLevel::Info, "none").unwrap();

        let scopes: Vec<Vec<String>> = sink
            .records()
            .iter()
            .map(|r| r.scopes.iter().map(|s| s.to_string()).collect())
            .collect();
        assert_eq!(
            scopes,
            vec![
                vec!["Scope 1".to_string(), "Scope 2".to_string()],
                vec!["Scope 1".to_string()],
                vec![],
            ]
        );
    }

    #[test]
    fn test_sink_failure_is_reported_and_returned() {
        let sink = MemorySink::new("memory");
        let logger = Logger::builder("test")
            .formatter(MessageFormatter)
            .sink(FailingSink("Exceptional!"))
            .sink(sink.clone())
            .build();

        let err = log_template(&logger, LogLevel::Info, "Hello World!").unwrap_err();
        match &err {
            LoggerError::Aggregate { message, errors } => {
                assert_eq!(message, SINK_FAILURES);
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].to_string(), "Exceptional!");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        // The report reaches the healthy sink before the original message
        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].level, LogLevel::Warn);
        let fault = records[0].error.as_ref().unwrap();
        assert_eq!(
            sink.messages(),
            vec![fault.to_string(), "Hello World!".to_string()]
        );
        assert!(fault.to_string().contains("[failing]"));
        assert_eq!(fault.inner_error().unwrap().to_string(), "Exceptional!");
    }

    #[test]
    fn test_sink_panic_is_isolated() {
        let sink = MemorySink::new("memory");
        let logger = Logger::builder("test")
            .formatter(MessageFormatter)
            .sink(PanickingSink)
            .sink(sink.clone())
            .build();

        let err = log_template(&logger, LogLevel::Info, "Hello World!").unwrap_err();
        assert!(matches!(err, LoggerError::Aggregate { .. }));
        assert_eq!(sink.messages().last().map(String::as_str), Some("Hello World!"));
    }

    struct CountingFailingFormatter(AtomicUsize);

    impl Keyed for CountingFailingFormatter {
        fn key(&self) -> &str {
            "counting"
        }
    }

    impl Formatter for CountingFailingFormatter {
        fn format(&self, _record: &LogRecord) -> Result<String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(LoggerError::formatter("counting", "always fails"))
        }
    }

    #[test]
    fn test_formatter_failure_recursion_is_bounded() {
        let formatter = Arc::new(CountingFailingFormatter(AtomicUsize::new(0)));
        let logger = Logger::builder("test")
            .shared_formatter(formatter.clone())
            .sink(MemorySink::new("memory"))
            .build();

        let err = log_template(&logger, LogLevel::Info, "Hello World!").unwrap_err();
        assert!(matches!(err, LoggerError::FormatterError { .. }));
        assert_eq!(formatter.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_malformed_template_reports_format_string() {
        let sink = MemorySink::new("memory");
        let logger = Logger::builder("test")
            .formatter(MessageFormatter)
            .sink(sink.clone())
            .build();

        log_template(&logger, LogLevel::Info, "{Hello").unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, LogLevel::Warn);
        let fault = records[0].error.as_ref().unwrap();
        assert_eq!(
            fault.to_string(),
            "Error formatting log message. Format string: [{Hello]"
        );
        assert_eq!(sink.messages()[0], fault.to_string());
    }

    #[test]
    fn test_flush_reaches_every_sink() {
        let logger = Logger::builder("test")
            .sink(MemorySink::new("a"))
            .sink(MemorySink::new("b"))
            .build();
        logger.flush().unwrap();
        assert_eq!(logger.sink_keys(), vec!["a", "b"]);
        assert_eq!(logger.formatter_key(), "text");
    }
}
