//! Fault isolation around one sub-logger

use crate::core::{
    error::{isolate, Result},
    log_level::LogLevel,
    log_record::EventId,
    loggable::ErrorRef,
    logger::Log,
    scope::ScopeGuard,
    state::{Renderer, State},
};
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};

/// Wraps a logger so its failures, panics included, either surface as
/// errors or vanish
///
/// With `throw_errors` off a failed `log` returns `Ok`, a failed
/// `begin_scope` returns a guard that releases nothing and a failed
/// `is_enabled` reports `false`.
pub struct FaultIsolatedLogger {
    inner: Box<dyn Log>,
    throw_errors: bool,
}

impl FaultIsolatedLogger {
    pub fn new(inner: impl Log + 'static, throw_errors: bool) -> Self {
        Self {
            inner: Box::new(inner),
            throw_errors,
        }
    }

    pub fn throws_errors(&self) -> bool {
        self.throw_errors
    }
}

impl Log for FaultIsolatedLogger {
    fn is_enabled(&self, level: LogLevel) -> bool {
        match catch_unwind(AssertUnwindSafe(|| self.inner.is_enabled(level))) {
            Ok(enabled) => enabled,
            Err(panic_info) if self.throw_errors => resume_unwind(panic_info),
            Err(_) => false,
        }
    }

    fn begin_scope(&self, state: State) -> Result<ScopeGuard> {
        match isolate("logger", || self.inner.begin_scope(state)) {
            Ok(guard) => Ok(guard),
            Err(err) if self.throw_errors => Err(err),
            Err(_) => Ok(ScopeGuard::noop()),
        }
    }

    fn log(
        &self,
        level: LogLevel,
        event_id: EventId,
        state: State,
        error: Option<ErrorRef>,
        renderer: Option<Renderer>,
    ) -> Result<()> {
        match isolate("logger", || {
            self.inner.log(level, event_id, state, error, renderer)
        }) {
            Err(err) if self.throw_errors => Err(err),
            _ => Ok(()),
        }
    }
}
