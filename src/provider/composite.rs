//! One logical logger built from several sub-loggers

use crate::core::{
    error::{LoggerError, Result},
    log_level::LogLevel,
    log_record::EventId,
    loggable::ErrorRef,
    logger::Log,
    scope::{AggregateDisposable, ScopeGuard},
    state::{Renderer, State},
};
use std::sync::Arc;

/// Fans every call out to all members
///
/// A single failing member's error is returned as is; failures of several
/// members come back as one aggregate.
pub struct CompositeLogger {
    members: Vec<Box<dyn Log>>,
}

impl CompositeLogger {
    pub fn new(members: Vec<Box<dyn Log>>) -> Self {
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

fn combine(message: &str, mut errors: Vec<LoggerError>) -> Result<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(LoggerError::aggregate(
            message,
            errors.into_iter().map(Arc::new).collect(),
        )),
    }
}

impl Log for CompositeLogger {
    fn is_enabled(&self, level: LogLevel) -> bool {
        self.members.iter().any(|m| m.is_enabled(level))
    }

    fn begin_scope(&self, state: State) -> Result<ScopeGuard> {
        let mut guards = Vec::with_capacity(self.members.len());
        let mut errors = Vec::new();
        for member in &self.members {
            match member.begin_scope(state.clone()) {
                Ok(guard) => guards.push(guard),
                Err(err) => errors.push(err),
            }
        }
        // Scopes already started are released by dropping their guards
        combine("One or more loggers failed to begin a scope.", errors)?;
        Ok(ScopeGuard::new(AggregateDisposable::new(guards)))
    }

    fn log(
        &self,
        level: LogLevel,
        event_id: EventId,
        state: State,
        error: Option<ErrorRef>,
        renderer: Option<Renderer>,
    ) -> Result<()> {
        let errors: Vec<LoggerError> = self
            .members
            .iter()
            .filter_map(|member| {
                member
                    .log(
                        level,
                        event_id.clone(),
                        state.clone(),
                        error.clone(),
                        renderer.clone(),
                    )
                    .err()
            })
            .collect();
        combine("One or more loggers failed.", errors)
    }
}
