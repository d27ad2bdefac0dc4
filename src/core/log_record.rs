//! The record handed to formatters and sinks

use super::error::Result;
use super::log_level::LogLevel;
use super::loggable::ErrorRef;
use super::state::{Renderer, State};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric id and optional name identifying a kind of event
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId {
    pub id: i32,
    pub name: Option<String>,
}

impl EventId {
    pub fn new(id: i32) -> Self {
        Self { id, name: None }
    }

    pub fn named(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }

    /// Zero id and no (or empty) name
    pub fn is_empty(&self) -> bool {
        self.id == 0 && self.name.as_deref().map_or(true, str::is_empty)
    }
}

impl From<i32> for EventId {
    fn from(id: i32) -> Self {
        EventId::new(id)
    }
}

/// One log call, as seen by formatters and sinks
#[derive(Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub logger: String,
    pub level: LogLevel,
    pub event_id: Option<EventId>,
    pub error: Option<ErrorRef>,
    pub state: State,
    pub renderer: Option<Renderer>,
    /// Active scope states, oldest first
    pub scopes: Vec<State>,
}

impl LogRecord {
    pub fn new(logger: impl Into<String>, level: LogLevel) -> Self {
        Self {
            timestamp: Local::now(),
            logger: logger.into(),
            level,
            event_id: None,
            error: None,
            state: State::none(),
            renderer: None,
            scopes: Vec::new(),
        }
    }

    /// Keeps the id only when it is not empty
    #[must_use]
    pub fn with_event_id(mut self, event_id: EventId) -> Self {
        self.event_id = (!event_id.is_empty()).then_some(event_id);
        self
    }

    #[must_use]
    pub fn with_error(mut self, error: Option<ErrorRef>) -> Self {
        self.error = error;
        self
    }

    #[must_use]
    pub fn with_state(mut self, state: State, renderer: Option<Renderer>) -> Self {
        self.state = state;
        self.renderer = renderer;
        self
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<State>) -> Self {
        self.scopes = scopes;
        self
    }

    /// The rendered message, or `None` when the record has no renderer
    pub fn render(&self) -> Result<Option<String>> {
        match &self.renderer {
            Some(render) => render(&self.state, self.error.as_deref()).map(Some),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogRecord")
            .field("timestamp", &self.timestamp)
            .field("logger", &self.logger)
            .field("level", &self.level)
            .field("event_id", &self.event_id)
            .field("error", &self.error.as_ref().map(|e| e.to_string()))
            .field("state", &self.state)
            .field("has_renderer", &self.renderer.is_some())
            .field("scopes", &self.scopes)
            .finish()
    }
}
