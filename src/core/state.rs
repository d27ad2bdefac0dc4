//! Caller-supplied log state and the renderers that turn it into text

use super::error::Result;
use super::field_value::FieldValue;
use super::loggable::LoggableError;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Key of the synthetic pair that closes a message-template argument list
pub const ORIGINAL_FORMAT_KEY: &str = "{OriginalFormat}";

/// Renders a state (and the error logged with it) into the log message
pub type Renderer = Arc<dyn Fn(&State, Option<&dyn LoggableError>) -> Result<String> + Send + Sync>;

/// Wrap a closure as a [`Renderer`]
pub fn renderer<F>(f: F) -> Renderer
where
    F: Fn(&State, Option<&dyn LoggableError>) -> Result<String> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Renderer that ignores the state and prints the error's message
pub fn error_message_renderer() -> Renderer {
    renderer(|_, error| Ok(error.map(|e| e.to_string()).unwrap_or_default()))
}

/// Capability: a state that is an ordered list of key/value pairs
///
/// Message-template expansion produces this shape: one pair per placeholder,
/// closed by a pair keyed [`ORIGINAL_FORMAT_KEY`] holding the template text.
pub trait KeyValueList {
    fn pairs(&self) -> &[(String, FieldValue)];

    /// Every argument supplied to the template, used or not
    fn raw_values(&self) -> &[FieldValue];
}

#[doc(hidden)]
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Arbitrary state attached to a log call
pub trait LogState: AsAny + fmt::Debug + fmt::Display + Send + Sync {
    /// Structured form used by JSON output; may fail for unserializable states
    fn to_json(&self) -> Result<serde_json::Value>;

    fn as_key_value_list(&self) -> Option<&dyn KeyValueList> {
        None
    }
}

/// Optional, shared caller state
#[derive(Clone, Default)]
pub struct State(Option<Arc<dyn LogState>>);

impl State {
    pub fn none() -> Self {
        State(None)
    }

    pub fn new<T: LogState + 'static>(value: T) -> Self {
        State(Some(Arc::new(value)))
    }

    pub fn from_arc(value: Arc<dyn LogState>) -> Self {
        State(Some(value))
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    pub fn get(&self) -> Option<&dyn LogState> {
        self.0.as_deref()
    }

    pub fn downcast_ref<T: LogState + 'static>(&self) -> Option<&T> {
        self.get().and_then(|s| s.as_any().downcast_ref::<T>())
    }

    pub fn as_key_value_list(&self) -> Option<&dyn KeyValueList> {
        self.get().and_then(|s| s.as_key_value_list())
    }

    /// Template text of a key/value-list state, if it carries one
    pub fn original_format(&self) -> Option<String> {
        let (key, value) = self.as_key_value_list()?.pairs().last()?;
        (key == ORIGINAL_FORMAT_KEY).then(|| value.to_string())
    }

    /// True when both handles share the same underlying value (or both are empty)
    pub fn ptr_eq(&self, other: &State) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        match self.get() {
            Some(state) => state.to_json(),
            None => Ok(serde_json::Value::Null),
        }
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(state) => write!(f, "State({:?})", state),
            None => write!(f, "State(None)"),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(state) => write!(f, "{}", state),
            None => Ok(()),
        }
    }
}

impl LogState for String {
    fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::Value::String(self.clone()))
    }
}

impl LogState for &'static str {
    fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::Value::String(self.to_string()))
    }
}

impl LogState for FieldValue {
    fn to_json(&self) -> Result<serde_json::Value> {
        Ok(self.to_json_value())
    }
}

impl LogState for serde_json::Value {
    fn to_json(&self) -> Result<serde_json::Value> {
        Ok(self.clone())
    }
}

/// State backed by any serializable value
///
/// Displays as compact JSON; a value whose `Serialize` impl fails makes the
/// JSON formatter fail, which the logger reports through its recovery path.
#[derive(Debug, Clone)]
pub struct Structured<T>(pub T);

impl<T> fmt::Display for Structured<T>
where
    T: Serialize + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}

impl<T> LogState for Structured<T>
where
    T: Serialize + fmt::Debug + Send + Sync + 'static,
{
    fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(&self.0)?)
    }
}

impl From<&'static str> for State {
    fn from(s: &'static str) -> Self {
        State::new(s)
    }
}

impl From<String> for State {
    fn from(s: String) -> Self {
        State::new(s)
    }
}

impl From<FieldValue> for State {
    fn from(value: FieldValue) -> Self {
        State::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state() {
        let state = State::none();
        assert!(state.is_none());
        assert_eq!(state.to_string(), "");
        assert_eq!(state.to_json().unwrap(), serde_json::Value::Null);
        assert!(state.ptr_eq(&State::default()));
    }

    #[test]
    fn test_clone_shares_value() {
        let state = State::from("Hello World!");
        let copy = state.clone();
        assert!(state.ptr_eq(&copy));
        assert!(!state.ptr_eq(&State::from("Hello World!")));
        assert_eq!(copy.downcast_ref::<&'static str>(), Some(&"Hello World!"));
    }

    #[test]
    fn test_structured_state() {
        #[derive(Debug, Serialize)]
        struct Message {
            message: &'static str,
        }

        let state = State::new(Structured(Message {
            message: "Hello World!",
        }));
        assert_eq!(state.to_string(), r#"{"message":"Hello World!"}"#);
        assert_eq!(
            state.to_json().unwrap(),
            serde_json::json!({"message": "Hello World!"})
        );
        assert!(state.as_key_value_list().is_none());
        assert!(state.original_format().is_none());
    }

    #[test]
    fn test_error_message_renderer() {
        let render = error_message_renderer();
        let err = crate::core::error::LoggerError::other("Exceptional!");
        assert_eq!(render(&State::none(), Some(&err)).unwrap(), "Exceptional!");
        assert_eq!(render(&State::none(), None).unwrap(), "");
    }
}
