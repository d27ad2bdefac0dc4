//! Normalization of template-shaped state into serializable form
//!
//! States produced by message templates are a flat list of pairs that JSON
//! output cannot use directly. A [`StateMapper`] replaces them with
//! [`StructuredValues`] and binds the caller's renderer to the original state
//! so the text message still renders the way the caller asked.

use super::error::Result;
use super::field_value::FieldValue;
use super::state::{renderer, KeyValueList, LogState, Renderer, State, ORIGINAL_FORMAT_KEY};
use std::fmt;

/// Result of normalizing one state
pub enum Normalized {
    /// Replacement state (possibly empty) and a renderer bound to the original
    Wrapped {
        state: State,
        renderer: Option<Renderer>,
    },
    /// State left untouched
    Passthrough,
}

/// Pluggable state normalizer
pub trait StateMapper: Send + Sync {
    fn map(&self, state: &State, renderer: Option<&Renderer>) -> Normalized;
}

/// Apply a mapper, keeping the inputs when it passes the state through
pub fn normalize(
    mapper: &dyn StateMapper,
    state: State,
    renderer: Option<Renderer>,
) -> (State, Option<Renderer>) {
    match mapper.map(&state, renderer.as_ref()) {
        Normalized::Wrapped { state, renderer } => (state, renderer),
        Normalized::Passthrough => (state, renderer),
    }
}

/// Serializable replacement for a template-shaped state
///
/// `data` holds the named values, `values` the arguments that matched no
/// placeholder. Either is `None` when it would be empty.
#[derive(Debug, Clone)]
pub struct StructuredValues {
    data: Option<Vec<(String, FieldValue)>>,
    values: Option<Vec<FieldValue>>,
    original: State,
}

impl StructuredValues {
    pub fn from_key_values(
        source: &dyn KeyValueList,
        include_original_format: bool,
        original: State,
    ) -> Self {
        let mut data: Vec<(String, FieldValue)> = Vec::new();
        for (key, value) in source.pairs() {
            if key == ORIGINAL_FORMAT_KEY && !include_original_format {
                continue;
            }
            // First binding of a repeated placeholder wins
            if data.iter().any(|(k, _)| k == key) {
                continue;
            }
            data.push((key.clone(), value.clone()));
        }

        let named: Vec<&FieldValue> = source.pairs().iter().map(|(_, v)| v).collect();
        let mut values: Vec<FieldValue> = Vec::new();
        for value in source.raw_values() {
            if named.contains(&value) || values.contains(value) {
                continue;
            }
            values.push(value.clone());
        }

        Self {
            data: (!data.is_empty()).then_some(data),
            values: (!values.is_empty()).then_some(values),
            original,
        }
    }

    pub fn data(&self) -> Option<&[(String, FieldValue)]> {
        self.data.as_deref()
    }

    pub fn values(&self) -> Option<&[FieldValue]> {
        self.values.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_none() && self.values.is_none()
    }
}

impl fmt::Display for StructuredValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

impl LogState for StructuredValues {
    fn to_json(&self) -> Result<serde_json::Value> {
        let mut object = serde_json::Map::new();
        if let Some(data) = &self.data {
            object.insert(
                "data".to_string(),
                serde_json::Value::Object(
                    data.iter()
                        .map(|(k, v)| (k.clone(), v.to_json_value()))
                        .collect(),
                ),
            );
        }
        if let Some(values) = &self.values {
            object.insert(
                "values".to_string(),
                serde_json::Value::Array(values.iter().map(FieldValue::to_json_value).collect()),
            );
        }
        Ok(serde_json::Value::Object(object))
    }
}

/// Default mapper: wraps states that end in an `{OriginalFormat}` pair
#[derive(Debug, Clone, Default)]
pub struct TemplateMapper {
    include_original_format: bool,
}

impl TemplateMapper {
    pub fn new(include_original_format: bool) -> Self {
        Self {
            include_original_format,
        }
    }
}

impl StateMapper for TemplateMapper {
    fn map(&self, state: &State, original_renderer: Option<&Renderer>) -> Normalized {
        let Some(source) = state.as_key_value_list() else {
            return Normalized::Passthrough;
        };
        if !matches!(source.pairs().last(), Some((key, _)) if key == ORIGINAL_FORMAT_KEY) {
            return Normalized::Passthrough;
        }

        let wrapped =
            StructuredValues::from_key_values(source, self.include_original_format, state.clone());
        let replacement = if wrapped.is_empty() {
            State::none()
        } else {
            State::new(wrapped)
        };

        let bound = original_renderer.map(|render| {
            let render = render.clone();
            let original = state.clone();
            renderer(move |_, error| render(&original, error))
        });

        Normalized::Wrapped {
            state: replacement,
            renderer: bound,
        }
    }
}
