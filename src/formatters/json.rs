//! Single-object JSON formatter

use super::exception::serialize_error;
use super::Formatter;
use crate::core::{
    error::Result, log_record::LogRecord, registry::Keyed, timestamp::TimestampFormat,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How property names are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NamingPolicy {
    /// `timeStamp`
    #[default]
    CamelCase,
    /// `TimeStamp`
    PascalCase,
    /// `time_stamp`
    SnakeCase,
}

impl NamingPolicy {
    /// Convert a PascalCase property name
    pub fn apply(&self, name: &str) -> String {
        match self {
            NamingPolicy::PascalCase => name.to_string(),
            NamingPolicy::CamelCase => {
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => first.to_lowercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            NamingPolicy::SnakeCase => {
                let mut out = String::with_capacity(name.len() + 4);
                for (i, c) in name.chars().enumerate() {
                    if c.is_uppercase() {
                        if i > 0 {
                            out.push('_');
                        }
                        out.extend(c.to_lowercase());
                    } else {
                        out.push(c);
                    }
                }
                out
            }
        }
    }
}

/// Serializer options for the JSON formatter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JsonOptions {
    pub naming_policy: NamingPolicy,
    /// Omit properties whose value is null
    pub ignore_null: bool,
    /// Pretty-print across multiple lines
    pub indented: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            naming_policy: NamingPolicy::CamelCase,
            ignore_null: true,
            indented: false,
        }
    }
}

/// One JSON object per record
///
/// Properties, in order: TimeStamp, Logger, Level, Message, EventId, State,
/// Exception, Scopes. Scopes is null when no scope is active. Fails when the
/// state or a scope cannot be serialized.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    options: JsonOptions,
    timestamp_format: TimestampFormat,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new(JsonOptions::default())
    }
}

impl JsonFormatter {
    pub fn new(options: JsonOptions) -> Self {
        Self {
            options,
            timestamp_format: TimestampFormat::Rfc3339Micros,
        }
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn options(&self) -> &JsonOptions {
        &self.options
    }

    fn insert(&self, object: &mut Map<String, Value>, name: &str, value: Value) {
        if value.is_null() && self.options.ignore_null {
            return;
        }
        object.insert(self.options.naming_policy.apply(name), value);
    }

    fn timestamp(&self, record: &LogRecord) -> Value {
        if self.timestamp_format.is_numeric() {
            Value::Number(record.timestamp.timestamp_millis().into())
        } else {
            Value::String(self.timestamp_format.format(&record.timestamp))
        }
    }
}

impl Keyed for JsonFormatter {
    fn key(&self) -> &str {
        "json"
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &LogRecord) -> Result<String> {
        let mut object = Map::new();

        self.insert(&mut object, "TimeStamp", self.timestamp(record));
        self.insert(&mut object, "Logger", Value::String(record.logger.clone()));
        self.insert(
            &mut object,
            "Level",
            Value::String(record.level.to_str().to_string()),
        );
        self.insert(
            &mut object,
            "Message",
            record.render()?.map(Value::String).unwrap_or(Value::Null),
        );

        let event_id = match &record.event_id {
            Some(event_id) => {
                let mut id = Map::new();
                self.insert(&mut id, "Id", Value::Number(event_id.id.into()));
                self.insert(
                    &mut id,
                    "Name",
                    event_id.name.clone().map(Value::String).unwrap_or(Value::Null),
                );
                Value::Object(id)
            }
            None => Value::Null,
        };
        self.insert(&mut object, "EventId", event_id);

        self.insert(&mut object, "State", record.state.to_json()?);

        let exception = match &record.error {
            Some(error) => serialize_error(error.as_ref(), &self.options),
            None => Value::Null,
        };
        self.insert(&mut object, "Exception", exception);

        let scopes = if record.scopes.is_empty() {
            Value::Null
        } else {
            Value::Array(
                record
                    .scopes
                    .iter()
                    .map(|scope| scope.to_json())
                    .collect::<Result<Vec<_>>>()?,
            )
        };
        self.insert(&mut object, "Scopes", scopes);

        let object = Value::Object(object);
        let json = if self.options.indented {
            serde_json::to_string_pretty(&object)?
        } else {
            serde_json::to_string(&object)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::LoggerError;
    use crate::core::log_level::LogLevel;
    use crate::core::log_record::EventId;
    use crate::core::state::{renderer, State, Structured};
    use serde::Serializer;
    use std::sync::Arc;

    fn record() -> LogRecord {
        LogRecord::new("Tests", LogLevel::Info).with_state(
            State::from("Hello World!"),
            Some(renderer(|state, _| Ok(state.to_string()))),
        )
    }

    fn parse(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_property_order_and_nulls() {
        let json = JsonFormatter::default().format(&record()).unwrap();
        let value = parse(&json);
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["timeStamp", "logger", "level", "message", "state"]);
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["message"], "Hello World!");
        assert_eq!(value["state"], "Hello World!");
    }

    #[test]
    fn test_event_id_and_scopes() {
        let rec = record()
            .with_event_id(EventId::named(42, "startup"))
            .with_scopes(vec![State::from("Scope 1"), State::from("Scope 2")]);
        let value = parse(&JsonFormatter::default().format(&rec).unwrap());
        assert_eq!(value["eventId"]["id"], 42);
        assert_eq!(value["eventId"]["name"], "startup");
        assert_eq!(value["scopes"], serde_json::json!(["Scope 1", "Scope 2"]));
    }

    #[test]
    fn test_exception_is_described() {
        let rec = record().with_error(Some(Arc::new(LoggerError::other("Exceptional!"))));
        let value = parse(&JsonFormatter::default().format(&rec).unwrap());
        assert_eq!(value["exception"]["type"], "scyber_log::LoggerError::Other");
        assert_eq!(value["exception"]["message"], "Exceptional!");
    }

    #[test]
    fn test_pascal_case_and_indented() {
        let formatter = JsonFormatter::new(JsonOptions {
            naming_policy: NamingPolicy::PascalCase,
            ignore_null: false,
            indented: true,
        });
        let json = formatter.format(&record()).unwrap();
        assert!(json.contains('\n'));
        let value = parse(&json);
        assert_eq!(value["Logger"], "Tests");
        assert_eq!(value["Scopes"], Value::Null);
        assert!(value.as_object().unwrap().contains_key("Exception"));
    }

    #[derive(Debug)]
    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot serialize"))
        }
    }

    #[test]
    fn test_unserializable_state_fails() {
        let rec = record().with_state(State::new(Structured(Unserializable)), None);
        assert!(JsonFormatter::default().format(&rec).is_err());
    }

    #[test]
    fn test_naming_policies() {
        assert_eq!(NamingPolicy::CamelCase.apply("TimeStamp"), "timeStamp");
        assert_eq!(NamingPolicy::PascalCase.apply("TimeStamp"), "TimeStamp");
        assert_eq!(NamingPolicy::SnakeCase.apply("TimeStamp"), "time_stamp");
        assert_eq!(NamingPolicy::CamelCase.apply(""), "");
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: JsonOptions = serde_json::from_str(r#"{"namingPolicy":"snakeCase"}"#).unwrap();
        assert_eq!(options.naming_policy, NamingPolicy::SnakeCase);
        assert!(options.ignore_null);
        assert!(!options.indented);
    }
}
