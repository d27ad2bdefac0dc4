//! Structured description of attached errors
//!
//! Field order is fixed: Type, Message, StackTrace, then InnerException (or
//! InnerExceptions for aggregates), then the error's own fields. Reading any
//! part of an error may fail; the failure is recorded in place of the value.

use super::json::JsonOptions;
use crate::core::error::panic_message;
use crate::core::loggable::{ErrorFields, LoggableError};
use serde_json::{Map, Value};
use std::error::Error;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Inner errors nested deeper than this are omitted
const MAX_DEPTH: usize = 32;

/// Describe `error` as a JSON object using the given naming and null policy
pub fn serialize_error(error: &dyn LoggableError, options: &JsonOptions) -> Value {
    describe(error, options, 0)
}

fn describe(error: &dyn LoggableError, options: &JsonOptions, depth: usize) -> Value {
    let mut object = Map::new();
    let mut put = |name: &str, value: Value| insert(&mut object, options, name, value);

    put("Type", read_property(|| Value::String(error.type_name())));
    put("Message", read_property(|| Value::String(error.to_string())));
    put(
        "StackTrace",
        read_property(|| error.stack_trace().map(Value::String).unwrap_or(Value::Null)),
    );

    if depth < MAX_DEPTH {
        let members = read_optional(|| error.inner_errors());
        match members {
            Ok(Some(members)) => {
                let described = members
                    .into_iter()
                    .map(|member| describe(member, options, depth + 1))
                    .collect();
                put("InnerExceptions", Value::Array(described));
            }
            Ok(None) => {
                let inner = read_property(|| match error.inner_error() {
                    Some(inner) => describe(inner, options, depth + 1),
                    None => match error.source() {
                        Some(source) => describe_source(source, options, depth + 1),
                        None => Value::Null,
                    },
                });
                put("InnerException", inner);
            }
            Err(message) => put("InnerExceptions", Value::String(message)),
        }
    }

    let mut fields = ErrorFields::new();
    match catch_unwind(AssertUnwindSafe(|| error.visit_fields(&mut fields))) {
        Ok(()) => {
            for (name, value) in fields.serializable() {
                put(name, value);
            }
        }
        Err(panic_info) => put(
            "Fields",
            Value::String(format!(
                "Error reading property; {}",
                panic_message(panic_info.as_ref())
            )),
        ),
    }

    Value::Object(object)
}

// Plain std errors reached through `source()` carry only a message.
fn describe_source(error: &(dyn Error + 'static), options: &JsonOptions, depth: usize) -> Value {
    let mut object = Map::new();
    insert(
        &mut object,
        options,
        "Type",
        Value::String("dyn std::error::Error".to_string()),
    );
    insert(
        &mut object,
        options,
        "Message",
        read_property(|| Value::String(error.to_string())),
    );
    if depth < MAX_DEPTH {
        let inner = match error.source() {
            Some(source) => describe_source(source, options, depth + 1),
            None => Value::Null,
        };
        insert(&mut object, options, "InnerException", inner);
    }
    Value::Object(object)
}

fn insert(object: &mut Map<String, Value>, options: &JsonOptions, name: &str, value: Value) {
    if value.is_null() && options.ignore_null {
        return;
    }
    object.insert(options.naming_policy.apply(name), value);
}

fn read_property(read: impl FnOnce() -> Value) -> Value {
    catch_unwind(AssertUnwindSafe(read)).unwrap_or_else(|panic_info| {
        Value::String(format!(
            "Error reading property; {}",
            panic_message(panic_info.as_ref())
        ))
    })
}

fn read_optional<T>(read: impl FnOnce() -> T) -> std::result::Result<T, String> {
    catch_unwind(AssertUnwindSafe(read)).map_err(|panic_info| {
        format!(
            "Error reading property; {}",
            panic_message(panic_info.as_ref())
        )
    })
}
