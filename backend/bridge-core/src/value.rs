//! In-process state tree.
//!
//! Backend state may embed its own action handlers as object properties, so
//! the tree needs a function leaf that JSON cannot express. [`StateValue`]
//! is `serde_json::Value` plus [`StateValue::Function`]. Nothing holding a
//! function may cross the process boundary; see [`crate::serializer`].

use crate::error::BoxError;

use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter, Result as FormatResult};
use std::sync::Arc;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

pub type StateObject = BTreeMap<String, StateValue>;

type CallableFn = dyn Fn(Option<Value>) -> Result<(), BoxError> + Send + Sync;

/// A handler living inside backend state.
///
/// Receives the action payload. Equality is pointer identity.
#[derive(Clone)]
pub struct Callable(Arc<CallableFn>);

impl Callable {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(Option<Value>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self(Arc::new(handler))
    }

    pub fn call(&self, payload: Option<Value>) -> Result<(), BoxError> {
        (self.0)(payload)
    }
}

impl Debug for Callable {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        write!(f, "Callable({:p})", Arc::as_ptr(&self.0))
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum StateValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<StateValue>),
    Object(StateObject),
    Function(Callable),
}

impl StateValue {
    pub fn function<F>(handler: F) -> Self
    where
        F: Fn(Option<Value>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        StateValue::Function(Callable::new(handler))
    }

    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, StateValue)>,
        K: Into<String>,
    {
        StateValue::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.as_object().and_then(|object| object.get(key))
    }

    pub fn as_object(&self) -> Option<&StateObject> {
        match self {
            StateValue::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            StateValue::Function(callable) => Some(callable),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, StateValue::Function(_))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            StateValue::Number(number) => number.as_i64(),
            _ => None,
        }
    }

    /// Lossy conversion to JSON, the way a JSON encoder treats functions:
    /// object keys holding one are omitted, array elements become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            StateValue::Null | StateValue::Function(_) => Value::Null,
            StateValue::Bool(flag) => Value::Bool(*flag),
            StateValue::Number(number) => Value::Number(number.clone()),
            StateValue::String(text) => Value::String(text.clone()),
            StateValue::Array(items) => Value::Array(items.iter().map(StateValue::to_json).collect()),
            StateValue::Object(object) => Value::Object(
                object
                    .iter()
                    .filter(|(_, value)| !value.is_callable())
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

impl From<Value> for StateValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => StateValue::Null,
            Value::Bool(flag) => StateValue::Bool(flag),
            Value::Number(number) => StateValue::Number(number),
            Value::String(text) => StateValue::String(text),
            Value::Array(items) => StateValue::Array(items.into_iter().map(StateValue::from).collect()),
            Value::Object(object) => StateValue::Object(
                object
                    .into_iter()
                    .map(|(key, value)| (key, StateValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Callable> for StateValue {
    fn from(callable: Callable) -> Self {
        StateValue::Function(callable)
    }
}

impl Serialize for StateValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            StateValue::Null | StateValue::Function(_) => serializer.serialize_unit(),
            StateValue::Bool(flag) => serializer.serialize_bool(*flag),
            StateValue::Number(number) => number.serialize(serializer),
            StateValue::String(text) => serializer.serialize_str(text),
            StateValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            StateValue::Object(object) => {
                let mut map = serializer.serialize_map(None)?;
                for (key, value) in object.iter().filter(|(_, value)| !value.is_callable()) {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}
