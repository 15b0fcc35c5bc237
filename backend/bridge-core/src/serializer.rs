//! Snapshot sanitization.
//!
//! Object properties holding functions are dropped at every depth. Arrays are
//! copied verbatim, function elements included; when a snapshot is encoded
//! those elements become `null`, and objects nested inside such arrays lose
//! their function-valued keys at encoding time. The asymmetry is kept for compatibility with
//! existing consumers (see DESIGN.md).

use crate::value::{StateObject, StateValue};

use log::trace;
use serde_json::Value;

/// Return a copy of `value` with every function-valued object property removed.
///
/// Pure: the input is never modified. Applying it twice gives the same result
/// as applying it once.
pub fn sanitize(value: &StateValue) -> StateValue {
    match value {
        StateValue::Object(object) => StateValue::Object(sanitize_object(object)),
        other => other.clone(),
    }
}

fn sanitize_object(object: &StateObject) -> StateObject {
    object
        .iter()
        .filter_map(|(key, value)| {
            if value.is_callable() {
                trace!("Skipping function-valued field '{key}' during sanitization");
                None
            } else {
                Some((key.clone(), sanitize(value)))
            }
        })
        .collect()
}

/// Sanitize and encode a state tree for the process boundary.
pub fn to_wire(value: &StateValue) -> Value {
    sanitize(value).to_json()
}
