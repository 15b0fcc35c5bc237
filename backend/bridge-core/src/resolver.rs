//! Action type to handler lookup.

use crate::value::{Callable, StateObject, StateValue};

/// Handlers keyed by action type. Values are either callables or nested
/// groups addressed with dot paths (`"counter.increment"`).
pub type HandlerMap = StateObject;

/// Find the handler for `action_type`.
///
/// Tried in order, first hit wins:
/// 1. exact key
/// 2. case-insensitive key
/// 3. dot path, case-insensitive at every level
///
/// Only callables are returned. A missing key or a non-object intermediate
/// yields `None`.
pub fn resolve_handler(handlers: &HandlerMap, action_type: &str) -> Option<Callable> {
    if let Some(StateValue::Function(handler)) = handlers.get(action_type) {
        return Some(handler.clone());
    }

    if let Some(handler) = find_ignore_case(handlers, action_type).and_then(StateValue::as_callable) {
        return Some(handler.clone());
    }

    if action_type.contains('.') {
        return resolve_path(handlers, action_type);
    }

    None
}

fn resolve_path(handlers: &HandlerMap, action_type: &str) -> Option<Callable> {
    let mut segments = action_type.split('.');
    let first = segments.next()?;
    let mut current = find_ignore_case(handlers, first)?;

    for segment in segments {
        current = find_ignore_case(current.as_object()?, segment)?;
    }

    current.as_callable().cloned()
}

fn find_ignore_case<'a>(object: &'a StateObject, key: &str) -> Option<&'a StateValue> {
    let wanted = key.to_lowercase();
    object
        .iter()
        .find(|(candidate, _)| candidate.to_lowercase() == wanted)
        .map(|(_, value)| value)
}
