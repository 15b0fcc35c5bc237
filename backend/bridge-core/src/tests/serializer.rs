use crate::serializer::{sanitize, to_wire};
use crate::value::StateValue;

use serde_json::json;

fn noop() -> StateValue {
    StateValue::function(|_| Ok(()))
}

fn nested_state() -> StateValue {
    StateValue::object([
        ("counter", StateValue::from(json!(3))),
        ("increment", noop()),
        (
            "settings",
            StateValue::object([
                ("theme", StateValue::from(json!("dark"))),
                ("toggle", noop()),
                ("deep", StateValue::object([("reset", noop())])),
            ]),
        ),
        (
            "items",
            StateValue::Array(vec![StateValue::from(json!(1)), noop()]),
        ),
    ])
}

/// **VALUE**: Function-valued object properties never reach a consumer.
///
/// **WHY THIS MATTERS**: Handlers embedded in state cannot be encoded. A leaked
/// one would show up as a meaningless `null` key in every webview.
///
/// **BUG THIS CATCHES**: Would catch sanitization that only strips the top
/// level and forgets nested objects.
#[test]
fn given_nested_functions_when_sanitized_then_object_functions_are_dropped_at_every_depth() {
    // GIVEN: State with functions at the top level and two levels down
    let state = nested_state();

    // WHEN: Sanitizing
    let clean = sanitize(&state);

    // THEN: No function-valued object key survives
    assert!(clean.get("increment").is_none());
    let settings = clean.get("settings").unwrap();
    assert!(settings.get("toggle").is_none());
    assert_eq!(settings.get("theme"), Some(&StateValue::from(json!("dark"))));
    assert_eq!(settings.get("deep"), Some(&StateValue::Object(Default::default())));
}

/// **VALUE**: Arrays are copied verbatim, functions included.
///
/// **WHY THIS MATTERS**: Existing consumers index into arrays by position;
/// dropping an element would shift every later index.
#[test]
fn given_function_inside_array_when_sanitized_then_element_is_kept() {
    // GIVEN: An array holding a number and a function
    let state = nested_state();

    // WHEN: Sanitizing and encoding
    let clean = sanitize(&state);
    let wire = to_wire(&state);

    // THEN: The array keeps both elements; on the wire the function is null
    match clean.get("items") {
        Some(StateValue::Array(items)) => {
            assert_eq!(items.len(), 2);
            assert!(items[1].is_callable());
        }
        other => panic!("expected array, got {other:?}"),
    }
    assert_eq!(wire["items"], json!([1, null]));
}

#[test]
fn given_any_state_when_sanitized_twice_then_same_as_once() {
    let state = nested_state();

    let once = sanitize(&state);
    let twice = sanitize(&once);

    assert_eq!(once, twice);
}

/// **VALUE**: Sanitizing is non-destructive.
///
/// **BUG THIS CATCHES**: Would catch an in-place implementation that strips
/// handlers out of the live store state.
#[test]
fn given_state_when_sanitized_then_input_is_untouched() {
    // GIVEN: State with a handler
    let state = nested_state();
    let before = state.clone();

    // WHEN: Sanitizing
    let _ = sanitize(&state);

    // THEN: The original still holds its handler
    assert_eq!(state, before);
    assert!(state.get("increment").unwrap().is_callable());
}

#[test]
fn given_primitives_when_sanitized_then_pass_through() {
    for value in [json!(null), json!(true), json!(42), json!("text")] {
        let state = StateValue::from(value.clone());

        assert_eq!(to_wire(&state), value);
    }
}

/// **VALUE**: Objects nested in arrays lose function keys on the wire, the
/// same way a JSON encoder omits them.
///
/// **BUG THIS CATCHES**: Would catch a handler inside an array element turning
/// into a `"key": null` entry in every consumer.
#[test]
fn given_object_with_function_inside_array_when_encoded_then_function_key_is_omitted() {
    // GIVEN: An array element that is an object holding a handler
    let state = StateValue::object([(
        "rows",
        StateValue::Array(vec![StateValue::object([
            ("id", StateValue::from(json!(1))),
            ("select", noop()),
        ])]),
    )]);

    // WHEN: Encoding, both directly and through serde
    let wire = to_wire(&state);
    let serialized = serde_json::to_value(&state).unwrap();

    // THEN: The handler key is absent, not null
    assert_eq!(wire, json!({ "rows": [{ "id": 1 }] }));
    assert_eq!(serialized, wire);
}
