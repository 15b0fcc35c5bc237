// Unit tests for the wire protocol types.

use crate::protocol::{Action, BridgeStatus};

use serde_json::json;

/// **VALUE**: Action objects from a consumer use `type`, not the Rust field name.
///
/// **BUG THIS CATCHES**: Would catch a lost `#[serde(rename = "type")]`, which
/// makes every action from a webview fail to deserialize.
#[test]
fn given_action_json_when_deserialized_then_type_field_maps_to_action_type() {
    // GIVEN: The JSON a consumer sends
    let raw = json!({ "type": "COUNTER:INCREMENT", "payload": 5 });

    // WHEN: Deserializing
    let action: Action = serde_json::from_value(raw).unwrap();

    // THEN: Both fields land
    assert_eq!(action.action_type, "COUNTER:INCREMENT");
    assert_eq!(action.payload, Some(json!(5)));
}

#[test]
fn given_action_without_payload_when_serialized_then_payload_key_is_omitted() {
    let action = Action::new("RESET", None).unwrap();

    let json = serde_json::to_value(&action).unwrap();

    assert_eq!(json, json!({ "type": "RESET" }));
}

/// **VALUE**: An empty action type is rejected at construction.
#[test]
fn given_empty_type_when_creating_action_then_returns_error() {
    let result = Action::new("", None);

    assert!(result.is_err(), "Empty action type must be rejected");
}

#[test]
fn given_non_object_value_when_from_value_then_returns_error() {
    assert!(Action::from_value(&json!(42)).is_err());
    assert!(Action::from_value(&json!({ "payload": 1 })).is_err());
    assert!(Action::from_value(&json!({ "type": 7 })).is_err());
}

#[test]
fn given_object_with_extra_keys_when_from_value_then_extra_keys_are_ignored() {
    let action = Action::from_value(&json!({ "type": "X", "payload": [1], "meta": true })).unwrap();

    assert_eq!(action.action_type, "X");
    assert_eq!(action.payload, Some(json!([1])));
}

#[test]
fn given_status_when_serialized_then_uses_lowercase_name() {
    assert_eq!(serde_json::to_value(BridgeStatus::Ready).unwrap(), json!("ready"));
    assert_eq!(BridgeStatus::default(), BridgeStatus::Uninitialized);
    assert_eq!(BridgeStatus::Initializing.to_string(), "initializing");
}
