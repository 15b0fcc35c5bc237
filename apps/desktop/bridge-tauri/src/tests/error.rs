// Unit tests for error module
// Tests error serialization (critical for Tauri IPC)

use crate::error::BridgeTauriError;

use bridge_core::CoreError;
use bridge_core::error::StoreError;

use common::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Tests that errors can be serialized (required for Tauri IPC).
///
/// **WHY THIS MATTERS**: Tauri commands must return serializable errors to send them
/// to the webview. If serialization breaks, the webview receives opaque errors.
///
/// **BUG THIS CATCHES**: Would catch removing `#[derive(Serialize)]` or adding a
/// non-serializable field.
#[test]
fn given_invalid_action_error_when_serialized_then_tagged_with_type_and_data() {
    // GIVEN: An InvalidAction error
    let err = BridgeTauriError::InvalidAction {
        message: String::from("cannot dispatch 42"),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN: Serializing to JSON
    let json = serde_json::to_value(&err).expect("Error should be serializable");

    // THEN: Adjacently tagged with the variant name and its fields
    assert_eq!(json["type"], "InvalidAction");
    assert_eq!(json["data"]["message"], "cannot dispatch 42");
    assert!(json["data"]["location"]["line"].is_u64());
}

/// **VALUE**: Core errors keep their message when crossing into the host.
#[test]
fn given_core_error_when_converted_then_message_is_preserved() {
    // GIVEN: A store classification failure from the core
    let core = CoreError::from(StoreError::unrecognized("opaque store"));

    // WHEN: Converting
    let err = BridgeTauriError::from(core);

    // THEN: Core variant carrying the original text
    match err {
        BridgeTauriError::Core { message, .. } => assert!(message.contains("opaque store")),
        other => panic!("expected Core variant, got {other:?}"),
    }
}
