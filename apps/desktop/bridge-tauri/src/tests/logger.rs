// Unit tests for logger module initialization logic
// Tests focus on thread-safety and error handling

use crate::error::BridgeTauriError;
use crate::logger::{initialize, initialize_internal};

use std::path::PathBuf;

use tempfile::TempDir;

/// **VALUE**: Verifies that calling initialize() multiple times doesn't panic or fail.
///
/// **WHY THIS MATTERS**: The plugin can install the logger during setup while the
/// app may also call it. A second call must not crash startup.
///
/// **BUG THIS CATCHES**: Would catch if the Once or AtomicBool guards are removed,
/// causing fern to fail when trying to set a global logger twice.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN: A valid temporary directory
    let temp_dir = TempDir::new().unwrap();

    // WHEN: Calling initialize twice
    let result1 = initialize(temp_dir.path());
    let result2 = initialize(temp_dir.path());

    // THEN: Both return Ok and the log file exists
    assert!(result1.is_ok(), "First initialization should succeed");
    assert!(
        result2.is_ok(),
        "Second initialization should succeed (idempotent)"
    );
    assert!(temp_dir.path().join("statebridge.log").exists());
}

/// **VALUE**: Verifies that an unusable log directory is an error, not a panic.
///
/// **BUG THIS CATCHES**: Would catch `fern::log_file()` being unwrapped.
#[test]
fn given_invalid_log_dir_when_initializing_then_returns_host_error() {
    // GIVEN: A path that cannot hold a file on Unix-like systems
    let invalid_dir = PathBuf::from("/dev/null/invalid-path");

    // WHEN: Building the dispatch for it
    let result = initialize_internal(&invalid_dir);

    // THEN: Host error, no panic
    assert!(
        matches!(result, Err(BridgeTauriError::Host { .. })),
        "Should return Host error for invalid log directory"
    );
}
