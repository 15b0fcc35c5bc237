use crate::resolver::{HandlerMap, resolve_handler};
use crate::value::{Callable, StateValue};

fn handler() -> Callable {
    Callable::new(|_| Ok(()))
}

/// **VALUE**: Exact key wins over a case-insensitive match.
///
/// **BUG THIS CATCHES**: Would catch an implementation that lower-cases first
/// and picks whichever key the map iterates to first.
#[test]
fn given_exact_and_case_insensitive_keys_when_resolving_then_exact_match_wins() {
    // GIVEN: Two keys differing only in case
    let upper = handler();
    let lower = handler();
    let mut handlers = HandlerMap::new();
    handlers.insert("Reset".to_string(), StateValue::Function(lower.clone()));
    handlers.insert("RESET".to_string(), StateValue::Function(upper.clone()));

    // WHEN: Resolving the exact spelling
    let resolved = resolve_handler(&handlers, "RESET");

    // THEN: The exact key is returned
    assert_eq!(resolved, Some(upper));
}

#[test]
fn given_uppercase_key_when_resolving_lowercase_then_returns_handler() {
    let f1 = handler();
    let mut handlers = HandlerMap::new();
    handlers.insert("A".to_string(), StateValue::Function(f1.clone()));

    assert_eq!(resolve_handler(&handlers, "a"), Some(f1));
}

/// **VALUE**: Dot paths walk nested groups.
///
/// **WHY THIS MATTERS**: Handler maps are usually grouped by slice
/// (`counter.increment`, `theme.toggle`).
#[test]
fn given_nested_group_when_resolving_dot_path_then_returns_leaf() {
    // GIVEN: { counter: { increment: f2 } }
    let f2 = handler();
    let mut handlers = HandlerMap::new();
    handlers.insert(
        "counter".to_string(),
        StateValue::object([("increment", StateValue::Function(f2.clone()))]),
    );

    // WHEN/THEN: Resolving with any casing finds it
    assert_eq!(resolve_handler(&handlers, "counter.increment"), Some(f2.clone()));
    assert_eq!(resolve_handler(&handlers, "Counter.INCREMENT"), Some(f2));
}

/// **VALUE**: Path failures are `None`, never a panic.
///
/// **BUG THIS CATCHES**: Would catch indexing into a non-object intermediate.
#[test]
fn given_broken_paths_when_resolving_then_returns_none() {
    // GIVEN: A group and a scalar
    let mut handlers = HandlerMap::new();
    handlers.insert(
        "counter".to_string(),
        StateValue::object([("increment", StateValue::Function(handler()))]),
    );
    handlers.insert("limit".to_string(), StateValue::from(serde_json::json!(10)));

    // WHEN/THEN: Missing leaf, scalar intermediate, non-callable leaf, unknown root
    assert_eq!(resolve_handler(&handlers, "counter.missing"), None);
    assert_eq!(resolve_handler(&handlers, "limit.value"), None);
    assert_eq!(resolve_handler(&handlers, "limit"), None);
    assert_eq!(resolve_handler(&handlers, "counter"), None);
    assert_eq!(resolve_handler(&handlers, "nope.increment"), None);
}

#[test]
fn given_empty_map_when_resolving_then_returns_none() {
    assert_eq!(resolve_handler(&HandlerMap::new(), "anything"), None);
}
