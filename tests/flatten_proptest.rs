//! Property tests for the key flattener.

use locsync::{flatten, unflatten};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[ -~]{0,12}".prop_map(Value::String),
        any::<i32>().prop_map(Value::from),
        any::<bool>().prop_map(Value::Bool),
    ]
}

/// Nested objects with dot-free keys and no empty objects
fn tree() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 48, 4, |inner| {
        prop::collection::btree_map("[a-z_]{1,6}", inner, 1..4)
            .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<String, Value>>()))
    })
}

fn root() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z_]{1,6}", tree(), 0..6)
        .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<String, Value>>()))
}

proptest! {
    #[test]
    fn unflatten_inverts_flatten(tree in root()) {
        let flat = flatten(&tree);
        prop_assert_eq!(unflatten(&flat).unwrap(), tree);
    }

    #[test]
    fn flat_keys_are_leaf_paths(tree in root()) {
        for (key, value) in flatten(&tree) {
            prop_assert!(!value.is_object());
            let pointer = format!("/{}", key.replace('.', "/"));
            prop_assert_eq!(tree.pointer(&pointer), Some(&value));
        }
    }
}
