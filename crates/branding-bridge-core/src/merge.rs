//! Deep merge of localized text trees.

use serde_json::Value;

use crate::document::TextTree;

/// Merge `overrides` on top of `base`.
///
/// Objects present on both sides merge recursively. Everywhere else the
/// override wins when it has the key and the base fills the gap when it
/// does not. Object branches that end up empty are dropped, at any depth
/// of `base`. Keys only present in `overrides` are copied verbatim.
#[must_use]
pub fn merge(base: &TextTree, overrides: &TextTree) -> TextTree {
    let mut merged = TextTree::new();

    for (key, value) in base {
        match (value, overrides.get(key)) {
            (Value::Object(sub), Some(Value::Object(sub_override))) => {
                insert_non_empty(&mut merged, key, merge(sub, sub_override));
            }
            (Value::Object(sub), None) => {
                insert_non_empty(&mut merged, key, merge(sub, &TextTree::new()));
            }
            (_, Some(override_value)) => {
                merged.insert(key.clone(), override_value.clone());
            }
            (scalar, None) => {
                merged.insert(key.clone(), scalar.clone());
            }
        }
    }

    for (key, value) in overrides {
        if !base.contains_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }

    merged
}

fn insert_non_empty(merged: &mut TextTree, key: &str, sub: TextTree) {
    if !sub.is_empty() {
        merged.insert(key.to_string(), Value::Object(sub));
    }
}
