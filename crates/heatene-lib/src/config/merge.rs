//! Recursive overlay of operator overrides onto the default parameter document.

use serde::Serialize;
use serde_json::{Map, Value};

/// A place where an override replaced a value of a different shape.
///
/// The override still wins; the note exists so a validation layer upstream can
/// surface the mismatch to whoever authored the override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeNote {
    /// Dotted path of the replaced node, e.g. `heat_loss.window_multiplier`.
    pub path: String,
    pub default_kind: &'static str,
    pub override_kind: &'static str,
}

/// Result of [`deep_merge`].
#[derive(Debug, Clone, PartialEq)]
pub struct Merged {
    pub value: Value,
    pub notes: Vec<MergeNote>,
}

/// Overlay `overrides` onto `defaults`.
///
/// Objects merge key by key, recursing. Any other override value (scalar,
/// array, null) replaces the default wholesale. When an object meets a
/// non-object the override wins and a [`MergeNote`] is recorded.
pub fn deep_merge(defaults: &Value, overrides: &Value) -> Merged {
    let mut notes = Vec::new();
    let value = merge_node(defaults, overrides, "", &mut notes);
    Merged { value, notes }
}

fn merge_node(base: &Value, overlay: &Value, path: &str, notes: &mut Vec<MergeNote>) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, overlay_value) in overlay_map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                let value = match base_map.get(key) {
                    Some(base_value) => merge_node(base_value, overlay_value, &child_path, notes),
                    None => overlay_value.clone(),
                };
                merged.insert(key.clone(), value);
            }
            Value::Object(merged)
        }
        (base, overlay) => {
            if base.is_object() != overlay.is_object() {
                notes.push(MergeNote {
                    path: if path.is_empty() {
                        "<root>".to_string()
                    } else {
                        path.to_string()
                    },
                    default_kind: kind(base),
                    override_kind: kind(overlay),
                });
            }
            overlay.clone()
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_objects_merge_key_by_key() {
        let defaults = json!({"a": {"x": 1, "y": 2}, "b": 3});
        let overrides = json!({"a": {"y": 20, "z": 30}});
        let merged = deep_merge(&defaults, &overrides);
        assert_eq!(merged.value, json!({"a": {"x": 1, "y": 20, "z": 30}, "b": 3}));
        assert!(merged.notes.is_empty());
    }

    #[test]
    fn arrays_replace_rather_than_concatenate() {
        let defaults = json!({"panels": [1, 2, 3]});
        let overrides = json!({"panels": [9]});
        assert_eq!(deep_merge(&defaults, &overrides).value, json!({"panels": [9]}));
    }

    #[test]
    fn type_mismatch_lets_override_win_and_records_note() {
        let defaults = json!({"heat_loss": {"window_multiplier": {"small": 1.0}}});
        let overrides = json!({"heat_loss": {"window_multiplier": 1.2}});
        let merged = deep_merge(&defaults, &overrides);
        assert_eq!(merged.value, json!({"heat_loss": {"window_multiplier": 1.2}}));
        assert_eq!(
            merged.notes,
            vec![MergeNote {
                path: "heat_loss.window_multiplier".to_string(),
                default_kind: "object",
                override_kind: "number",
            }]
        );
    }

    #[test]
    fn scalar_replaced_by_object_is_also_noted() {
        let merged = deep_merge(&json!({"a": 1}), &json!({"a": {"b": 2}}));
        assert_eq!(merged.value, json!({"a": {"b": 2}}));
        assert_eq!(merged.notes.len(), 1);
        assert_eq!(merged.notes[0].default_kind, "number");
    }

    #[test]
    fn merging_with_itself_is_idempotent() {
        let defaults = json!({"a": {"b": [1, 2], "c": {"d": "e"}}, "f": 1.5});
        let merged = deep_merge(&defaults, &defaults);
        assert_eq!(merged.value, defaults);
        assert!(merged.notes.is_empty());
    }
}
