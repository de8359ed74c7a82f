//! Settings merge logic
//!
//! - Objects: deep-merge by key
//! - Arrays: replace (last wins)
//! - Scalars: override (last wins)

use serde_json::Value;

/// Deep merge two JSON values, `overlay` taking precedence.
///
/// A partial axis table in a later layer only overrides the fields it names,
/// so `{"x": {"delta": 2.0}}` keeps whatever `x.enabled` was set below it.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }

        // Arrays and scalars: overlay wins
        (_, overlay) => overlay,
    }
}

/// Merge layers in order (first is base, last has highest precedence)
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let result = deep_merge(
            json!({"patch_name": "TreeShift.esp"}),
            json!({"patch_name": "Forest.esp"}),
        );
        assert_eq!(result["patch_name"], "Forest.esp");
    }

    #[test]
    fn test_partial_axis_merge() {
        let base = json!({"x": {"enabled": true, "delta": 1.0}});
        let overlay = json!({"x": {"delta": -4.0}});
        let result = deep_merge(base, overlay);

        assert_eq!(result["x"]["enabled"], true);
        assert_eq!(result["x"]["delta"], -4.0);
    }

    #[test]
    fn test_add_new_key() {
        let result = deep_merge(json!({"x": {}}), json!({"target": "0A1B2C:Skyrim.esm"}));
        assert!(result["x"].is_object());
        assert_eq!(result["target"], "0A1B2C:Skyrim.esm");
    }

    #[test]
    fn test_array_replace() {
        let result = deep_merge(json!({"layers": ["a", "b"]}), json!({"layers": ["c"]}));
        assert_eq!(result["layers"], json!(["c"]));
    }

    #[test]
    fn test_merge_layers_precedence() {
        let builtin = json!({"patch_name": "TreeShift.esp", "z": {"enabled": false, "delta": 0.0}});
        let file = json!({"target": "0A1B2C:Skyrim.esm", "z": {"enabled": true, "delta": -8.0}});
        let cli = json!({"z": {"delta": -16.0}});

        let result = merge_layers(vec![builtin, file, cli]);

        assert_eq!(result["patch_name"], "TreeShift.esp");
        assert_eq!(result["target"], "0A1B2C:Skyrim.esm");
        assert_eq!(result["z"]["enabled"], true);
        assert_eq!(result["z"]["delta"], -16.0);
    }
}
