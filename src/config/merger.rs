//! Layering of YAML configuration values.
//!
//! The global config, the directory config and the local overrides are
//! combined before being parsed, so a later layer only has to mention what
//! it changes.
//!
//! # Merge Rules
//!
//! - Mappings merge key by key, recursively
//! - Sequences (notably `steps:`) are replaced as a whole
//! - A null in the overlay deletes the key
//! - Anything else in the overlay replaces the base value

use serde_yaml::Value;

/// Merge `overlay` on top of `base`.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut result = base_map.clone();

            for (key, overlay_value) in overlay_map {
                if overlay_value.is_null() {
                    result.remove(key);
                    continue;
                }
                let merged = match base_map.get(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value.clone(),
                };
                result.insert(key.clone(), merged);
            }

            Value::Mapping(result)
        }
        (_, overlay) => overlay.clone(),
    }
}

/// Merge layers in order; the last layer wins.
pub fn merge_configs(configs: &[Value]) -> Value {
    configs
        .iter()
        .fold(Value::Mapping(Default::default()), |acc, config| {
            deep_merge(&acc, config)
        })
}
