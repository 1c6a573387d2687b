// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generic recursive merges over JSON value trees.
//!
//! Two strategies are provided:
//!
//! - [`fill_missing`]: the base always wins; defaults only supply keys the base
//!   does not define, recursively within nested objects. This is how template
//!   defaults and literal records are combined.
//! - [`overwrite`]: the patch always wins; nested objects are merged so that
//!   sibling keys of the patched path survive. This is how key-path writes are
//!   applied on top of an existing document.
//!
//! Neither strategy looks at the contents of the documents beyond their shape.

use serde_json::Value;

/// Fills every key that `base` does not define with the value from `defaults`.
///
/// When both sides hold an object under the same key, the merge recurses into
/// it. In every other case a key already present in `base` is left untouched,
/// including when its value is `null`, a scalar or an array.
///
/// # Examples
///
/// ```
/// use hsconfig::domain::merge::fill_missing;
/// use serde_json::json;
///
/// let mut base = json!({"theme": "custom", "menu": {"help": false}});
/// let defaults = json!({"theme": "dark", "brand": "x", "menu": {"help": true, "feedback": true}});
///
/// fill_missing(&mut base, &defaults);
/// assert_eq!(
///     base,
///     json!({"theme": "custom", "menu": {"help": false, "feedback": true}, "brand": "x"})
/// );
/// ```
pub fn fill_missing(base: &mut Value, defaults: &Value) {
    let (Value::Object(base_map), Value::Object(default_map)) = (base, defaults) else {
        return;
    };

    for (key, default_value) in default_map {
        match base_map.get_mut(key) {
            Some(existing) => fill_missing(existing, default_value),
            None => {
                base_map.insert(key.clone(), default_value.clone());
            }
        }
    }
}

/// Overlays `patch` onto `target`, replacing every value the patch defines.
///
/// Objects present on both sides are merged key by key; any other pairing
/// replaces the target value with a copy of the patch value.
pub fn overwrite(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                let nested = patch_value.is_object()
                    && target_map.get(key).is_some_and(Value::is_object);
                match target_map.get_mut(key) {
                    Some(existing) if nested => overwrite(existing, patch_value),
                    _ => {
                        target_map.insert(key.clone(), patch_value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}
