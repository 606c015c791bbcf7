//! Structural merge-patching of a typed configuration value.
//!
//! A dot-path key and a JSON value become a nested single-path document
//! (`"a.b.c"` → `{"a":{"b":{"c":value}}}`), which is merged over a JSON
//! snapshot of the target and deserialized back. Fields the patch does not
//! mention keep their current values; addressed fields are overwritten.
//! This is the same merge semantic the file loader uses for whole-document
//! loads.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ConfigError, ConfigErrors, SourceErrorKind};

/// Wrap `value` in one JSON object level per dot-separated segment of `key`.
pub fn nest(key: &str, value: Value) -> Value {
    key.rsplit('.').fold(value, |acc, segment| {
        let mut map = serde_json::Map::with_capacity(1);
        map.insert(segment.to_string(), acc);
        Value::Object(map)
    })
}

/// Merge `patch` into `base`.
///
/// Objects merge recursively; any other kind of value replaces the base
/// wholesale.
pub fn merge_values(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(base_value) => merge_values(base_value, patch_value),
                    None => {
                        base_map.insert(key, patch_value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

/// Merge a whole decoded document into `target`.
///
/// Used by the file loader: the document wins wherever it speaks, defaults
/// survive everywhere else.
pub fn merge_document<T>(target: &mut T, document: Value, source_name: &str) -> Result<(), ConfigError>
where
    T: Serialize + DeserializeOwned,
{
    let mut snapshot = snapshot(target, source_name)?;
    merge_values(&mut snapshot, document);
    *target = serde_json::from_value(snapshot).map_err(|e| ConfigError::SourceError {
        source_name: source_name.to_string(),
        kind: SourceErrorKind::ParseError {
            message: e.to_string(),
            line: None,
            column: None,
        },
    })?;
    Ok(())
}

/// Apply a single dot-path overwrite to `target`.
///
/// Decode errors are wrapped with the offending key.
pub fn apply<T>(
    target: &mut T,
    key: &str,
    value: &Value,
    source_name: &str,
) -> Result<(), ConfigErrors>
where
    T: Serialize + DeserializeOwned,
{
    let wrap = |message: String| {
        ConfigErrors::single(ConfigError::OverwriteError {
            key: key.to_string(),
            source_name: source_name.to_string(),
            message,
        })
    };

    let mut snapshot = snapshot(target, source_name).map_err(ConfigErrors::single)?;
    merge_values(&mut snapshot, nest(key, value.clone()));
    *target = serde_json::from_value(snapshot).map_err(|e| wrap(e.to_string()))?;
    Ok(())
}

fn snapshot<T: Serialize>(target: &T, source_name: &str) -> Result<Value, ConfigError> {
    serde_json::to_value(target).map_err(|e| ConfigError::SourceError {
        source_name: source_name.to_string(),
        kind: SourceErrorKind::ParseError {
            message: format!("cannot snapshot target structure: {}", e),
            line: None,
            column: None,
        },
    })
}
