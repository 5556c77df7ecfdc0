//! Path navigation over a JSON tree.
//!
//! Paths are slash-separated segments (`emr_records/p1/log`). Segments
//! index objects by key; arrays are terminal values, never traversed.
//! Free-text segments (checklist item descriptions) are allowed — only
//! the empty path and empty segments are rejected.

use serde_json::{Map, Value};
use trialpilot_core::error::StoreError;

/// Split and validate a path into its segments.
pub fn segments(path: &str) -> Result<Vec<&str>, StoreError> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Err(StoreError::InvalidPath("empty path".into()));
    }
    let parts: Vec<&str> = trimmed.split('/').collect();
    if parts.iter().any(|s| s.is_empty()) {
        return Err(StoreError::InvalidPath(format!(
            "empty segment in '{path}'"
        )));
    }
    Ok(parts)
}

/// Read the value at `path`.
pub fn get<'a>(root: &'a Value, path: &str) -> Result<Option<&'a Value>, StoreError> {
    let mut node = root;
    for seg in segments(path)? {
        match node.get(seg) {
            Some(child) => node = child,
            None => return Ok(None),
        }
    }
    Ok(Some(node))
}

/// Replace the value at `path`, creating intermediate objects as needed.
pub fn set(root: &mut Value, path: &str, value: Value) -> Result<(), StoreError> {
    let parts = segments(path)?;
    let mut node = root;
    for seg in &parts[..parts.len() - 1] {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node = node
            .as_object_mut()
            .expect("just ensured object")
            .entry(seg.to_string())
            .or_insert(Value::Object(Map::new()));
    }
    let last = parts[parts.len() - 1];
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    node.as_object_mut()
        .expect("just ensured object")
        .insert(last.to_string(), value);
    Ok(())
}

/// Append to the array at `path`, creating it if absent.
pub fn append(root: &mut Value, path: &str, value: Value) -> Result<(), StoreError> {
    match get(root, path)? {
        Some(Value::Array(existing)) => {
            let mut arr = existing.clone();
            arr.push(value);
            set(root, path, Value::Array(arr))
        }
        Some(_) => Err(StoreError::TypeMismatch {
            path: path.to_string(),
            expected: "array".into(),
        }),
        None => set(root, path, Value::Array(vec![value])),
    }
}

/// Delete the value at `path`. Returns whether anything was removed.
pub fn delete(root: &mut Value, path: &str) -> Result<bool, StoreError> {
    let parts = segments(path)?;
    let mut node = root;
    for seg in &parts[..parts.len() - 1] {
        match node.get_mut(*seg) {
            Some(child) => node = child,
            None => return Ok(false),
        }
    }
    Ok(node
        .as_object_mut()
        .is_some_and(|obj| obj.remove(parts[parts.len() - 1]).is_some()))
}

/// Sorted child keys of the object at `path`.
pub fn list(root: &Value, path: &str) -> Result<Vec<String>, StoreError> {
    match get(root, path)? {
        Some(Value::Object(map)) => {
            let mut keys: Vec<String> = map.keys().cloned().collect();
            keys.sort();
            Ok(keys)
        }
        _ => Ok(Vec::new()),
    }
}
