//! Tolerant access to JSON tool arguments.
//!
//! Property names are matched case-insensitively with `_` and `-` ignored, so
//! `headerName`, `header_name` and `HEADER-NAME` all address the same field.

use crate::errors::ToolError;
use serde_json::{Map, Value};

pub fn fold_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

pub fn field<'a>(args: &'a Value, name: &str) -> Option<&'a Value> {
    let obj = args.as_object()?;
    if let Some(value) = obj.get(name) {
        return Some(value);
    }
    let wanted = fold_key(name);
    obj.iter()
        .find(|(key, _)| fold_key(key) == wanted)
        .map(|(_, value)| value)
}

/// Like [`field`] but treats JSON `null` as absent.
pub fn present<'a>(args: &'a Value, name: &str) -> Option<&'a Value> {
    field(args, name).filter(|v| !v.is_null())
}

pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

pub fn str_field(args: &Value, name: &str) -> Option<String> {
    present(args, name).and_then(scalar_text)
}

pub fn bool_field(args: &Value, name: &str) -> Result<Option<bool>, ToolError> {
    let Some(value) = present(args, name) else {
        return Ok(None);
    };
    if let Some(flag) = value.as_bool() {
        return Ok(Some(flag));
    }
    match value.as_str().map(|s| s.trim().to_lowercase()) {
        Some(text) if text == "true" => Ok(Some(true)),
        Some(text) if text == "false" => Ok(Some(false)),
        _ => Err(ToolError::invalid_params(format!(
            "{} must be a boolean",
            name
        ))),
    }
}

pub fn u64_field(args: &Value, name: &str) -> Result<Option<u64>, ToolError> {
    let Some(value) = present(args, name) else {
        return Ok(None);
    };
    let parsed = value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        })
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<u64>().ok()));
    parsed.map(Some).ok_or_else(|| {
        ToolError::invalid_params(format!("{} must be a non-negative integer", name))
    })
}

/// Reads a JSON-bearing parameter that may arrive either inline or as JSON text.
pub fn json_param(args: &Value, name: &str) -> Result<Option<Value>, ToolError> {
    let Some(value) = present(args, name) else {
        return Ok(None);
    };
    let Some(text) = value.as_str() else {
        return Ok(Some(value.clone()));
    };
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Value>(text)
        .map(Some)
        .map_err(|err| ToolError::invalid_params(format!("Invalid JSON in {}: {}", name, err)))
}

/// Flattens an object of scalars into ordered name/value pairs.
pub fn string_pairs(value: &Value, label: &str) -> Result<Vec<(String, String)>, ToolError> {
    let obj: &Map<String, Value> = value
        .as_object()
        .ok_or_else(|| ToolError::invalid_params(format!("{} must be a JSON object", label)))?;
    let mut out = Vec::with_capacity(obj.len());
    for (key, entry) in obj {
        if entry.is_null() {
            continue;
        }
        let rendered = scalar_text(entry).unwrap_or_else(|| entry.to_string());
        out.push((key.clone(), rendered));
    }
    Ok(out)
}
