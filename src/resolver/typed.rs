// Package resolver: typed-or-default accessors over raw module entries.
//
// A field holding the wrong JSON type reads as its default. Existing
// configuration files depend on this, so none of these accessors fail.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::env::env_value;

pub type Object = Map<String, Value>;

pub fn bool_or(obj: &Object, key: &str, default: bool) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(default)
}

pub fn u16_or(obj: &Object, key: &str, default: u16) -> u16 {
    u16_of(obj, key).unwrap_or(default)
}

pub fn u16_of(obj: &Object, key: &str) -> Option<u16> {
    obj.get(key)
        .and_then(Value::as_u64)
        .filter(|v| *v > 0 && *v <= u16::MAX as u64)
        .map(|v| v as u16)
}

pub fn i64_or(obj: &Object, key: &str, default: i64) -> i64 {
    obj.get(key).and_then(Value::as_i64).unwrap_or(default)
}

/// Non-blank string value.
pub fn str_of<'a>(obj: &'a Object, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub fn object_of<'a>(obj: &'a Object, key: &str) -> Option<&'a Object> {
    obj.get(key).and_then(Value::as_object)
}

/// Version accepted as a string or a number. Whole floats keep one decimal
/// (`1.0` stays `"1.0"`), integers print as-is.
pub fn version_of(obj: &Object, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Some(n.to_string())
            } else {
                n.as_f64().map(format_float_version)
            }
        }
        _ => None,
    }
}

fn format_float_version(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

/// String-valued map; non-scalar values pass through as JSON text, nulls are dropped.
pub fn string_map_of(obj: &Object, key: &str) -> IndexMap<String, String> {
    object_of(obj, key)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| env_value(v).map(|v| (k.clone(), v)))
                .collect()
        })
        .unwrap_or_default()
}

/// List of strings; non-string items are skipped.
pub fn string_list_of(obj: &Object, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
