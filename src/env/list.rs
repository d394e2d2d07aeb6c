// Package env provides the flat KEY=VALUE list handed to the container runtime.

use serde_json::Value;

/// Ordered list of `KEY=VALUE` entries.
///
/// Appends never deduplicate. A later entry shadows an earlier one only for
/// consumers that read the list last-wins, which is what [`EnvList::lookup`]
/// models.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvList(Vec<String>);

impl EnvList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: impl AsRef<str>) {
        self.0.push(format!("{}={}", key, value.as_ref()));
    }

    pub fn extend(&mut self, other: EnvList) {
        self.0.extend(other.0);
    }

    /// Last-wins value of `key`.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.0.iter().rev().find_map(|entry| {
            let (k, v) = entry.split_once('=')?;
            (k == key).then_some(v)
        })
    }

    /// Number of entries carrying `key`.
    pub fn occurrences(&self, key: &str) -> usize {
        self.0
            .iter()
            .filter(|entry| entry.split_once('=').map(|(k, _)| k == key).unwrap_or(false))
            .count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Renders a configuration scalar as an environment value. `null` yields nothing,
/// arrays and objects are passed through as JSON text.
pub fn env_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
