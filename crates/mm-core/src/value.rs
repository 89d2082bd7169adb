//! Accessors for the untyped YAML mappings that model definitions are made of.
//!
//! Definition documents are read as `serde_yaml` values so that unknown keys
//! survive expansion untouched. These helpers keep the lookups terse at the
//! call sites and turn shape mismatches into [`CoreError`]s.

pub use serde_yaml::{Mapping, Value};

use crate::error::{CoreError, CoreResult};

/// Build a mapping key from a string.
pub fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

/// Look up a string-keyed entry.
pub fn get<'a>(map: &'a Mapping, name: &str) -> Option<&'a Value> {
    map.get(key(name))
}

/// Look up a string-valued entry. Non-string values yield `None`.
pub fn get_str<'a>(map: &'a Mapping, name: &str) -> Option<&'a str> {
    get(map, name).and_then(Value::as_str)
}

/// Look up a boolean entry, treating an absent key as `false`.
pub fn get_flag(map: &Mapping, name: &str) -> bool {
    get(map, name).and_then(Value::as_bool).unwrap_or(false)
}

/// Look up a list of strings. Absent means empty; non-string items are an error.
pub fn get_str_list(map: &Mapping, name: &str) -> CoreResult<Vec<String>> {
    let Some(value) = get(map, name) else {
        return Ok(Vec::new());
    };
    let Some(items) = value.as_sequence() else {
        return Err(CoreError::NotAString {
            what: name.to_string(),
        });
    };
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| CoreError::NotAString {
                    what: format!("{name}[]"),
                })
        })
        .collect()
}

/// Interpret a value as a mapping.
pub fn as_mapping<'a>(value: &'a Value, what: &str) -> CoreResult<&'a Mapping> {
    value.as_mapping().ok_or_else(|| CoreError::NotAMapping {
        what: what.to_string(),
    })
}

/// Iterate the entries of a mapping whose keys are strings, in insertion order.
pub fn string_entries(map: &Mapping) -> impl Iterator<Item = (&str, &Value)> {
    map.iter().filter_map(|(k, v)| k.as_str().map(|k| (k, v)))
}

/// Copy of `map` holding only the entries whose key passes `keep`.
pub fn filter_keys(map: &Mapping, mut keep: impl FnMut(&str) -> bool) -> Mapping {
    map.iter()
        .filter(|(k, _)| k.as_str().is_some_and(&mut keep))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
