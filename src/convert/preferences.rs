// src/convert/preferences.rs

//! Preference aggregation
//!
//! TextMate preference files carry free-form `settings` dictionaries; only a
//! handful of keys have target-format equivalents. Recognized keys project
//! into an `editor` block grouped by selector. When two files contribute the
//! same selector, the file read first wins on conflicting keys while new keys
//! from later files are still folded in.

use crate::error::{Error, Result};
use crate::selector::{selector_for_scope, ScopeTranslator};
use crate::source;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

use super::SelectorGroup;

/// Aggregate all preference files under `directory` into a selector-keyed group
pub fn aggregate_preferences(
    directory: &Path,
    translator: &dyn ScopeTranslator,
) -> Result<SelectorGroup> {
    let mut by_selector = SelectorGroup::new();

    for path in source::sorted_entries(directory)? {
        let Some(record) = source::read_record(&path)? else {
            continue;
        };

        let scope = record
            .get("scope")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty());
        let settings = record.get("settings").and_then(Value::as_object);
        let (Some(scope), Some(settings)) = (scope, settings) else {
            debug!("Skipping preference without scope or settings: {}", path.display());
            continue;
        };

        let settings = normalize_shell_variables(settings);
        let Some(properties) = editor_properties(&settings) else {
            continue;
        };

        let selector = selector_for_scope(translator, Some(scope)).map_err(|e| {
            Error::SelectorTranslation {
                path: path.clone(),
                scope: scope.to_string(),
                reason: e.reason,
            }
        })?;

        let group = by_selector
            .entry(selector)
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(group) = group.as_object_mut() else {
            continue;
        };
        for (key, value) in properties {
            match group.entry(key) {
                serde_json::map::Entry::Vacant(slot) => {
                    slot.insert(value);
                }
                // First file wins on conflicts; later files only add keys
                serde_json::map::Entry::Occupied(mut slot) => {
                    merge_missing(slot.get_mut(), value);
                }
            }
        }
    }

    Ok(by_selector)
}

/// Normalize `shellVariables` from `[{name, value}]` pairs into a mapping
///
/// The first occurrence of a duplicate variable name wins.
fn normalize_shell_variables(settings: &Map<String, Value>) -> Map<String, Value> {
    let mut settings = settings.clone();
    if let Some(Value::Array(entries)) = settings.get("shellVariables") {
        let mut variables = Map::new();
        for entry in entries {
            let name = entry.get("name").and_then(Value::as_str);
            let value = entry.get("value");
            if let (Some(name), Some(value)) = (name, value) {
                if !variables.contains_key(name) {
                    variables.insert(name.to_string(), value.clone());
                }
            }
        }
        settings.insert("shellVariables".to_string(), Value::Object(variables));
    }
    settings
}

/// Project recognized settings into target editor properties
///
/// Unrecognized keys are dropped; returns `None` when nothing is recognized
/// so the file contributes nothing to the group.
fn editor_properties(settings: &Map<String, Value>) -> Option<Map<String, Value>> {
    let shell_variables = settings.get("shellVariables").and_then(Value::as_object);
    let shell_variable =
        |name: &str| shell_variables.and_then(|variables| variables.get(name)).cloned();

    let mut editor = Map::new();
    let mut include = |key: &str, value: Option<Value>| {
        if let Some(value) = value.filter(|v| !v.is_null()) {
            editor.insert(key.to_string(), value);
        }
    };
    include("commentStart", shell_variable("TM_COMMENT_START"));
    include("commentEnd", shell_variable("TM_COMMENT_END"));
    include("increaseIndentPattern", settings.get("increaseIndentPattern").cloned());
    include("decreaseIndentPattern", settings.get("decreaseIndentPattern").cloned());
    include("foldEndPattern", settings.get("foldingStopMarker").cloned());
    include("completions", settings.get("completions").cloned());

    if editor.is_empty() {
        return None;
    }
    let mut properties = Map::new();
    properties.insert("editor".to_string(), Value::Object(editor));
    Some(properties)
}

/// Shallow union: keys already in `stored` keep their value, new keys from
/// `incoming` are added
fn merge_missing(stored: &mut Value, incoming: Value) {
    if let (Some(stored), Value::Object(incoming)) = (stored.as_object_mut(), incoming) {
        for (key, value) in incoming {
            stored.entry(key).or_insert(value);
        }
    }
}
