// src/convert/snippets.rs

//! Snippet aggregation
//!
//! Every snippet file in the source directory contributes one entry to a
//! selector-keyed group: `group[selector][name] = {prefix, body}`. Records
//! without a trigger or a body are not representable in the target format and
//! are skipped.

use crate::error::{Error, Result};
use crate::rewrite;
use crate::selector::{selector_for_scope, ScopeTranslator};
use crate::source;
use serde_json::{json, Map, Value};
use std::path::Path;
use tracing::debug;

use super::SelectorGroup;

/// Aggregate all snippets under `directory` into a selector-keyed group
pub fn aggregate_snippets(
    directory: &Path,
    translator: &dyn ScopeTranslator,
) -> Result<SelectorGroup> {
    let mut by_selector = SelectorGroup::new();

    for path in source::sorted_entries(directory)? {
        let Some(record) = source::read_record(&path)? else {
            continue;
        };

        let scope = non_empty_str(&record, "scope");
        let Some(prefix) = non_empty_str(&record, "tabTrigger") else {
            debug!("Skipping snippet without tabTrigger: {}", path.display());
            continue;
        };
        let Some(content) = non_empty_str(&record, "content") else {
            debug!("Skipping snippet without content: {}", path.display());
            continue;
        };
        let body = rewrite::rewrite_body(content);

        let name = match non_empty_str(&record, "name") {
            Some(name) => name.to_string(),
            None => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };

        let selector =
            selector_for_scope(translator, scope).map_err(|e| Error::SelectorTranslation {
                path: path.clone(),
                scope: scope.unwrap_or_default().to_string(),
                reason: e.reason,
            })?;

        let entries = by_selector
            .entry(selector)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(entries) = entries.as_object_mut() {
            // Last file wins when two snippets share (selector, name)
            entries.insert(name, json!({"prefix": prefix, "body": body}));
        }
    }

    Ok(by_selector)
}

fn non_empty_str<'a>(record: &'a source::RawRecord, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
