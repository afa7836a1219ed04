//! Field-level diffing of entity attribute maps
//!
//! Used twice: by the interceptor to decide which fields an update really
//! changed, and by the display layer to summarise a record's `old`/`attributes`
//! pair as `field: old -> new`.

use serde_json::Value;

use crate::models::FieldMap;

/// Fields maintained by the storage layer rather than by users
pub const BOOKKEEPING_FIELDS: &[&str] = &[
    "updated_at",
    "created_at",
    "deleted_at",
    "updated_by",
    "created_by",
];

/// Fields of `current` whose value differs from `original`, with the new value
///
/// A field missing from `original` counts as changed.
pub fn changed_fields(original: &FieldMap, current: &FieldMap) -> FieldMap {
    current
        .iter()
        .filter(|(key, value)| original.get(key.as_str()) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Drop bookkeeping fields from a change set
pub fn strip_bookkeeping(mut changes: FieldMap) -> FieldMap {
    changes.retain(|key, _| !BOOKKEEPING_FIELDS.contains(&key.as_str()));
    changes
}

/// One-line summary of the differences between two attribute maps
///
/// Returns `None` when nothing differs.
pub fn generate_diff(old: &FieldMap, new: &FieldMap) -> Option<String> {
    let changes = generate_detailed_diff(old, new);
    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

/// One `field: old -> new` line per differing field
///
/// Fields only present on one side are shown as `(added)` or `(removed)`.
/// Order follows `old`, then fields that only exist in `new`.
pub fn generate_detailed_diff(old: &FieldMap, new: &FieldMap) -> Vec<String> {
    let mut changes = Vec::new();

    for (key, old_val) in old {
        match new.get(key) {
            Some(new_val) if new_val != old_val => changes.push(format!(
                "{}: {} -> {}",
                key,
                format_value(old_val),
                format_value(new_val)
            )),
            Some(_) => {}
            None => changes.push(format!("{}: {} -> (removed)", key, format_value(old_val))),
        }
    }

    for (key, new_val) in new {
        if !old.contains_key(key) {
            changes.push(format!("{}: (added) -> {}", key, format_value(new_val)));
        }
    }

    changes
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.chars().count() > 50 => {
            let head: String = s.chars().take(47).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(fields) => format!("{{{} fields}}", fields.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> FieldMap {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_changed_fields() {
        let original = map(json!({"email": "a@x.com", "phone": null, "company": "Acme"}));
        let current = map(json!({"email": "b@x.com", "phone": null, "company": "Acme"}));

        let changes = changed_fields(&original, &current);
        assert_eq!(changes, map(json!({"email": "b@x.com"})));
    }

    #[test]
    fn test_missing_original_counts_as_changed() {
        let changes = changed_fields(&FieldMap::new(), &map(json!({"notes": ""})));
        assert!(changes.contains_key("notes"));
    }

    #[test]
    fn test_strip_bookkeeping() {
        let changes = map(json!({
            "email": "b@x.com",
            "updated_at": "2026-01-01T00:00:00Z",
            "updated_by": "x",
        }));
        assert_eq!(strip_bookkeeping(changes), map(json!({"email": "b@x.com"})));

        let only_timestamps = map(json!({"updated_at": "now", "deleted_at": null}));
        assert!(strip_bookkeeping(only_timestamps).is_empty());
    }

    #[test]
    fn test_generate_diff_lines() {
        let old = map(json!({"status": "pending", "total": 100}));
        let new = map(json!({"status": "shipped", "total": 100}));

        let diff = generate_diff(&old, &new).unwrap();
        assert_eq!(diff, "status: \"pending\" -> \"shipped\"");
    }

    #[test]
    fn test_generate_diff_added_and_removed() {
        let old = map(json!({"a": 1}));
        let new = map(json!({"b": [1, 2]}));

        let changes = generate_detailed_diff(&old, &new);
        assert_eq!(changes, vec!["a: 1 -> (removed)", "b: (added) -> [2 items]"]);
    }

    #[test]
    fn test_no_diff() {
        let old = map(json!({"a": true}));
        assert!(generate_diff(&old, &old.clone()).is_none());
    }

    #[test]
    fn test_long_string_truncated() {
        let old = map(json!({"notes": "é".repeat(80)}));
        let new = map(json!({"notes": "short"}));

        let diff = generate_diff(&old, &new).unwrap();
        assert!(diff.contains("...\" -> \"short\""));
    }
}
