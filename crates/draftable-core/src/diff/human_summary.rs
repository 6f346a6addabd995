//! Human-readable renderers for payload diffs.

use crate::diff::model::{ChangeKind, PayloadDiff};
use serde_json::Value;
use std::collections::BTreeMap;

/// Render a value for display: strings bare, everything else as JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render a value for a table cell, cut to `max` characters with `...`.
pub fn truncate_value(value: &Value, max: usize) -> String {
    let rendered = match value {
        Value::Null => "null".to_string(),
        other => render_value(other),
    };
    if rendered.chars().count() <= max {
        return rendered;
    }
    let cut: String = rendered.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}

/// One description line per changed field.
pub fn format_human(diff: &PayloadDiff) -> BTreeMap<String, String> {
    diff.iter()
        .map(|(field, change)| {
            let line = match change.kind {
                ChangeKind::Added => format!("Added: {}", render_value(&change.new)),
                ChangeKind::Removed => format!("Removed: {}", render_value(&change.old)),
                ChangeKind::Modified => format!(
                    "Changed from '{}' to '{}'",
                    render_value(&change.old),
                    render_value(&change.new)
                ),
            };
            (field.clone(), line)
        })
        .collect()
}

/// Plain-text block rendering, one stanza per field.
pub fn render_text(diff: &PayloadDiff) -> String {
    let mut out = String::new();
    for (field, change) in diff {
        out.push_str(&format!("{} ({}):\n", field, change.kind));
        out.push_str(&format!("  - {}\n", render_value(&change.old)));
        out.push_str(&format!("  + {}\n", render_value(&change.new)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::compare;
    use crate::payload::from_value;
    use serde_json::json;

    #[test]
    fn test_format_human_lines() {
        let a = from_value(json!({"title": "A", "gone": 5})).unwrap();
        let b = from_value(json!({"title": "B", "tags": ["x"]})).unwrap();
        let lines = format_human(&compare(&a, &b));
        assert_eq!(lines["title"], "Changed from 'A' to 'B'");
        assert_eq!(lines["gone"], "Removed: 5");
        assert_eq!(lines["tags"], "Added: [\"x\"]");
    }

    #[test]
    fn test_truncate_value() {
        let long = json!("abcdefghijklmnopqrstuvwxyz");
        assert_eq!(truncate_value(&long, 10), "abcdefg...");
        assert_eq!(truncate_value(&json!("short"), 10), "short");
        assert_eq!(truncate_value(&Value::Null, 10), "null");
    }

    #[test]
    fn test_render_text_marks_old_and_new() {
        let a = from_value(json!({"n": 1})).unwrap();
        let b = from_value(json!({"n": 2})).unwrap();
        let text = render_text(&compare(&a, &b));
        assert_eq!(text, "n (modified):\n  - 1\n  + 2\n");
    }

    #[test]
    fn test_render_text_strings_are_bare() {
        let a = from_value(json!({"title": "A"})).unwrap();
        let b = from_value(json!({"title": "B", "tag": "new"})).unwrap();
        let text = render_text(&compare(&a, &b));
        assert_eq!(
            text,
            "tag (added):\n  - null\n  + new\ntitle (modified):\n  - A\n  + B\n"
        );
    }
}
