//! Format listings and values for CLI output.

use crate::types::NodeKind;
use crate::value::Value;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;

/// Render a value the way `get` prints it: text verbatim, structured values
/// as pretty JSON.
pub fn format_value(value: &Value) -> String {
    match value.as_text() {
        Some(text) => text.to_string(),
        None => serde_json::to_string_pretty(&value.to_json())
            .unwrap_or_else(|_| value.to_json().to_string()),
    }
}

/// Table of child names and types.
pub fn format_children_table(rows: &[(String, NodeKind)]) -> String {
    if rows.is_empty() {
        return "(empty)".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "Type"]);
    for (name, kind) in rows {
        table.add_row(vec![name.clone(), kind.to_string()]);
    }
    table.to_string()
}

/// JSON object of child names to types.
pub fn format_children_json(rows: &[(String, NodeKind)]) -> String {
    let map: serde_json::Map<String, serde_json::Value> = rows
        .iter()
        .map(|(name, kind)| (name.clone(), serde_json::Value::from(kind.as_str())))
        .collect();
    serde_json::to_string_pretty(&map).unwrap_or_default()
}
