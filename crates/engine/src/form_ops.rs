//! Value construction and array editing helpers used by form controls.
//!
//! Every edit produces a new data value; callers hand it to the host via a
//! data-changed notification. Array edits always replace the whole array at
//! the field's path.

use ichub_types::{FieldDescriptor, FieldType, ItemType};
use ichub_util::field_path::{get_value, set_value};
use serde_json::{Map, Value};

/// Initial value for a field with no data: its schema default if present,
/// otherwise the empty value for its type.
pub fn default_value_for(field: &FieldDescriptor) -> Value {
    field.default.clone().unwrap_or_else(|| empty_value_for(&field.field_type))
}

/// Empty value for a control kind.
pub fn empty_value_for(field_type: &FieldType) -> Value {
    match field_type {
        FieldType::Number | FieldType::Integer | FieldType::Select { .. } | FieldType::Radio { .. } => Value::Null,
        FieldType::Checkbox => Value::Bool(false),
        FieldType::Array { .. } => Value::Array(Vec::new()),
        FieldType::Object { fields } => Value::Object(default_object(fields)),
        FieldType::Text
        | FieldType::Textarea
        | FieldType::Date
        | FieldType::DateTime
        | FieldType::Time
        | FieldType::Email
        | FieldType::Url => Value::String(String::new()),
    }
}

/// Value appended when the user adds an item to an array.
///
/// Object items get every child pre-populated so the item renders with all
/// of its controls.
pub fn new_array_item(items: &ItemType) -> Value {
    match items {
        ItemType::Text => Value::String(String::new()),
        ItemType::Number | ItemType::Integer => Value::Null,
        ItemType::Boolean => Value::Bool(false),
        ItemType::Object(fields) => Value::Object(default_object(fields)),
    }
}

fn default_object(fields: &[FieldDescriptor]) -> Map<String, Value> {
    fields
        .iter()
        .map(|child| (child.leaf_name().to_string(), default_value_for(child)))
        .collect()
}

fn current_items(data: &Value, path: &str) -> Vec<Value> {
    get_value(data, path)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Appends a new item to the array at `path`, creating the array if needed.
pub fn append_item(data: &Value, path: &str, items: &ItemType) -> Value {
    let mut entries = current_items(data, path);
    entries.push(new_array_item(items));
    set_value(data, path, Value::Array(entries))
}

/// Removes the item at `index`; out-of-range indices leave the data as is.
pub fn remove_item(data: &Value, path: &str, index: usize) -> Value {
    let mut entries = current_items(data, path);
    if index >= entries.len() {
        return data.clone();
    }
    entries.remove(index);
    set_value(data, path, Value::Array(entries))
}

/// Replaces the item at `index`; out-of-range indices leave the data as is.
pub fn update_item(data: &Value, path: &str, index: usize, item: Value) -> Value {
    let mut entries = current_items(data, path);
    let Some(slot) = entries.get_mut(index) else {
        return data.clone();
    };
    *slot = item;
    set_value(data, path, Value::Array(entries))
}

/// Outcome of parsing the text typed into a numeric control.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericInput {
    /// Cleared input; stored as null.
    Empty,
    /// Partial number such as `-` or `12.`; kept as text, data untouched.
    Transient,
    Value(Value),
    Invalid,
}

/// Parses numeric control text without losing in-progress entries.
pub fn parse_numeric_input(text: &str, integer: bool) -> NumericInput {
    let text = text.trim();
    if text.is_empty() {
        return NumericInput::Empty;
    }
    if matches!(text, "-" | "." | "-.") || (!integer && text.ends_with('.') && text[..text.len() - 1].parse::<f64>().is_ok()) {
        return NumericInput::Transient;
    }
    if integer {
        return match text.parse::<i64>() {
            Ok(number) => NumericInput::Value(Value::from(number)),
            Err(_) => NumericInput::Invalid,
        };
    }
    match text.parse::<f64>() {
        Ok(number) if number.is_finite() => serde_json::Number::from_f64(number)
            .map(|number| NumericInput::Value(normalize_number(number)))
            .unwrap_or(NumericInput::Invalid),
        _ => NumericInput::Invalid,
    }
}

fn normalize_number(number: serde_json::Number) -> Value {
    match number.as_f64() {
        Some(float) if float.fract() == 0.0 && float.abs() < i64::MAX as f64 => Value::from(float as i64),
        _ => Value::Number(number),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::interpret_schema;
    use serde_json::json;

    #[test]
    fn object_items_prefill_every_child() {
        let schema = json!({
            "materialList": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "share": { "type": "number" },
                        "recycled": { "type": "boolean" },
                        "origin": { "type": "object", "properties": { "country": { "type": "string", "default": "DE" } } },
                        "aliases": { "type": "array", "items": { "type": "string" } }
                    }
                }
            }
        });
        let fields = interpret_schema(&schema).expect("interpret");
        let FieldType::Array { items } = &fields[0].field_type else {
            panic!("expected array");
        };
        assert_eq!(
            new_array_item(items),
            json!({
                "name": "",
                "share": null,
                "recycled": false,
                "origin": { "country": "DE" },
                "aliases": []
            })
        );
    }

    #[test]
    fn array_edits_replace_whole_array() {
        let data = json!({ "tags": ["a", "b", "c"] });
        let appended = append_item(&data, "tags", &ItemType::Text);
        assert_eq!(appended, json!({ "tags": ["a", "b", "c", ""] }));
        assert_eq!(remove_item(&data, "tags", 1), json!({ "tags": ["a", "c"] }));
        assert_eq!(remove_item(&data, "tags", 9), data);
        assert_eq!(update_item(&data, "tags", 2, json!("z")), json!({ "tags": ["a", "b", "z"] }));
        assert_eq!(data, json!({ "tags": ["a", "b", "c"] }));
    }

    #[test]
    fn append_creates_missing_array() {
        let data = json!({});
        assert_eq!(append_item(&data, "parts.list", &ItemType::Boolean), json!({ "parts": { "list": [false] } }));
    }

    #[test]
    fn numeric_input_keeps_partial_entries() {
        assert_eq!(parse_numeric_input("", false), NumericInput::Empty);
        assert_eq!(parse_numeric_input("-", false), NumericInput::Transient);
        assert_eq!(parse_numeric_input("12.", false), NumericInput::Transient);
        assert_eq!(parse_numeric_input("12.5", false), NumericInput::Value(json!(12.5)));
        assert_eq!(parse_numeric_input("40", false), NumericInput::Value(json!(40)));
        assert_eq!(parse_numeric_input("4.5", true), NumericInput::Invalid);
        assert_eq!(parse_numeric_input("-3", true), NumericInput::Value(json!(-3)));
        assert_eq!(parse_numeric_input("abc", false), NumericInput::Invalid);
    }
}
