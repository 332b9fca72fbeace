//! # Text Processing Utilities
//!
//! Label derivation for schema keys and width-aware helpers used when values
//! are drawn into fixed terminal columns.

use heck::ToTitleCase;
use serde_json::Value;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Derives a human label from a schema key.
///
/// Only the last dotted segment is used and placeholders are dropped, so
/// `materialList[item].countryOfOrigin` becomes `Country Of Origin`.
///
/// # Example
/// ```rust
/// use ichub_util::text_processing::humanize_key;
///
/// assert_eq!(humanize_key("partInstanceId"), "Part Instance Id");
/// assert_eq!(humanize_key("materialList[item].name"), "Name");
/// ```
pub fn humanize_key(key: &str) -> String {
    let leaf = key.rsplit('.').next().unwrap_or(key);
    let leaf = leaf.split('[').next().unwrap_or(leaf);
    if leaf.is_empty() {
        return key.to_string();
    }
    leaf.to_title_case()
}

/// Renders a scalar JSON value as editable text. Containers and `null`
/// render as empty.
pub fn scalar_to_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

/// Truncates `text` to at most `max_width` display columns, appending an
/// ellipsis when anything was cut.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let width = ch.width().unwrap_or(0);
        if used + width + 1 > max_width {
            break;
        }
        out.push(ch);
        used += width;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn humanizes_camel_and_snake_keys() {
        assert_eq!(humanize_key("manufacturerPartId"), "Manufacturer Part Id");
        assert_eq!(humanize_key("bpns"), "Bpns");
        assert_eq!(humanize_key("part_type"), "Part Type");
        assert_eq!(humanize_key("materialList[item]"), "Material List");
    }

    #[test]
    fn scalar_text_treats_containers_as_empty() {
        assert_eq!(scalar_to_text(Some(&json!("a"))), "a");
        assert_eq!(scalar_to_text(Some(&json!(1.5))), "1.5");
        assert_eq!(scalar_to_text(Some(&json!(false))), "false");
        assert_eq!(scalar_to_text(Some(&json!({ "nested": 1 }))), "");
        assert_eq!(scalar_to_text(None), "");
    }

    #[test]
    fn truncation_respects_display_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefgh", 5), "abcd…");
        assert_eq!(truncate_to_width("日本語テキスト", 5), "日本…");
    }
}
