//! Local validation of form data against field descriptors.
//!
//! Hosts usually bring their own validator and feed its messages to the
//! correlator. This module covers the declarative constraints the interpreter
//! already extracted (required, length, pattern, numeric bounds, item counts
//! and string formats) so the form can flag problems without a round trip.
//! Messages are phrased "`<path> <message>`" so they attribute cleanly.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use ichub_types::{FieldDescriptor, FieldType, FieldValidation, ItemType};
use ichub_util::field_path::{get_value, index_path, rebase_path};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::interpreter::flatten_fields;

static EMAIL_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

/// One failed constraint at a concrete data path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.message)
    }
}

/// Validates `data` against every descriptor in `fields`.
///
/// Accepts either the flat list or the nested tree; object members are
/// visited once. Array-of-object items are validated per concrete index.
pub fn validate_form(fields: &[FieldDescriptor], data: &Value) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();
    for field in flatten_fields(fields) {
        if seen.insert(field.key.clone()) {
            let path = field.key.clone();
            validate_at(&field, &path, data, &mut issues);
        }
    }
    debug!(issues = issues.len(), "validated form data");
    issues
}

fn validate_at(field: &FieldDescriptor, path: &str, data: &Value, issues: &mut Vec<ValidationIssue>) {
    let value = get_value(data, path);
    match &field.field_type {
        FieldType::Object { .. } => {}
        FieldType::Array { items } => validate_array(field, items, path, value, data, issues),
        _ => {
            let Some(value) = value.filter(|value| !is_empty_value(value)) else {
                if field.required {
                    issues.push(ValidationIssue::new(path, "is required"));
                }
                return;
            };
            if let Err(message) = validate_field_value(field, value) {
                issues.push(ValidationIssue::new(path, message));
            }
        }
    }
}

fn validate_array(
    field: &FieldDescriptor,
    items: &ItemType,
    path: &str,
    value: Option<&Value>,
    data: &Value,
    issues: &mut Vec<ValidationIssue>,
) {
    let entries = value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default();
    if entries.is_empty() && field.required {
        issues.push(ValidationIssue::new(path, "is required"));
        return;
    }
    if let Some(validation) = &field.validation {
        if let Some(min_items) = validation.min_items
            && entries.len() < min_items
        {
            issues.push(ValidationIssue::new(path, format!("must contain at least {min_items} items")));
        }
        if let Some(max_items) = validation.max_items
            && entries.len() > max_items
        {
            issues.push(ValidationIssue::new(path, format!("must contain at most {max_items} items")));
        }
    }

    let item_prefix = field.item_prefix();
    for (index, entry) in entries.iter().enumerate() {
        let item_path = index_path(path, index);
        match items {
            ItemType::Object(item_fields) => {
                for child in flatten_fields(item_fields) {
                    let Some(child_path) = rebase_path(&child.key, &item_prefix, &item_path) else {
                        continue;
                    };
                    validate_at(&child, &child_path, data, issues);
                }
            }
            scalar => {
                if let Err(message) = validate_item_value(scalar, entry) {
                    issues.push(ValidationIssue::new(item_path, message));
                }
            }
        }
    }
}

fn validate_item_value(items: &ItemType, value: &Value) -> Result<(), String> {
    match items {
        ItemType::Number if !value.is_number() && !value.is_null() => Err("must be a number".to_string()),
        ItemType::Integer if !value.is_null() && !is_integer(value) => Err("must be an integer".to_string()),
        ItemType::Boolean if !value.is_boolean() => Err("must be true or false".to_string()),
        _ => Ok(()),
    }
}

/// True for values that count as "not filled in".
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Checks one non-empty value against the field's type and constraints.
pub fn validate_field_value(field: &FieldDescriptor, value: &Value) -> Result<(), String> {
    match &field.field_type {
        FieldType::Number => {
            let number = value.as_f64().ok_or_else(|| "must be a number".to_string())?;
            check_bounds(number, field.validation.as_ref())?;
        }
        FieldType::Integer => {
            if !is_integer(value) {
                return Err("must be an integer".to_string());
            }
            if let Some(number) = value.as_f64() {
                check_bounds(number, field.validation.as_ref())?;
            }
        }
        FieldType::Checkbox => {
            if !value.is_boolean() {
                return Err("must be true or false".to_string());
            }
        }
        FieldType::Select { options } | FieldType::Radio { options } => {
            if !options.is_empty() && !options.iter().any(|option| json_values_match(&option.value, value)) {
                return Err("must be one of the allowed values".to_string());
            }
        }
        FieldType::Text
        | FieldType::Textarea
        | FieldType::Date
        | FieldType::DateTime
        | FieldType::Time
        | FieldType::Email
        | FieldType::Url => {
            let text = value.as_str().ok_or_else(|| "must be text".to_string())?;
            check_text(text, field.validation.as_ref())?;
            check_format(&field.field_type, text)?;
        }
        FieldType::Array { .. } | FieldType::Object { .. } => {}
    }
    Ok(())
}

fn is_integer(value: &Value) -> bool {
    value.is_i64() || value.is_u64() || value.as_f64().is_some_and(|number| number.fract() == 0.0)
}

fn check_bounds(number: f64, validation: Option<&FieldValidation>) -> Result<(), String> {
    let Some(validation) = validation else {
        return Ok(());
    };
    if let Some(min) = validation.min
        && number < min
    {
        return Err(format!("must be greater than or equal to {}", format_bound(min)));
    }
    if let Some(max) = validation.max
        && number > max
    {
        return Err(format!("must be less than or equal to {}", format_bound(max)));
    }
    Ok(())
}

fn format_bound(bound: f64) -> String {
    if bound.fract() == 0.0 { format!("{}", bound as i64) } else { bound.to_string() }
}

fn check_text(text: &str, validation: Option<&FieldValidation>) -> Result<(), String> {
    let Some(validation) = validation else {
        return Ok(());
    };
    let length = text.chars().count();
    if let Some(min_length) = validation.min_length
        && length < min_length
    {
        return Err(format!("must be at least {min_length} characters"));
    }
    if let Some(max_length) = validation.max_length
        && length > max_length
    {
        return Err(format!("must be at most {max_length} characters"));
    }
    if let Some(pattern) = &validation.pattern {
        match Regex::new(pattern) {
            Ok(regex) if !regex.is_match(text) => return Err(format!("must match the pattern {pattern}")),
            Ok(_) => {}
            Err(error) => debug!(%pattern, %error, "ignoring invalid field pattern"),
        }
    }
    Ok(())
}

fn check_format(field_type: &FieldType, text: &str) -> Result<(), String> {
    let valid = match field_type {
        FieldType::Email => EMAIL_PATTERN.as_ref().is_none_or(|regex| regex.is_match(text)),
        FieldType::Url => url::Url::parse(text).is_ok_and(|url| url.has_host()),
        FieldType::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok(),
        FieldType::DateTime => is_datetime(text),
        FieldType::Time => ["%H:%M", "%H:%M:%S"]
            .iter()
            .any(|format| NaiveTime::parse_from_str(text, format).is_ok()),
        _ => true,
    };
    if valid {
        return Ok(());
    }
    let message = match field_type {
        FieldType::Email => "must be a valid email address",
        FieldType::Url => "must be a valid URL",
        FieldType::Date => "must be a valid date (YYYY-MM-DD)",
        FieldType::DateTime => "must be a valid date and time",
        _ => "must be a valid time (HH:MM)",
    };
    Err(message.to_string())
}

fn is_datetime(text: &str) -> bool {
    DateTime::parse_from_rfc3339(text).is_ok()
        || ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(text, format).is_ok())
}

fn json_values_match(expected: &Value, candidate: &Value) -> bool {
    if expected == candidate {
        return true;
    }
    match (expected, candidate) {
        (Value::String(expected_text), other) if !other.is_string() => expected_text == &other.to_string(),
        (other, Value::String(candidate_text)) if !other.is_string() => {
            serde_json::from_str::<Value>(candidate_text).is_ok_and(|parsed| &parsed == other)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::interpret_schema;
    use serde_json::json;

    fn product_schema() -> Value {
        json!({
            "type": "object",
            "required": ["manufacturerPartId", "contact"],
            "properties": {
                "manufacturerPartId": { "type": "string", "minLength": 3, "pattern": "^[A-Z0-9-]+$" },
                "contact": { "type": "string", "format": "email" },
                "website": { "type": "string", "format": "uri" },
                "validFrom": { "type": "string", "format": "date" },
                "weight": { "type": "number", "minimum": 0, "maximum": 1000 },
                "status": { "type": "string", "enum": ["draft", "released"] },
                "materialList": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "required": ["name"],
                        "properties": {
                            "name": { "type": "string" },
                            "share": { "type": "integer", "maximum": 100 }
                        }
                    }
                }
            }
        })
    }

    fn paths(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|issue| issue.path.as_str()).collect()
    }

    #[test]
    fn valid_document_has_no_issues() {
        let fields = interpret_schema(&product_schema()).expect("interpret");
        let data = json!({
            "manufacturerPartId": "MP-100",
            "contact": "ops@example.com",
            "website": "https://example.com/parts",
            "validFrom": "2024-05-01",
            "weight": 12.5,
            "status": "released",
            "materialList": [{ "name": "steel", "share": 80 }]
        });
        assert_eq!(validate_form(&fields, &data), Vec::<ValidationIssue>::new());
    }

    #[test]
    fn reports_required_and_constraint_failures() {
        let fields = interpret_schema(&product_schema()).expect("interpret");
        let data = json!({
            "manufacturerPartId": "ab",
            "website": "not a url",
            "validFrom": "01/05/2024",
            "weight": -1,
            "status": "archived",
            "materialList": []
        });
        let issues = validate_form(&fields, &data);
        assert_eq!(
            paths(&issues),
            vec!["manufacturerPartId", "contact", "website", "validFrom", "weight", "status", "materialList"]
        );
        assert_eq!(issues[0].to_string(), "manufacturerPartId must be at least 3 characters");
        assert_eq!(issues[1].message, "is required");
        assert_eq!(issues[4].message, "must be greater than or equal to 0");
        assert_eq!(issues[6].message, "must contain at least 1 items");
    }

    #[test]
    fn array_items_are_validated_per_index() {
        let fields = interpret_schema(&product_schema()).expect("interpret");
        let data = json!({
            "manufacturerPartId": "MP-1",
            "contact": "ops@example.com",
            "materialList": [{ "name": "steel" }, { "name": "", "share": 120 }]
        });
        let issues = validate_form(&fields, &data);
        assert_eq!(
            issues,
            vec![
                ValidationIssue::new("materialList[1].name", "is required"),
                ValidationIssue::new("materialList[1].share", "must be less than or equal to 100"),
            ]
        );
    }

    #[test]
    fn select_accepts_stringified_numbers() {
        let options = vec![ichub_types::SelectOption {
            value: json!(2),
            label: "Two".to_string(),
        }];
        let field = FieldDescriptor {
            key: "level".to_string(),
            label: "Level".to_string(),
            field_type: FieldType::Select { options },
            section: ichub_types::DEFAULT_SECTION.to_string(),
            required: false,
            description: None,
            urn: None,
            placeholder: None,
            validation: None,
            default: None,
        };
        assert!(validate_field_value(&field, &json!("2")).is_ok());
        assert!(validate_field_value(&field, &json!(3)).is_err());
    }
}
