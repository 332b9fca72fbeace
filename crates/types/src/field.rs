//! Field descriptors derived from a form schema.
//!
//! A [`FieldDescriptor`] is the unit of form structure: it is produced once by
//! the schema interpreter and never mutated afterwards. Renderers dispatch on
//! [`FieldType`] with an exhaustive `match`, so every control kind the form can
//! show is listed here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder segment used in schema keys for "any item of this array".
pub const ITEM_PLACEHOLDER: &str = "[item]";

/// Section assigned to fields that neither declare nor inherit one.
pub const DEFAULT_SECTION: &str = "General";

/// Selectable option for `select` and `radio` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Literal stored in the form data when this option is chosen.
    pub value: Value,
    /// Human readable label.
    pub label: String,
}

/// Declarative constraints attached to a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
}

impl FieldValidation {
    /// Returns true when no constraint is set.
    pub fn is_empty(&self) -> bool {
        self == &FieldValidation::default()
    }
}

/// Element type of an array field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "fields", rename_all = "snake_case")]
pub enum ItemType {
    Text,
    Number,
    Integer,
    Boolean,
    /// Array of objects; children keys are `<array key>[item].<child>`.
    Object(Vec<FieldDescriptor>),
}

/// Closed set of control kinds a field can render as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Integer,
    Date,
    #[serde(rename = "datetime")]
    DateTime,
    Time,
    Email,
    Url,
    Select { options: Vec<SelectOption> },
    Checkbox,
    Radio { options: Vec<SelectOption> },
    Array { items: ItemType },
    /// Object container. `fields` holds the direct children; the interpreter
    /// also flattens them into the top-level descriptor list.
    Object { fields: Vec<FieldDescriptor> },
}

/// Rendering and error-matching strategy implied by a [`FieldType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCategory {
    Simple,
    Complex,
}

impl FieldType {
    pub fn category(&self) -> FieldCategory {
        match self {
            FieldType::Array { .. } | FieldType::Object { .. } => FieldCategory::Complex,
            _ => FieldCategory::Simple,
        }
    }

    /// Short lowercase name used in logs and the `fields` listing.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Time => "time",
            FieldType::Email => "email",
            FieldType::Url => "url",
            FieldType::Select { .. } => "select",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio { .. } => "radio",
            FieldType::Array { .. } => "array",
            FieldType::Object { .. } => "object",
        }
    }

    /// Options for choice controls, empty for everything else.
    pub fn options(&self) -> &[SelectOption] {
        match self {
            FieldType::Select { options } | FieldType::Radio { options } => options,
            _ => &[],
        }
    }
}

/// Normalized description of one schema-derived form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Dotted path, unique within a schema (e.g. `materialList[item].name`).
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub field_type: FieldType,
    pub section: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urn: Option<String>,
    /// First entry of the schema's `examples`, shown while the value is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldDescriptor {
    pub fn category(&self) -> FieldCategory {
        self.field_type.category()
    }

    pub fn is_complex(&self) -> bool {
        self.category() == FieldCategory::Complex
    }

    /// Children rendered inside this field's container: object members or the
    /// fields of one array item.
    pub fn children(&self) -> &[FieldDescriptor] {
        match &self.field_type {
            FieldType::Object { fields } => fields,
            FieldType::Array {
                items: ItemType::Object(fields),
            } => fields,
            _ => &[],
        }
    }

    /// Last dotted segment of the key.
    pub fn leaf_name(&self) -> &str {
        self.key.rsplit('.').next().unwrap_or(&self.key)
    }

    /// Key prefix shared by the children of an array-of-objects field.
    pub fn item_prefix(&self) -> String {
        format!("{}{}", self.key, ITEM_PLACEHOLDER)
    }

    /// True when the field carries documentation worth an info affordance.
    pub fn has_documentation(&self) -> bool {
        self.description.as_deref().is_some_and(|text| !text.trim().is_empty()) || self.urn.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(key: &str, field_type: FieldType) -> FieldDescriptor {
        FieldDescriptor {
            key: key.to_string(),
            label: key.to_string(),
            field_type,
            section: DEFAULT_SECTION.to_string(),
            required: false,
            description: None,
            urn: None,
            placeholder: None,
            validation: None,
            default: None,
        }
    }

    #[test]
    fn category_follows_type() {
        assert_eq!(descriptor("name", FieldType::Text).category(), FieldCategory::Simple);
        let tags = descriptor("tags", FieldType::Array { items: ItemType::Text });
        assert_eq!(tags.category(), FieldCategory::Complex);
        assert!(tags.children().is_empty());
    }

    #[test]
    fn serializes_with_flattened_type_tag() {
        let field = descriptor(
            "status",
            FieldType::Select {
                options: vec![SelectOption {
                    value: json!("draft"),
                    label: "Draft".to_string(),
                }],
            },
        );
        let value = serde_json::to_value(&field).expect("serialize descriptor");
        assert_eq!(value["type"], json!("select"));
        assert_eq!(value["options"][0]["label"], json!("Draft"));
        assert!(value.get("urn").is_none());
    }

    #[test]
    fn item_prefix_uses_placeholder() {
        let list = descriptor("materialList", FieldType::Array { items: ItemType::Object(vec![]) });
        assert_eq!(list.item_prefix(), "materialList[item]");
        assert_eq!(descriptor("a.b.c", FieldType::Text).leaf_name(), "c");
    }
}
