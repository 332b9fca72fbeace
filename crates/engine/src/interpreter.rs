//! Schema interpreter: JSON Schema (plus form vendor extensions) to field
//! descriptors.
//!
//! The interpreter accepts both regular JSON Schema documents and the
//! shorthand notation used by the console's form definitions, where form
//! control names appear directly as `type` (`text`, `date`, `select`, ...),
//! `required: true` sits on the property itself and arrays declare
//! `itemType`.
//!
//! Output is an ordered, flat list: one descriptor per leaf and one synthetic
//! descriptor per object container, with object members flattened after their
//! container. Array-of-object children stay nested inside the array's
//! [`ItemType::Object`] because they exist once per item.
//!
//! Nodes with an unknown or missing type are skipped so the rest of the form
//! still renders.

use ichub_types::{DEFAULT_SECTION, FieldDescriptor, FieldType, FieldValidation, ITEM_PLACEHOLDER, ItemType, SelectOption};
use ichub_util::field_path::join_path;
use ichub_util::schema::{SchemaResolutionContext, extract_schema_reference, resolve_schema_map, with_resolution_frame};
use ichub_util::text_processing::humanize_key;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Error returned when a schema cannot be interpreted at all.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// The root is neither an object schema nor a property map.
    #[error("schema root must be an object schema or a map of properties")]
    InvalidRoot,
}

/// Knobs applied while deriving descriptors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterpretOptions {
    /// Keep only required leaves (and the containers that still hold some).
    pub required_only: bool,
}

/// Interprets `schema` into a flat descriptor list with default options.
pub fn interpret_schema(schema: &Value) -> Result<Vec<FieldDescriptor>, SchemaError> {
    interpret_schema_with(schema, InterpretOptions::default())
}

/// Interprets `schema` into a flat descriptor list.
pub fn interpret_schema_with(schema: &Value, options: InterpretOptions) -> Result<Vec<FieldDescriptor>, SchemaError> {
    let tree = interpret_tree(schema)?;
    let tree = if options.required_only { filter_required(&tree) } else { tree };
    Ok(flatten_fields(&tree))
}

/// Interprets `schema` into top-level descriptors whose object members stay
/// nested inside [`FieldType::Object`].
pub fn interpret_tree(schema: &Value) -> Result<Vec<FieldDescriptor>, SchemaError> {
    let root_map = resolve_schema_map(schema, schema).ok_or(SchemaError::InvalidRoot)?;
    let (properties, required) = match root_map.get("properties").and_then(Value::as_object) {
        Some(properties) => (properties, string_list(root_map.get("required"))),
        None if looks_like_property_map(root_map) => (root_map, Vec::new()),
        None => return Err(SchemaError::InvalidRoot),
    };
    let root_section = section_attr(root_map);

    let mut interpreter = Interpreter {
        root: schema,
        context: SchemaResolutionContext::default(),
    };
    Ok(interpreter.interpret_properties(properties, &required, "", root_section.as_deref()))
}

/// Expands object containers so each member follows its container.
pub fn flatten_fields(fields: &[FieldDescriptor]) -> Vec<FieldDescriptor> {
    let mut flat = Vec::new();
    for field in fields {
        push_flattened(field, &mut flat);
    }
    flat
}

fn push_flattened(field: &FieldDescriptor, out: &mut Vec<FieldDescriptor>) {
    out.push(field.clone());
    if let FieldType::Object { fields } = &field.field_type {
        for child in fields {
            push_flattened(child, out);
        }
    }
}

/// Prunes non-required leaves and drops composite descriptors left without
/// children. Works on flat or nested lists alike and is idempotent.
pub fn filter_required(fields: &[FieldDescriptor]) -> Vec<FieldDescriptor> {
    fields.iter().filter_map(retain_required).collect()
}

fn retain_required(field: &FieldDescriptor) -> Option<FieldDescriptor> {
    match &field.field_type {
        FieldType::Object { fields } => {
            let kept = filter_required(fields);
            if kept.is_empty() {
                return None;
            }
            Some(FieldDescriptor {
                field_type: FieldType::Object { fields: kept },
                ..field.clone()
            })
        }
        FieldType::Array {
            items: ItemType::Object(item_fields),
        } => {
            let kept = filter_required(item_fields);
            if kept.is_empty() {
                return None;
            }
            Some(FieldDescriptor {
                field_type: FieldType::Array {
                    items: ItemType::Object(kept),
                },
                ..field.clone()
            })
        }
        _ => field.required.then(|| field.clone()),
    }
}

struct Interpreter<'a> {
    root: &'a Value,
    context: SchemaResolutionContext,
}

/// Attribute lookup that prefers keys written next to a `$ref` over the keys
/// of the referenced definition.
struct NodeView<'a> {
    local: Option<&'a Map<String, Value>>,
    resolved: &'a Map<String, Value>,
}

impl<'a> NodeView<'a> {
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.local.and_then(|local| local.get(key)).or_else(|| self.resolved.get(key))
    }

    fn str(&self, key: &str) -> Option<&'a str> {
        self.get(key).and_then(Value::as_str)
    }

    fn first_str(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .find_map(|key| self.str(key))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string)
    }

    fn number(&self, keys: &[&str]) -> Option<f64> {
        keys.iter().find_map(|key| self.get(key).and_then(Value::as_f64))
    }

    fn count(&self, keys: &[&str]) -> Option<usize> {
        keys.iter()
            .find_map(|key| self.get(key).and_then(Value::as_u64))
            .and_then(|value| usize::try_from(value).ok())
    }
}

impl Interpreter<'_> {
    fn interpret_properties(
        &mut self,
        properties: &Map<String, Value>,
        required: &[String],
        prefix: &str,
        inherited_section: Option<&str>,
    ) -> Vec<FieldDescriptor> {
        let mut fields = Vec::with_capacity(properties.len());
        for (name, node) in properties {
            let key = join_path(prefix, name);
            let listed_required = required.iter().any(|entry| entry == name);
            match self.interpret_node(&key, node, listed_required, inherited_section) {
                Some(field) => fields.push(field),
                None => debug!(key = %key, "skipping schema node with unsupported type"),
            }
        }
        fields
    }

    fn interpret_node(
        &mut self,
        key: &str,
        node: &Value,
        listed_required: bool,
        inherited_section: Option<&str>,
    ) -> Option<FieldDescriptor> {
        let root = self.root;
        let reference = extract_schema_reference(node);
        with_resolution_frame(
            &mut self.context,
            reference,
            || None,
            |context| {
                let resolved = resolve_schema_map(node, root)?;
                let view = NodeView {
                    local: node.as_object(),
                    resolved,
                };
                let mut nested = Interpreter {
                    root,
                    context: std::mem::take(context),
                };
                let field = nested.build_descriptor(key, &view, listed_required, inherited_section);
                *context = nested.context;
                field
            },
        )
    }

    fn build_descriptor(
        &mut self,
        key: &str,
        view: &NodeView<'_>,
        listed_required: bool,
        inherited_section: Option<&str>,
    ) -> Option<FieldDescriptor> {
        let own_section = view.first_str(&["x-section", "section"]);
        let section = own_section
            .or_else(|| inherited_section.map(ToString::to_string))
            .unwrap_or_else(|| DEFAULT_SECTION.to_string());
        let type_name = resolve_type_name(view)?;
        let field_type = self.build_field_type(key, &type_name, view, &section)?;

        let required = listed_required || view.get("required").and_then(Value::as_bool).unwrap_or(false);
        let validation = build_validation(view);

        Some(FieldDescriptor {
            key: key.to_string(),
            label: view
                .first_str(&["title", "label"])
                .unwrap_or_else(|| humanize_key(key)),
            field_type,
            section,
            required,
            description: view.first_str(&["description"]),
            urn: view.first_str(&["x-urn", "urn"]),
            placeholder: placeholder(view),
            validation: (!validation.is_empty()).then_some(validation),
            default: view.get("default").cloned(),
        })
    }

    fn build_field_type(&mut self, key: &str, type_name: &str, view: &NodeView<'_>, section: &str) -> Option<FieldType> {
        let widget = view.first_str(&["x-widget", "widget"]).map(|widget| widget.to_lowercase());
        let options = build_options(view);

        let field_type = match type_name {
            "string" | "text" => string_field_type(view, widget.as_deref(), options),
            "textarea" => FieldType::Textarea,
            "date" => FieldType::Date,
            "datetime" | "date-time" => FieldType::DateTime,
            "time" => FieldType::Time,
            "email" => FieldType::Email,
            "url" | "uri" => FieldType::Url,
            "number" | "integer" => match options {
                Some(options) => choice_field_type(widget.as_deref(), options),
                None if type_name == "integer" => FieldType::Integer,
                None => FieldType::Number,
            },
            "boolean" | "checkbox" => FieldType::Checkbox,
            "select" => FieldType::Select {
                options: options.unwrap_or_default(),
            },
            "radio" => FieldType::Radio {
                options: options.unwrap_or_default(),
            },
            "object" => {
                let properties = view.get("properties").and_then(Value::as_object)?;
                let required = string_list(view.get("required"));
                let fields = self.interpret_properties(properties, &required, key, Some(section));
                if fields.is_empty() {
                    return None;
                }
                FieldType::Object { fields }
            }
            "array" | "list" => FieldType::Array {
                items: self.build_item_type(key, view, section)?,
            },
            _ => return None,
        };
        Some(field_type)
    }

    fn build_item_type(&mut self, key: &str, view: &NodeView<'_>, section: &str) -> Option<ItemType> {
        let item_prefix = format!("{key}{ITEM_PLACEHOLDER}");

        if let Some(item_type) = view.str("itemType") {
            return match item_type.to_lowercase().as_str() {
                "object" => {
                    let properties = view.get("itemFields").and_then(Value::as_object)?;
                    let fields = self.interpret_properties(properties, &[], &item_prefix, Some(section));
                    (!fields.is_empty()).then_some(ItemType::Object(fields))
                }
                other => scalar_item_type(other),
            };
        }

        let items = view.get("items")?;
        let items = match items {
            Value::Array(tuple) => tuple.first()?,
            other => other,
        };
        let root = self.root;
        let item_map = resolve_schema_map(items, root)?;
        let item_view = NodeView {
            local: items.as_object(),
            resolved: item_map,
        };
        let item_type = resolve_type_name(&item_view)?;
        if item_type != "object" {
            return scalar_item_type(&item_type);
        }

        let properties = item_view.get("properties").and_then(Value::as_object)?;
        let required = string_list(item_view.get("required"));
        let reference = extract_schema_reference(items);
        let fields = with_resolution_frame(
            &mut self.context,
            reference,
            Vec::new,
            |context| {
                let mut nested = Interpreter {
                    root,
                    context: std::mem::take(context),
                };
                let fields = nested.interpret_properties(properties, &required, &item_prefix, Some(section));
                *context = nested.context;
                fields
            },
        );
        (!fields.is_empty()).then_some(ItemType::Object(fields))
    }
}

fn scalar_item_type(type_name: &str) -> Option<ItemType> {
    match type_name {
        "string" | "text" | "textarea" | "date" | "datetime" | "date-time" | "time" | "email" | "url" | "uri" => {
            Some(ItemType::Text)
        }
        "number" => Some(ItemType::Number),
        "integer" => Some(ItemType::Integer),
        "boolean" | "checkbox" => Some(ItemType::Boolean),
        _ => None,
    }
}

fn string_field_type(view: &NodeView<'_>, widget: Option<&str>, options: Option<Vec<SelectOption>>) -> FieldType {
    if let Some(options) = options {
        return choice_field_type(widget, options);
    }
    if widget == Some("textarea") {
        return FieldType::Textarea;
    }
    match view.str("format").map(str::to_lowercase).as_deref() {
        Some("date") => FieldType::Date,
        Some("date-time") | Some("datetime") => FieldType::DateTime,
        Some("time") => FieldType::Time,
        Some("email") => FieldType::Email,
        Some("uri") | Some("url") => FieldType::Url,
        Some("textarea") => FieldType::Textarea,
        _ => FieldType::Text,
    }
}

fn choice_field_type(widget: Option<&str>, options: Vec<SelectOption>) -> FieldType {
    if widget == Some("radio") {
        FieldType::Radio { options }
    } else {
        FieldType::Select { options }
    }
}

/// Resolves the declared type name, lowercased. `["string", "null"]` counts
/// as `string`; untyped nodes are inferred from `properties`, `items` or
/// `enum`.
fn resolve_type_name(view: &NodeView<'_>) -> Option<String> {
    match view.get("type") {
        Some(Value::String(name)) => return Some(name.to_lowercase()),
        Some(Value::Array(names)) => {
            let mut non_null = names
                .iter()
                .filter_map(Value::as_str)
                .filter(|name| *name != "null");
            let first = non_null.next()?;
            if non_null.next().is_some() {
                return None;
            }
            return Some(first.to_lowercase());
        }
        Some(_) => return None,
        None => {}
    }
    if view.get("properties").is_some() {
        Some("object".to_string())
    } else if view.get("items").is_some() || view.get("itemType").is_some() {
        Some("array".to_string())
    } else if view.get("enum").is_some() {
        Some("string".to_string())
    } else {
        None
    }
}

fn build_options(view: &NodeView<'_>) -> Option<Vec<SelectOption>> {
    if let Some(values) = view.get("enum").and_then(Value::as_array) {
        let labels = view
            .get("x-enumLabels")
            .or_else(|| view.get("enumNames"))
            .and_then(Value::as_array);
        let options = values
            .iter()
            .enumerate()
            .filter(|(_, value)| !value.is_null())
            .map(|(index, value)| SelectOption {
                value: value.clone(),
                label: labels
                    .and_then(|labels| labels.get(index))
                    .and_then(Value::as_str)
                    .map(ToString::to_string)
                    .unwrap_or_else(|| literal_label(value)),
            })
            .collect::<Vec<_>>();
        return Some(options);
    }

    let entries = view.get("options").and_then(Value::as_array)?;
    let options = entries
        .iter()
        .map(|entry| match entry {
            Value::Object(map) => {
                let value = map.get("value").cloned().unwrap_or(Value::Null);
                let label = map
                    .get("label")
                    .and_then(Value::as_str)
                    .map(ToString::to_string)
                    .unwrap_or_else(|| literal_label(&value));
                SelectOption { value, label }
            }
            other => SelectOption {
                value: other.clone(),
                label: literal_label(other),
            },
        })
        .collect();
    Some(options)
}

fn literal_label(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn build_validation(view: &NodeView<'_>) -> FieldValidation {
    FieldValidation {
        min: view.number(&["minimum", "min"]),
        max: view.number(&["maximum", "max"]),
        min_length: view.count(&["minLength"]),
        max_length: view.count(&["maxLength"]),
        pattern: view.first_str(&["pattern"]),
        min_items: view.count(&["minItems"]),
        max_items: view.count(&["maxItems"]),
    }
}

fn placeholder(view: &NodeView<'_>) -> Option<String> {
    if let Some(text) = view.first_str(&["placeholder"]) {
        return Some(text);
    }
    let example = match view.get("examples")? {
        Value::Array(values) => values.first()?,
        other => other,
    };
    match example {
        Value::Null | Value::Object(_) | Value::Array(_) => None,
        other => Some(literal_label(other)),
    }
}

fn section_attr(map: &Map<String, Value>) -> Option<String> {
    ["x-section", "section"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .map(ToString::to_string)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|values| values.iter().filter_map(Value::as_str).map(ToString::to_string).collect())
        .unwrap_or_default()
}

/// Shorthand form definitions are bare maps of property name to property
/// object. JSON Schema keywords at the root rule that reading out.
fn looks_like_property_map(map: &Map<String, Value>) -> bool {
    const SCHEMA_KEYWORDS: [&str; 4] = ["type", "$schema", "$defs", "definitions"];
    !map.is_empty()
        && !SCHEMA_KEYWORDS.iter().any(|keyword| map.contains_key(*keyword))
        && map.values().all(Value::is_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(fields: &[FieldDescriptor]) -> Vec<&str> {
        fields.iter().map(|field| field.key.as_str()).collect()
    }

    fn catalog_part_schema() -> Value {
        json!({
            "type": "object",
            "required": ["manufacturerPartId", "materialList"],
            "properties": {
                "manufacturerPartId": {
                    "type": "string",
                    "title": "Manufacturer Part ID",
                    "x-section": "Identification",
                    "x-urn": "urn:samm:io.catenax.part_type_information:1.0.0#manufacturerPartId",
                    "pattern": "^[A-Z0-9-]+$",
                    "examples": ["MPI-0012"]
                },
                "validFrom": { "type": "string", "format": "date" },
                "status": { "type": "string", "enum": ["draft", "active"] },
                "dimensions": {
                    "type": "object",
                    "x-section": "Physical",
                    "required": ["width"],
                    "properties": {
                        "width": { "type": "number", "minimum": 0 },
                        "height": { "type": "number" }
                    }
                },
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
                },
                "tags": { "type": "array", "items": { "type": "string" } },
                "mystery": { "type": "quaternion" }
            }
        })
    }

    #[test]
    fn flattens_objects_and_keeps_array_items_nested() {
        let fields = interpret_schema(&catalog_part_schema()).expect("interpret");
        assert_eq!(
            keys(&fields),
            vec![
                "manufacturerPartId",
                "validFrom",
                "status",
                "dimensions",
                "dimensions.width",
                "dimensions.height",
                "materialList",
                "tags",
            ]
        );

        let materials = &fields[6];
        let FieldType::Array {
            items: ItemType::Object(item_fields),
        } = &materials.field_type
        else {
            panic!("materialList should be an array of objects");
        };
        assert_eq!(keys(item_fields), vec!["materialList[item].name", "materialList[item].share"]);
        assert!(item_fields[0].required);
        assert_eq!(fields[7].field_type, FieldType::Array { items: ItemType::Text });
    }

    #[test]
    fn captures_vendor_extensions_and_validation() {
        let fields = interpret_schema(&catalog_part_schema()).expect("interpret");
        let part_id = &fields[0];
        assert_eq!(part_id.label, "Manufacturer Part ID");
        assert_eq!(part_id.section, "Identification");
        assert!(part_id.required);
        assert!(part_id.urn.as_deref().is_some_and(|urn| urn.starts_with("urn:samm")));
        assert_eq!(part_id.placeholder.as_deref(), Some("MPI-0012"));
        assert_eq!(
            part_id.validation.as_ref().and_then(|rules| rules.pattern.as_deref()),
            Some("^[A-Z0-9-]+$")
        );
        assert_eq!(fields[1].field_type, FieldType::Date);
        assert_eq!(fields[1].label, "Valid From");
        assert!(matches!(&fields[2].field_type, FieldType::Select { options } if options.len() == 2));
    }

    #[test]
    fn sections_inherit_from_nearest_ancestor() {
        let fields = interpret_schema(&catalog_part_schema()).expect("interpret");
        let width = fields.iter().find(|field| field.key == "dimensions.width").expect("width");
        assert_eq!(width.section, "Physical");
        assert!(width.required);
        let status = fields.iter().find(|field| field.key == "status").expect("status");
        assert_eq!(status.section, DEFAULT_SECTION);
    }

    #[test]
    fn accepts_shorthand_form_notation() {
        let schema = json!({
            "name": { "type": "text", "required": true },
            "tags": { "type": "array", "itemType": "text" },
            "notes": { "type": "textarea" },
            "kind": { "type": "radio", "options": [{ "value": "a", "label": "Alpha" }, "b"] }
        });
        let fields = interpret_schema(&schema).expect("interpret");
        assert_eq!(keys(&fields), vec!["name", "tags", "notes", "kind"]);
        assert!(fields[0].required);
        assert_eq!(fields[0].field_type, FieldType::Text);
        assert_eq!(fields[1].field_type, FieldType::Array { items: ItemType::Text });
        assert_eq!(fields[2].field_type, FieldType::Textarea);
        let options = fields[3].field_type.options();
        assert_eq!(options[0].label, "Alpha");
        assert_eq!(options[1].value, json!("b"));
    }

    #[test]
    fn resolves_local_references_and_survives_cycles() {
        let schema = json!({
            "type": "object",
            "$defs": {
                "Address": {
                    "type": "object",
                    "properties": {
                        "city": { "type": "string" },
                        "parent": { "$ref": "#/$defs/Address" }
                    }
                }
            },
            "properties": {
                "site": { "$ref": "#/$defs/Address", "x-section": "Location" }
            }
        });
        let fields = interpret_schema(&schema).expect("interpret");
        let city = fields.iter().find(|field| field.key == "site.city").expect("city");
        assert_eq!(city.section, "Location");
        assert!(fields.iter().all(|field| !field.key.contains("parent.parent")));
    }

    #[test]
    fn rejects_non_object_roots() {
        assert_eq!(interpret_schema(&json!("string")), Err(SchemaError::InvalidRoot));
        assert_eq!(interpret_schema(&json!({ "type": "string" })), Err(SchemaError::InvalidRoot));
    }

    #[test]
    fn required_filter_prunes_and_is_idempotent() {
        let fields = interpret_schema(&catalog_part_schema()).expect("interpret");
        let filtered = filter_required(&fields);
        assert_eq!(
            keys(&filtered),
            vec!["manufacturerPartId", "dimensions", "dimensions.width", "materialList"]
        );
        let FieldType::Array {
            items: ItemType::Object(item_fields),
        } = &filtered[3].field_type
        else {
            panic!("materialList should keep its object items");
        };
        assert_eq!(keys(item_fields), vec!["materialList[item].name"]);
        assert_eq!(filter_required(&filtered), filtered);
    }

    #[test]
    fn required_only_option_matches_filter() {
        let schema = catalog_part_schema();
        let direct = interpret_schema_with(&schema, InterpretOptions { required_only: true }).expect("interpret");
        let filtered = filter_required(&interpret_schema(&schema).expect("interpret"));
        assert_eq!(direct, filtered);
    }
}
