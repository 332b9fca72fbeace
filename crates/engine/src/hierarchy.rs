//! Field hierarchy builder.
//!
//! Groups descriptors by section and rebuilds a tree from their dotted keys so
//! nested members render inside their parent's container. The tree is layout
//! only; form data stays addressed by full paths.

use ichub_types::FieldDescriptor;
use indexmap::IndexMap;
use thiserror::Error;

/// Ordered children of a hierarchy level, keyed by path segment.
pub type HierarchyLevel = IndexMap<String, HierarchyNode>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HierarchyError {
    /// Two descriptors share the same full key.
    #[error("duplicate field key '{0}'")]
    DuplicateKey(String),
}

/// One node of the layout tree.
///
/// A node may carry a descriptor, children, or both: an object container's
/// own descriptor and its members share the container's node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HierarchyNode {
    /// Last key segment.
    pub segment: String,
    /// Full dotted key up to and including `segment`.
    pub path: String,
    pub field: Option<FieldDescriptor>,
    pub children: HierarchyLevel,
}

impl HierarchyNode {
    fn new(segment: &str, path: String) -> Self {
        Self {
            segment: segment.to_string(),
            path,
            field: None,
            children: IndexMap::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.field.is_some() && self.children.is_empty()
    }
}

/// Groups descriptors by section, preserving first-appearance order of
/// sections and the original order of fields within each.
pub fn group_by_section(fields: &[FieldDescriptor]) -> IndexMap<String, Vec<FieldDescriptor>> {
    let mut sections: IndexMap<String, Vec<FieldDescriptor>> = IndexMap::new();
    for field in fields {
        sections.entry(field.section.clone()).or_default().push(field.clone());
    }
    sections
}

/// Builds the layout tree for `fields`.
///
/// Keys are split on `.`; intermediate nodes are created as needed and the
/// final segment's node receives the descriptor. Two descriptors with the
/// same key are rejected.
pub fn build_hierarchy(fields: &[FieldDescriptor]) -> Result<HierarchyLevel, HierarchyError> {
    let mut roots = HierarchyLevel::new();
    for field in fields {
        let mut level = &mut roots;
        let mut path = String::new();
        let segments = field.key.split('.').filter(|segment| !segment.is_empty()).collect::<Vec<_>>();
        let Some((last, parents)) = segments.split_last() else {
            continue;
        };

        for segment in parents {
            extend_path(&mut path, segment);
            let node = level
                .entry((*segment).to_string())
                .or_insert_with(|| HierarchyNode::new(segment, path.clone()));
            level = &mut node.children;
        }

        extend_path(&mut path, last);
        let node = level
            .entry((*last).to_string())
            .or_insert_with(|| HierarchyNode::new(last, path.clone()));
        if node.field.is_some() {
            return Err(HierarchyError::DuplicateKey(field.key.clone()));
        }
        node.field = Some(field.clone());
    }
    Ok(roots)
}

fn extend_path(path: &mut String, segment: &str) {
    if !path.is_empty() {
        path.push('.');
    }
    path.push_str(segment);
}

/// Looks up the node at a dotted key.
pub fn find_node<'a>(level: &'a HierarchyLevel, key: &str) -> Option<&'a HierarchyNode> {
    let mut segments = key.split('.').filter(|segment| !segment.is_empty());
    let mut node = level.get(segments.next()?)?;
    for segment in segments {
        node = node.children.get(segment)?;
    }
    Some(node)
}

/// Leaf descriptors in depth-first order.
pub fn collect_leaves(level: &HierarchyLevel) -> Vec<&FieldDescriptor> {
    let mut leaves = Vec::new();
    for node in level.values() {
        push_leaves(node, &mut leaves);
    }
    leaves
}

fn push_leaves<'a>(node: &'a HierarchyNode, out: &mut Vec<&'a FieldDescriptor>) {
    if node.is_leaf() {
        if let Some(field) = &node.field {
            out.push(field);
        }
        return;
    }
    for child in node.children.values() {
        push_leaves(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{flatten_fields, interpret_schema};
    use ichub_types::{DEFAULT_SECTION, FieldType, ItemType};
    use serde_json::json;

    fn text(key: &str, section: &str) -> FieldDescriptor {
        FieldDescriptor {
            key: key.to_string(),
            label: key.to_string(),
            field_type: FieldType::Text,
            section: section.to_string(),
            required: false,
            description: None,
            urn: None,
            placeholder: None,
            validation: None,
            default: None,
        }
    }

    #[test]
    fn groups_sections_in_first_appearance_order() {
        let fields = vec![text("a", "Identity"), text("b", "Physical"), text("c", "Identity")];
        let sections = group_by_section(&fields);
        assert_eq!(sections.keys().collect::<Vec<_>>(), vec!["Identity", "Physical"]);
        assert_eq!(sections["Identity"].len(), 2);
    }

    #[test]
    fn nests_members_under_their_container() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "address": {
                    "type": "object",
                    "properties": {
                        "city": { "type": "string" },
                        "geo": {
                            "type": "object",
                            "properties": { "lat": { "type": "number" } }
                        }
                    }
                }
            }
        });
        let fields = interpret_schema(&schema).expect("interpret");
        let tree = build_hierarchy(&fields).expect("tree");

        let address = &tree["address"];
        assert!(address.field.is_some());
        assert!(!address.is_leaf());
        assert_eq!(address.children.keys().collect::<Vec<_>>(), vec!["city", "geo"]);
        let lat = find_node(&tree, "address.geo.lat").expect("lat node");
        assert!(lat.is_leaf());
        assert_eq!(lat.path, "address.geo.lat");
    }

    #[test]
    fn every_leaf_appears_exactly_once() {
        let schema = json!({
            "type": "object",
            "properties": {
                "a": { "type": "object", "properties": { "b": { "type": "string" }, "c": { "type": "integer" } } },
                "d": { "type": "array", "items": { "type": "string" } },
                "e": { "type": "boolean" }
            }
        });
        let fields = interpret_schema(&schema).expect("interpret");
        let tree = build_hierarchy(&fields).expect("tree");
        let leaves = collect_leaves(&tree).into_iter().map(|field| field.key.as_str()).collect::<Vec<_>>();
        let expected = fields
            .iter()
            .filter(|field| !matches!(field.field_type, FieldType::Object { .. }))
            .map(|field| field.key.as_str())
            .collect::<Vec<_>>();
        assert_eq!(leaves, expected);
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let fields = vec![text("name", DEFAULT_SECTION), text("name", "Other")];
        assert_eq!(build_hierarchy(&fields), Err(HierarchyError::DuplicateKey("name".to_string())));
    }

    #[test]
    fn array_item_fields_build_under_item_prefix() {
        let schema = json!({
            "materialList": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "origin": { "type": "object", "properties": { "country": { "type": "string" } } }
                    }
                }
            }
        });
        let fields = interpret_schema(&schema).expect("interpret");
        let FieldType::Array {
            items: ItemType::Object(item_fields),
        } = &fields[0].field_type
        else {
            panic!("expected object items");
        };
        let tree = build_hierarchy(&flatten_fields(item_fields)).expect("item tree");
        let item_root = find_node(&tree, "materialList[item]").expect("item root");
        assert!(item_root.field.is_none());
        assert_eq!(item_root.children.keys().collect::<Vec<_>>(), vec!["name", "origin"]);
        assert!(find_node(&tree, "materialList[item].origin.country").is_some_and(HierarchyNode::is_leaf));
    }
}
