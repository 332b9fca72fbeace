//! Flattens the section hierarchy and the current data into the list of rows
//! the form draws and navigates.

use ichub_engine::{HierarchyError, HierarchyLevel, build_hierarchy, find_node, flatten_fields, group_by_section};
use ichub_types::{FieldDescriptor, FieldType, ItemType};
use ichub_util::field_path::{index_path, rebase_path};
use ichub_util::get_value;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

use super::registry::ContainerKind;
use super::state::FormState;

/// Per-section layout trees, in section order.
#[derive(Debug, Default, Clone)]
pub struct FormLayout {
    sections: IndexMap<String, HierarchyLevel>,
}

impl FormLayout {
    pub fn build(fields: &[FieldDescriptor]) -> Result<Self, HierarchyError> {
        let mut sections = IndexMap::new();
        for (name, members) in group_by_section(fields) {
            sections.insert(name, build_hierarchy(&members)?);
        }
        Ok(Self { sections })
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowKind {
    Section { name: String, expanded: bool, roots: Vec<String> },
    /// Object container, or an intermediate key segment without descriptor.
    Group { field: Option<FieldDescriptor>, expanded: bool },
    ArrayHeader { field: FieldDescriptor, len: usize, expanded: bool },
    ItemCard { array: FieldDescriptor, array_path: String, index: usize, expanded: bool },
    Field { field: FieldDescriptor },
    /// One element of an array of primitives.
    ScalarItem { array: FieldDescriptor, array_path: String, index: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormRow {
    pub kind: RowKind,
    pub depth: usize,
    /// Concrete data path; empty for section rows.
    pub path: String,
    /// Descriptor key used for error matching and documentation.
    pub schema_key: String,
}

impl FormRow {
    pub fn container_kind(&self) -> Option<ContainerKind> {
        match self.kind {
            RowKind::Section { .. } => None,
            RowKind::Group { .. } => Some(ContainerKind::ObjectGroup),
            RowKind::ArrayHeader { .. } => Some(ContainerKind::ArrayHeader),
            RowKind::ItemCard { .. } => Some(ContainerKind::ArrayItem),
            RowKind::Field { .. } | RowKind::ScalarItem { .. } => Some(ContainerKind::Input),
        }
    }

    /// Descriptor backing the row, if any.
    pub fn descriptor(&self) -> Option<&FieldDescriptor> {
        match &self.kind {
            RowKind::Group { field, .. } => field.as_ref(),
            RowKind::ArrayHeader { field, .. } | RowKind::Field { field } => Some(field),
            RowKind::ItemCard { array, .. } | RowKind::ScalarItem { array, .. } => Some(array),
            RowKind::Section { .. } => None,
        }
    }

    pub fn is_input(&self) -> bool {
        self.container_kind() == Some(ContainerKind::Input)
    }

    /// Array path and element type for rows that belong to an array.
    pub fn array_target(&self) -> Option<(&str, &ItemType)> {
        let (array, path) = match &self.kind {
            RowKind::ArrayHeader { field, .. } => (field, self.path.as_str()),
            RowKind::ItemCard { array, array_path, .. } | RowKind::ScalarItem { array, array_path, .. } => {
                (array, array_path.as_str())
            }
            _ => return None,
        };
        match &array.field_type {
            FieldType::Array { items } => Some((path, items)),
            _ => None,
        }
    }

    /// Index of the array element the row stands for.
    pub fn item_index(&self) -> Option<usize> {
        match self.kind {
            RowKind::ItemCard { index, .. } | RowKind::ScalarItem { index, .. } => Some(index),
            _ => None,
        }
    }
}

/// Rebases schema keys containing `[item]` onto the concrete item being drawn.
#[derive(Debug, Clone, Default)]
struct PathScope {
    rebases: Vec<(String, String)>,
}

impl PathScope {
    fn data_path(&self, key: &str) -> String {
        self.rebases
            .iter()
            .fold(key.to_string(), |path, (from, to)| rebase_path(&path, from, to).unwrap_or(path))
    }

    fn enter_item(&self, item_prefix: &str, item_path: &str) -> PathScope {
        let mut scope = self.clone();
        scope.rebases.push((self.data_path(item_prefix), item_path.to_string()));
        scope
    }
}

struct RowBuilder<'a> {
    data: &'a Value,
    state: &'a FormState,
    rows: Vec<FormRow>,
}

/// Visible rows for the current layout, data and open/closed state.
pub fn build_rows(layout: &FormLayout, data: &Value, state: &FormState) -> Vec<FormRow> {
    let mut builder = RowBuilder {
        data,
        state,
        rows: Vec::new(),
    };
    for (name, level) in &layout.sections {
        let expanded = state.expanded_section() == Some(name.as_str());
        builder.rows.push(FormRow {
            kind: RowKind::Section {
                name: name.clone(),
                expanded,
                roots: level.values().map(|node| node.path.clone()).collect(),
            },
            depth: 0,
            path: String::new(),
            schema_key: String::new(),
        });
        if expanded {
            builder.push_level(level, 1, &PathScope::default());
        }
    }
    builder.rows
}

impl RowBuilder<'_> {
    fn push_level(&mut self, level: &HierarchyLevel, depth: usize, scope: &PathScope) {
        for node in level.values() {
            match &node.field {
                Some(field) if matches!(field.field_type, FieldType::Array { .. }) => {
                    self.push_array(field, depth, scope);
                }
                Some(field) if node.children.is_empty() && !field.is_complex() => {
                    self.rows.push(FormRow {
                        kind: RowKind::Field { field: field.clone() },
                        depth,
                        path: scope.data_path(&field.key),
                        schema_key: field.key.clone(),
                    });
                }
                field => {
                    let path = scope.data_path(&node.path);
                    let expanded = self.state.is_group_expanded(&path);
                    self.rows.push(FormRow {
                        kind: RowKind::Group {
                            field: field.clone(),
                            expanded,
                        },
                        depth,
                        path,
                        schema_key: node.path.clone(),
                    });
                    if expanded {
                        self.push_level(&node.children, depth + 1, scope);
                    }
                }
            }
        }
    }

    fn push_array(&mut self, field: &FieldDescriptor, depth: usize, scope: &PathScope) {
        let FieldType::Array { items } = &field.field_type else {
            return;
        };
        let path = scope.data_path(&field.key);
        let len = get_value(self.data, &path).and_then(Value::as_array).map_or(0, Vec::len);
        let expanded = self.state.is_group_expanded(&path);
        self.rows.push(FormRow {
            kind: RowKind::ArrayHeader {
                field: field.clone(),
                len,
                expanded,
            },
            depth,
            path: path.clone(),
            schema_key: field.key.clone(),
        });
        if !expanded {
            return;
        }

        let item_prefix = field.item_prefix();
        match items {
            ItemType::Object(children) => {
                let tree = match build_hierarchy(&flatten_fields(children)) {
                    Ok(tree) => tree,
                    Err(error) => {
                        warn!(key = %field.key, %error, "cannot lay out array items");
                        return;
                    }
                };
                let Some(item_node) = find_node(&tree, &item_prefix) else {
                    return;
                };
                for index in 0..len {
                    let item_path = index_path(&path, index);
                    let item_expanded = self.state.is_item_expanded(&item_path);
                    self.rows.push(FormRow {
                        kind: RowKind::ItemCard {
                            array: field.clone(),
                            array_path: path.clone(),
                            index,
                            expanded: item_expanded,
                        },
                        depth: depth + 1,
                        path: item_path.clone(),
                        schema_key: item_prefix.clone(),
                    });
                    if item_expanded {
                        let inner = scope.enter_item(&item_prefix, &item_path);
                        self.push_level(&item_node.children, depth + 2, &inner);
                    }
                }
            }
            _ => {
                for index in 0..len {
                    self.rows.push(FormRow {
                        kind: RowKind::ScalarItem {
                            array: field.clone(),
                            array_path: path.clone(),
                            index,
                        },
                        depth: depth + 1,
                        path: index_path(&path, index),
                        schema_key: item_prefix.clone(),
                    });
                }
            }
        }
    }
}
