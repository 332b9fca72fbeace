//! # Industry Core Hub form engine
//!
//! Headless core of the dynamic form: it turns a JSON-Schema-like document
//! into field descriptors, arranges them into sections and a nested layout
//! tree, validates form data locally and correlates validator messages back
//! onto the fields they concern.
//!
//! ## Usage
//!
//! ```rust
//! use ichub_engine::{build_hierarchy, correlate, interpret_schema};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "required": ["name"],
//!     "properties": {
//!         "name": { "type": "string" },
//!         "address": { "type": "object", "properties": { "city": { "type": "string" } } }
//!     }
//! });
//! let fields = interpret_schema(&schema)?;
//! let tree = build_hierarchy(&fields)?;
//! assert!(tree["address"].children.contains_key("city"));
//!
//! let errors = correlate(&["address.city is required"]);
//! assert!(errors.state_for_key("address").has_child_errors);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`interpreter`**: schema to [`FieldDescriptor`](ichub_types::FieldDescriptor) list
//! - **`hierarchy`**: section grouping and the dotted-key layout tree
//! - **`correlate`**: error string attribution and the per-path error index
//! - **`validate`**: local constraint checks producing attributable messages
//! - **`form_ops`**: default values, array edits and numeric input parsing
//! - **`loader`**: JSON/YAML documents and error lists from disk

pub mod correlate;
pub mod form_ops;
pub mod hierarchy;
pub mod interpreter;
pub mod loader;
pub mod validate;

pub use correlate::{AttributedError, ErrorIndex, attribute_error, correlate, correlate_issues, is_known_path};
pub use form_ops::{
    NumericInput, append_item, default_value_for, empty_value_for, new_array_item, parse_numeric_input, remove_item,
    update_item,
};
pub use hierarchy::{HierarchyError, HierarchyLevel, HierarchyNode, build_hierarchy, collect_leaves, find_node, group_by_section};
pub use interpreter::{InterpretOptions, SchemaError, filter_required, flatten_fields, interpret_schema, interpret_schema_with, interpret_tree};
pub use loader::{load_document, load_error_list};
pub use validate::{ValidationIssue, is_empty_value, validate_field_value, validate_form};
