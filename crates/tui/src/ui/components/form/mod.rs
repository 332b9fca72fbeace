//! The sectioned form view.

mod controls;
mod form_component;
mod registry;
mod row_view;
mod rows;
mod state;

pub use form_component::FormComponent;
pub use registry::{ContainerKind, FieldRegistry, RegisteredField};
pub use rows::{FormLayout, FormRow, RowKind, build_rows};
pub use state::{Editor, FormState, Highlight};
