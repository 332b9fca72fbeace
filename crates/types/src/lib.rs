//! Shared type definitions for the Industry Core Hub form core.
//!
//! Everything here is plain data: field descriptors produced by the schema
//! interpreter, per-path error state produced by the error correlator, and the
//! messages/effects exchanged between the form and its host.

pub mod error_state;
pub mod field;
pub mod messages;

pub use error_state::ErrorState;
pub use field::{
    DEFAULT_SECTION, FieldCategory, FieldDescriptor, FieldType, FieldValidation, ITEM_PLACEHOLDER, ItemType, SelectOption,
};
pub use messages::{Effect, Msg, NavigationEvent};
