//! Helpers shared by the form engine, the terminal renderer and the CLI.

pub mod config;
pub mod field_path;
pub mod path_processing;
pub mod schema;
pub mod text_processing;

pub use config::{ConfigError, FormsConfig};
pub use field_path::{PathSegment, get_value, normalize_path, parse_path, set_value};
pub use path_processing::expand_tilde;
