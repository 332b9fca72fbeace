mod content;
mod info_component;

pub use content::build_field_info_text;
pub use info_component::InfoComponent;
